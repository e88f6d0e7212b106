//! # Serializer
//!
//! Deterministic encode/decode of a whole graph.
//!
//! ## JSON shape
//!
//! ```text
//! {
//!   "cells": { "<uuid>": { "data": {..}, "id": "<uuid>", "ports": {..},
//!                          "position": {"x":..,"y":..}, "velocity": {..} } },
//!   "id": "<uuid>",
//!   "name": "..."
//! }
//! ```
//!
//! The wire structs declare their fields alphabetically and every map is a
//! `BTreeMap`, so every object is emitted with sorted keys and the same graph
//! always produces the same bytes. The binary snapshot format in `formats`
//! reuses the same wire structs under `postcard`.

use crate::formats::{snapshot_from_bytes, snapshot_to_bytes};
use crate::primitives::MAX_JSON_INPUT_SIZE;
use crate::{Cell, Identifier, RepError, RepStruct, Value, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

// =============================================================================
// WIRE FORMAT
// =============================================================================

/// Borrowed view of a graph for encoding.
#[derive(Serialize)]
pub(crate) struct WireRepRef<'a> {
    cells: BTreeMap<Identifier, WireCellRef<'a>>,
    id: Identifier,
    name: &'a str,
}

#[derive(Serialize)]
struct WireCellRef<'a> {
    data: &'a BTreeMap<String, Value>,
    id: Identifier,
    ports: &'a BTreeMap<String, Identifier>,
    position: Vec2,
    velocity: Vec2,
}

/// Owned graph as decoded from the wire. Field order matches `WireRepRef`.
#[derive(Deserialize)]
pub(crate) struct WireRep {
    cells: BTreeMap<Identifier, WireCell>,
    id: Identifier,
    name: String,
}

#[derive(Deserialize)]
struct WireCell {
    #[serde(default)]
    data: BTreeMap<String, Value>,
    id: Identifier,
    #[serde(default)]
    ports: BTreeMap<String, Identifier>,
    #[serde(default)]
    position: Vec2,
    #[serde(default)]
    velocity: Vec2,
}

impl<'a> WireRepRef<'a> {
    /// Borrow `rep` for encoding, rejecting payloads with no faithful encoding.
    pub(crate) fn encode(rep: &'a RepStruct) -> Result<Self, RepError> {
        let mut cells = BTreeMap::new();
        for cell in rep.cells() {
            check_encodable(cell)?;
            cells.insert(
                cell.id,
                WireCellRef {
                    data: &cell.data,
                    id: cell.id,
                    ports: &cell.ports,
                    position: cell.position,
                    velocity: cell.velocity,
                },
            );
        }
        Ok(Self {
            cells,
            id: rep.id(),
            name: rep.name(),
        })
    }
}

impl WireRep {
    /// Rebuild the graph, checking that every key matches its cell id.
    pub(crate) fn decode(self) -> Result<RepStruct, RepError> {
        let mut cells = BTreeMap::new();
        for (key, wire) in self.cells {
            if key != wire.id {
                return Err(RepError::Decoding(format!(
                    "Cell keyed {} carries id {}",
                    key, wire.id
                )));
            }
            let cell = Cell {
                id: wire.id,
                ports: wire.ports,
                data: wire.data,
                position: wire.position,
                velocity: wire.velocity,
            };
            cells.insert(key, Arc::new(cell));
        }
        Ok(RepStruct::from_parts(self.id, self.name, cells))
    }
}

fn check_encodable(cell: &Cell) -> Result<(), RepError> {
    if let Some((key, value)) = cell.data.iter().find(|(_, v)| !v.is_encodable()) {
        return Err(RepError::Encoding(format!(
            "Cell {} key '{}' holds a non-finite {} ({})",
            cell.id,
            key,
            value.kind(),
            value
        )));
    }
    if !cell.position.is_finite() || !cell.velocity.is_finite() {
        return Err(RepError::Encoding(format!(
            "Cell {} has non-finite motion state",
            cell.id
        )));
    }
    Ok(())
}

// =============================================================================
// SERIALIZER
// =============================================================================

/// Whole-graph encode/decode.
pub struct RepSerializer;

impl RepSerializer {
    /// Compact JSON with sorted keys.
    pub fn to_json(rep: &RepStruct) -> Result<String, RepError> {
        let wire = WireRepRef::encode(rep)?;
        serde_json::to_string(&wire).map_err(|e| RepError::Encoding(e.to_string()))
    }

    /// Indented JSON with sorted keys.
    pub fn to_json_pretty(rep: &RepStruct) -> Result<String, RepError> {
        let wire = WireRepRef::encode(rep)?;
        serde_json::to_string_pretty(&wire).map_err(|e| RepError::Encoding(e.to_string()))
    }

    /// Decode a JSON document produced by `to_json` (or any equivalent).
    pub fn from_json(json: &str) -> Result<RepStruct, RepError> {
        if json.len() > MAX_JSON_INPUT_SIZE {
            return Err(RepError::Decoding(format!(
                "Input size {} bytes exceeds maximum allowed {} bytes",
                json.len(),
                MAX_JSON_INPUT_SIZE
            )));
        }
        let wire: WireRep =
            serde_json::from_str(json).map_err(|e| RepError::Decoding(e.to_string()))?;
        wire.decode()
    }

    /// Binary snapshot: header + postcard payload.
    pub fn to_bytes(rep: &RepStruct) -> Result<Vec<u8>, RepError> {
        snapshot_to_bytes(rep)
    }

    /// Decode a binary snapshot.
    pub fn from_bytes(bytes: &[u8]) -> Result<RepStruct, RepError> {
        snapshot_from_bytes(bytes)
    }

    /// Deterministic 64-bit checksum (FNV-1a) of the binary payload.
    pub fn checksum(rep: &RepStruct) -> Result<u64, RepError> {
        let payload = Self::payload(rep)?;
        Ok(fnv1a(&payload))
    }

    /// BLAKE3 hex digest of the binary payload.
    ///
    /// Equal graphs hash equal, so the digest can address graph content.
    #[cfg(feature = "crypto-hash")]
    pub fn content_hash(rep: &RepStruct) -> Result<String, RepError> {
        let payload = Self::payload(rep)?;
        Ok(blake3::hash(&payload).to_hex().to_string())
    }

    fn payload(rep: &RepStruct) -> Result<Vec<u8>, RepError> {
        let wire = WireRepRef::encode(rep)?;
        postcard::to_stdvec(&wire).map_err(|e| RepError::Encoding(e.to_string()))
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes.iter().fold(OFFSET, |hash, &b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
}

// =============================================================================
// TESTS
// =============================================================================
