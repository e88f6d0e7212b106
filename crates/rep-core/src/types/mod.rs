//! # Core Type Definitions
//!
//! This module contains the leaf types of the Rep graph engine:
//! - Identifiers (`Identifier`)
//! - Cell metadata payload (`Value`)
//! - Spatial state (`Vec2`)
//! - Error types (`RepError`)
//!
//! ## Determinism Guarantees
//!
//! - `Identifier` implements `Ord`, so every map keyed by it is a `BTreeMap`
//!   with a stable iteration order.
//! - `Value` is a closed sum type: payloads that are not one of the four
//!   scalar kinds cannot be constructed at all.

use crate::validator::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// IDENTIFIER
// =============================================================================

/// Globally unique 128-bit identifier for cells and graphs.
///
/// Uniqueness is the caller's responsibility; the engine never checks for
/// collisions. Serialized as a hyphenated UUID string in JSON and as raw
/// bytes in the binary snapshot format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(pub Uuid);

impl Identifier {
    /// Generate a fresh random (v4) identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Build an identifier from a raw 128-bit value.
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Get the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for Identifier {
    type Err = RepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| RepError::Decoding(format!("Invalid identifier '{}': {}", s, e)))
    }
}

impl From<Uuid> for Identifier {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

// =============================================================================
// VALUE (metadata payload)
// =============================================================================

/// A tagged scalar stored in a cell's metadata map.
///
/// Encoded externally tagged (`{"int":3}`, `{"string":"hello"}`) so the
/// scalar kind survives a JSON round trip: an `Int` never comes back as a
/// `Float`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
}

impl Value {
    /// Name of the scalar kind, as used in the JSON tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Whether this value has a faithful JSON encoding.
    ///
    /// NaN and infinities do not; the serializer rejects them.
    #[must_use]
    pub fn is_encodable(&self) -> bool {
        match self {
            Self::Float(v) => v.is_finite(),
            _ => true,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{:?}", v),
        }
    }
}

// =============================================================================
// VEC2 (spatial state)
// =============================================================================

/// 2D vector used for cell position and velocity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both components are finite (encodable in JSON).
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Rep engine.
///
/// - No silent failures: an edit that names an absent cell is an error
/// - Use `Result<T, RepError>` for fallible operations
/// - The engine never panics; all errors are recoverable
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RepError {
    /// The referenced cell does not exist in the graph.
    #[error("Cell not found: {0}")]
    CellNotFound(Identifier),

    /// The referenced port does not exist on the cell.
    #[error("Port '{port}' not found on cell {cell}")]
    PortNotFound { cell: Identifier, port: String },

    /// The graph failed structural validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The port graph contains a cycle; the path closes on its first node.
    #[error("Cycle detected: {}", format_path(.0))]
    CycleDetected(Vec<Identifier>),

    /// Cells not reachable from any root.
    #[error("Unreachable cells: {}", format_list(.0))]
    UnreachableCells(Vec<Identifier>),

    /// A value could not be encoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Input could not be decoded into a graph.
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// An I/O error occurred (app layer).
    #[error("I/O error: {0}")]
    Io(String),
}

fn format_path(path: &[Identifier]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn format_list(ids: &[Identifier]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_display_parse_roundtrip() {
        let id = Identifier::from_u128(0x1234);
        let parsed: Identifier = id.to_string().parse().expect("parse");
        assert_eq!(parsed, id);
    }

    #[test]
    fn identifier_parse_rejects_garbage() {
        let result = "not-a-uuid".parse::<Identifier>();
        assert!(matches!(result, Err(RepError::Decoding(_))));
    }

    #[test]
    fn identifier_ordering_follows_value() {
        assert!(Identifier::from_u128(1) < Identifier::from_u128(2));
    }

    #[test]
    fn generated_identifiers_differ() {
        assert_ne!(Identifier::generate(), Identifier::generate());
    }

    #[test]
    fn value_json_keeps_kind() {
        let json = serde_json::to_string(&Value::Int(3)).expect("encode");
        assert_eq!(json, r#"{"int":3}"#);

        let decoded: Value = serde_json::from_str(r#"{"float":3.0}"#).expect("decode");
        assert_eq!(decoded, Value::Float(3.0));
        assert_eq!(decoded.as_int(), None);
    }

    #[test]
    fn value_encodable_rejects_non_finite() {
        assert!(Value::Float(1.5).is_encodable());
        assert!(!Value::Float(f64::NAN).is_encodable());
        assert!(!Value::Float(f64::INFINITY).is_encodable());
        assert!(Value::from("x").is_encodable());
    }

    #[test]
    fn value_accessors() {
        assert_eq!(Value::from(7).as_int(), Some(7));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from("hi").as_str(), Some("hi"));
        assert_eq!(Value::from(2.5).kind(), "float");
    }

    #[test]
    fn cycle_error_lists_path() {
        let a = Identifier::from_u128(1);
        let b = Identifier::from_u128(2);
        let err = RepError::CycleDetected(vec![a, b, a]);
        let message = err.to_string();
        assert!(message.contains(" -> "));
        assert!(message.starts_with("Cycle detected: "));
    }
}
