//! # Formats
//!
//! Byte-level encodings of a graph. JSON lives in `serializer`.

mod snapshot;

pub use snapshot::{snapshot_from_bytes, snapshot_to_bytes};
