//! # Engine Primitives
//!
//! Hardcoded constants for the Rep engine: binary snapshot header, input
//! size limits and reserved metadata keys. These are compiled in and
//! immutable at runtime.

/// Magic bytes for the binary snapshot header.
///
/// - File Header = Magic Bytes ("REPS") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"REPS";

/// Current binary snapshot format version.
///
/// Increment this when making breaking changes to the wire struct.
pub const FORMAT_VERSION: u8 = 1;

/// Length of the binary snapshot header in bytes.
pub const HEADER_LEN: usize = 5;

/// Reserved metadata key holding a cell's display label.
///
/// `RepStruct::renaming` and `RepUpdate::RenameCell` write here, so the
/// external JSON shape of a cell stays `id/ports/data/position/velocity`.
pub const LABEL_KEY: &str = "label";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum accepted size of a JSON graph document (64 MB).
///
/// Checked before parsing to prevent memory exhaustion from malformed input.
pub const MAX_JSON_INPUT_SIZE: usize = 64 * 1024 * 1024;

/// Maximum accepted size of a binary snapshot (256 MB).
pub const MAX_SNAPSHOT_SIZE: usize = 256 * 1024 * 1024;

/// Default number of snapshots kept by `EditHistory` for undo.
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_bytes_correct() {
        assert_eq!(MAGIC_BYTES, b"REPS");
        assert_eq!(HEADER_LEN, MAGIC_BYTES.len() + 1);
    }
}
