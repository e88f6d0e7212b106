//! Binary snapshots.
//!
//! A snapshot is `REPS`, one version byte, then the postcard encoding of the
//! wire graph. The length cap and the prefix are checked before postcard sees
//! the payload.

use crate::primitives::{FORMAT_VERSION, HEADER_LEN, MAGIC_BYTES, MAX_SNAPSHOT_SIZE};
use crate::serializer::{WireRep, WireRepRef};
use crate::{RepError, RepStruct};

/// Encode `rep` as a versioned snapshot.
pub fn snapshot_to_bytes(rep: &RepStruct) -> Result<Vec<u8>, RepError> {
    let wire = WireRepRef::encode(rep)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN);
    bytes.extend_from_slice(MAGIC_BYTES);
    bytes.push(FORMAT_VERSION);
    postcard::to_extend(&wire, bytes).map_err(|e| RepError::Encoding(e.to_string()))
}

/// Decode a snapshot produced by [`snapshot_to_bytes`].
pub fn snapshot_from_bytes(bytes: &[u8]) -> Result<RepStruct, RepError> {
    if bytes.len() > MAX_SNAPSHOT_SIZE {
        return Err(RepError::Decoding(format!(
            "snapshot of {} bytes exceeds the {} byte limit",
            bytes.len(),
            MAX_SNAPSHOT_SIZE
        )));
    }

    let wire: WireRep = postcard::from_bytes(strip_prefix(bytes)?)
        .map_err(|e| RepError::Decoding(format!("snapshot payload: {e}")))?;
    wire.decode()
}

/// Payload after a valid magic and version.
fn strip_prefix(bytes: &[u8]) -> Result<&[u8], RepError> {
    let Some((magic, rest)) = bytes.split_first_chunk::<4>() else {
        return Err(RepError::Decoding(format!(
            "snapshot shorter than its {HEADER_LEN} byte prefix"
        )));
    };
    if magic != MAGIC_BYTES {
        return Err(RepError::Decoding("not a Rep snapshot".to_string()));
    }
    match rest.split_first() {
        Some((&FORMAT_VERSION, payload)) => Ok(payload),
        Some((version, _)) => Err(RepError::Decoding(format!(
            "snapshot version {version} (this build reads {FORMAT_VERSION})"
        ))),
        None => Err(RepError::Decoding(format!(
            "snapshot shorter than its {HEADER_LEN} byte prefix"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, Identifier, Value, Vec2};

    fn sample() -> RepStruct {
        let a = Identifier::from_u128(1);
        let b = Identifier::from_u128(2);
        RepStruct::with_id(Identifier::from_u128(9), "snap")
            .adding(Cell::new(a).with_port("next", b).with_data("n", 4))
            .adding(
                Cell::new(b)
                    .with_data("s", Value::from("x"))
                    .with_velocity(Vec2::new(0.0, 1.0)),
            )
    }

    #[test]
    fn prefix_is_magic_then_version() {
        let bytes = snapshot_to_bytes(&sample()).expect("encode");
        assert_eq!(&bytes[..4], MAGIC_BYTES);
        assert_eq!(bytes[4], FORMAT_VERSION);
        assert!(bytes.len() > HEADER_LEN);
    }

    #[test]
    fn reencoding_is_bit_exact() {
        let rep = sample();
        let first = snapshot_to_bytes(&rep).expect("encode");
        let restored = snapshot_from_bytes(&first).expect("decode");

        assert_eq!(restored, rep);
        assert_eq!(snapshot_to_bytes(&restored).expect("encode again"), first);
    }

    #[test]
    fn wrong_magic_rejected() {
        let mut bytes = snapshot_to_bytes(&sample()).expect("encode");
        bytes[..4].copy_from_slice(b"XXXX");
        assert!(matches!(
            snapshot_from_bytes(&bytes),
            Err(RepError::Decoding(_))
        ));
    }

    #[test]
    fn other_version_rejected() {
        let mut bytes = snapshot_to_bytes(&sample()).expect("encode");
        bytes[4] = FORMAT_VERSION.wrapping_add(1);
        assert!(matches!(
            snapshot_from_bytes(&bytes),
            Err(RepError::Decoding(msg)) if msg.contains("version")
        ));
    }

    #[test]
    fn truncation_rejected() {
        let bytes = snapshot_to_bytes(&sample()).expect("encode");
        assert!(snapshot_from_bytes(&bytes[..bytes.len() / 2]).is_err());
        assert!(snapshot_from_bytes(&bytes[..HEADER_LEN]).is_err());
        assert!(snapshot_from_bytes(&bytes[..4]).is_err());
        assert!(snapshot_from_bytes(&bytes[..3]).is_err());
        assert!(snapshot_from_bytes(&[]).is_err());
    }
}
