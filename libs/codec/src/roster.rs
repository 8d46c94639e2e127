//! Roster frame: the ordered actor-list snapshot.
//!
//! Layout:
//!
//! ```text
//! [changed: u8 bool]
//!   if changed:
//!     [count: u16 le]
//!     count x [name: u16 le length + utf-8 bytes]
//! [trailer: 42]
//! ```
//!
//! The receiver assigns `temp_id = index` for every listed name; the frame
//! is therefore order-significant. An "unchanged" frame (leading false)
//! carries nothing but the trailer and must leave the receiver untouched.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::constants::ROSTER_TRAILER;
use crate::error::{CodecError, CodecResult};
use crate::wire;

/// Most names a roster frame can carry, bounded by the u16 count.
pub const MAX_ROSTER_NAMES: usize = u16::MAX as usize;

/// Encode a full roster snapshot in index order.
pub fn encode_roster(names: &[String]) -> CodecResult<Bytes> {
    if names.len() > MAX_ROSTER_NAMES {
        return Err(CodecError::FrameTooLarge {
            count: names.len(),
            max: MAX_ROSTER_NAMES,
        });
    }

    let mut buf = BytesMut::new();
    wire::put_bool(&mut buf, true);
    buf.put_u16_le(names.len() as u16);
    for (index, name) in names.iter().enumerate() {
        wire::put_string(&mut buf, name, &format!("roster name {index}"))?;
    }
    buf.put_u8(ROSTER_TRAILER);

    trace!(count = names.len(), bytes = buf.len(), "encoded roster frame");
    Ok(buf.freeze())
}

/// Encode the "no change, skip" roster frame.
pub fn encode_roster_unchanged() -> Bytes {
    let mut buf = BytesMut::with_capacity(2);
    wire::put_bool(&mut buf, false);
    buf.put_u8(ROSTER_TRAILER);
    buf.freeze()
}

/// Decode a roster frame, advancing `buf` past it.
///
/// Returns `None` for an unchanged frame; the caller must not mutate any
/// state in that case.
pub fn decode_roster(buf: &mut Bytes) -> CodecResult<Option<Vec<String>>> {
    let changed = wire::get_bool(buf, "roster changed flag")?;

    let names = if changed {
        let count = wire::get_u16(buf, "roster count")? as usize;
        let mut names = Vec::with_capacity(count.min(1024));
        for index in 0..count {
            names.push(wire::get_string(buf, &format!("roster name {index}"))?);
        }
        Some(names)
    } else {
        None
    };

    let trailer = wire::get_u8(buf, "roster trailer")?;
    if trailer != ROSTER_TRAILER {
        return Err(CodecError::trailer_mismatch(
            "roster",
            ROSTER_TRAILER,
            trailer,
        ));
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let roster = names(&["a", "b", "c"]);
        let mut frame = encode_roster(&roster).unwrap();

        let decoded = decode_roster(&mut frame).unwrap().unwrap();
        assert_eq!(decoded, roster);
        assert!(frame.is_empty());
    }

    #[test]
    fn test_unchanged_frame_decodes_to_none() {
        let mut frame = encode_roster_unchanged();
        assert_eq!(decode_roster(&mut frame).unwrap(), None);
        assert!(frame.is_empty());
    }

    #[test]
    fn test_empty_roster_is_valid() {
        let mut frame = encode_roster(&[]).unwrap();
        assert_eq!(decode_roster(&mut frame).unwrap(), Some(vec![]));
    }

    #[test]
    fn test_wrong_trailer_rejected() {
        let roster = names(&["a"]);
        let frame = encode_roster(&roster).unwrap();

        let mut corrupted = BytesMut::from(&frame[..]);
        let last = corrupted.len() - 1;
        corrupted[last] = 0x07;

        let err = decode_roster(&mut corrupted.freeze()).unwrap_err();
        match err {
            CodecError::TrailerMismatch {
                protocol,
                expected,
                actual,
                ..
            } => {
                assert_eq!(protocol, "roster");
                assert_eq!(expected, ROSTER_TRAILER);
                assert_eq!(actual, 0x07);
            }
            other => panic!("expected TrailerMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_frame_rejected() {
        let roster = names(&["alpha", "beta"]);
        let frame = encode_roster(&roster).unwrap();
        let mut truncated = frame.slice(..frame.len() - 4);

        assert!(matches!(
            decode_roster(&mut truncated).unwrap_err(),
            CodecError::BufferTooSmall { .. }
        ));
    }
}
