//! Little-endian wire primitives.
//!
//! Thin checked wrappers over `bytes::{Buf, BufMut}`. Every read validates
//! the remaining length first and reports what it was reading when the
//! buffer ran short; the raw `get_*` accessors panic on underrun, which is
//! never acceptable on peer input.

use bytes::{Buf, BufMut};

use crate::constants::MAX_WIRE_STRING;
use crate::error::{CodecError, CodecResult};

/// Read a u8, with context for the error path.
pub fn get_u8(buf: &mut impl Buf, context: &str) -> CodecResult<u8> {
    if buf.remaining() < 1 {
        return Err(CodecError::buffer_too_small(1, buf.remaining(), context));
    }
    Ok(buf.get_u8())
}

/// Read a little-endian u16, with context for the error path.
pub fn get_u16(buf: &mut impl Buf, context: &str) -> CodecResult<u16> {
    if buf.remaining() < 2 {
        return Err(CodecError::buffer_too_small(2, buf.remaining(), context));
    }
    Ok(buf.get_u16_le())
}

/// Read a single-byte boolean. Any nonzero value is true.
pub fn get_bool(buf: &mut impl Buf, context: &str) -> CodecResult<bool> {
    Ok(get_u8(buf, context)? != 0)
}

/// Write a single-byte boolean.
pub fn put_bool(buf: &mut impl BufMut, value: bool) {
    buf.put_u8(u8::from(value));
}

/// Write a length-prefixed UTF-8 string (u16 little-endian length).
pub fn put_string(buf: &mut impl BufMut, value: &str, context: &str) -> CodecResult<()> {
    let bytes = value.as_bytes();
    if bytes.len() > MAX_WIRE_STRING {
        return Err(CodecError::string_too_long(bytes.len(), context));
    }
    buf.put_u16_le(bytes.len() as u16);
    buf.put_slice(bytes);
    Ok(())
}

/// Read a length-prefixed UTF-8 string.
pub fn get_string(buf: &mut impl Buf, context: &str) -> CodecResult<String> {
    let len = get_u16(buf, context)? as usize;
    if buf.remaining() < len {
        return Err(CodecError::buffer_too_small(len, buf.remaining(), context));
    }
    let mut raw = vec![0u8; len];
    buf.copy_to_slice(&mut raw);
    String::from_utf8(raw).map_err(|e| CodecError::InvalidUtf8 {
        context: context.to_string(),
        reason: e.to_string(),
    })
}

/// Write a length-prefixed opaque byte blob (u16 little-endian length).
///
/// Used for per-actor delta payloads, whose contents the codec never
/// interprets.
pub fn put_blob(buf: &mut impl BufMut, value: &[u8], context: &str) -> CodecResult<()> {
    if value.len() > MAX_WIRE_STRING {
        return Err(CodecError::string_too_long(value.len(), context));
    }
    buf.put_u16_le(value.len() as u16);
    buf.put_slice(value);
    Ok(())
}

/// Read a length-prefixed opaque byte blob.
pub fn get_blob(buf: &mut impl Buf, context: &str) -> CodecResult<Vec<u8>> {
    let len = get_u16(buf, context)? as usize;
    if buf.remaining() < len {
        return Err(CodecError::buffer_too_small(len, buf.remaining(), context));
    }
    let mut raw = vec![0u8; len];
    buf.copy_to_slice(&mut raw);
    Ok(raw)
}
