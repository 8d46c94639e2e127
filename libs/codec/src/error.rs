//! Sync protocol errors.
//!
//! Every variant carries enough context that a failure is diagnosable from
//! the rendered message alone: byte counts, offsets, the protocol the frame
//! claimed to be, and what the mismatch most likely indicates.

use thiserror::Error;

/// Framing and stream-integrity errors for the sync protocols.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Frame ended before the declared structure was complete.
    #[error("buffer too small: need {need} bytes, got {got} (context: {context})")]
    BufferTooSmall {
        need: usize,
        got: usize,
        context: String,
    },

    /// Trailing sanity byte did not match the protocol's value - the stream
    /// has desynchronized.
    #[error("trailer mismatch in {protocol} frame: expected {expected:#04x}, got {actual:#04x} (indicates: {diagnosis})")]
    TrailerMismatch {
        protocol: &'static str,
        expected: u8,
        actual: u8,
        diagnosis: String,
    },

    /// Delta entry referenced an index beyond the current roster table.
    /// Fatal: the sender and receiver disagree about the actor list.
    #[error("unresolvable temp id {temp_id}: roster table has {table_len} entries")]
    UnknownTempId { temp_id: u16, table_len: usize },

    /// String field exceeds what the u16 length prefix can carry.
    #[error("string too long for wire: {len} bytes exceeds limit {max} (context: {context})")]
    StringTooLong {
        len: usize,
        max: usize,
        context: String,
    },

    /// String field held invalid UTF-8.
    #[error("invalid utf-8 in wire string (context: {context}): {reason}")]
    InvalidUtf8 { context: String, reason: String },

    /// Writer closed with a different number of entries than it declared.
    #[error("entry count mismatch: declared {declared}, wrote {written}")]
    CountMismatch { declared: u16, written: u16 },

    /// More entries declared than the frame format permits.
    #[error("frame too large: {count} entries exceeds limit {max}")]
    FrameTooLarge { count: usize, max: usize },
}

impl CodecError {
    /// Create a BufferTooSmall error with reader context.
    pub fn buffer_too_small(need: usize, got: usize, context: impl Into<String>) -> Self {
        Self::BufferTooSmall {
            need,
            got,
            context: context.into(),
        }
    }

    /// Create a TrailerMismatch error with a likely-cause diagnosis.
    pub fn trailer_mismatch(protocol: &'static str, expected: u8, actual: u8) -> Self {
        let diagnosis = match actual {
            0x00 => "zeroed or truncated stream",
            a if a == crate::constants::ROSTER_TRAILER || a == crate::constants::DELTA_TRAILER => {
                "frames from the two sync protocols interleaved"
            }
            _ => "stream desynchronization or payload length drift",
        };

        Self::TrailerMismatch {
            protocol,
            expected,
            actual,
            diagnosis: diagnosis.to_string(),
        }
    }

    /// Create a StringTooLong error with writer context.
    pub fn string_too_long(len: usize, context: impl Into<String>) -> Self {
        Self::StringTooLong {
            len,
            max: crate::constants::MAX_WIRE_STRING,
            context: context.into(),
        }
    }
}

/// Result type for codec operations.
pub type CodecResult<T> = std::result::Result<T, CodecError>;
