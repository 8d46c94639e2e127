//! Delta frame: incremental per-actor dirty state.
//!
//! Layout:
//!
//! ```text
//! [count: u16 le]
//! count x [temp_id: u16 le][payload...]   -- no payload after the skip id
//! [trailer: 43]
//! ```
//!
//! The codec frames entries; it never interprets a payload. The caller
//! writes each entry's payload through the buffer handed back by
//! [`DeltaWriter::entry`], and reads it back from [`DeltaReader::payload`]
//! between [`DeltaReader::next_entry`] calls. Payload length is therefore an
//! agreement between the two application sides; the trailing sanity byte
//! catches a reader that drifted off an entry boundary.

use bytes::{BufMut, Bytes, BytesMut};

use crate::constants::{DELTA_TRAILER, TEMP_ID_SKIP};
use crate::error::{CodecError, CodecResult};
use crate::wire;

/// One framed entry yielded by [`DeltaReader::next_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaEntry {
    /// Placeholder slot. Carries no payload; must be ignored without a
    /// roster lookup.
    Skip,
    /// Dirty state for the actor at this roster index.
    Actor(u16),
}

/// Incremental writer for a delta frame.
///
/// The entry count is length-prefixed, so the caller declares it up front
/// (counting pass) and then emits exactly that many entries (emit pass);
/// [`DeltaWriter::finish`] rejects a mismatch.
#[derive(Debug)]
pub struct DeltaWriter {
    buf: BytesMut,
    declared: u16,
    written: u16,
}

impl DeltaWriter {
    /// Start a frame declaring `count` entries.
    pub fn new(count: u16) -> Self {
        let mut buf = BytesMut::new();
        buf.put_u16_le(count);
        Self {
            buf,
            declared: count,
            written: 0,
        }
    }

    /// Begin an entry for `temp_id`, returning the buffer the caller writes
    /// the payload into.
    pub fn entry(&mut self, temp_id: u16) -> &mut BytesMut {
        debug_assert_ne!(temp_id, TEMP_ID_SKIP, "use skip_entry for the skip slot");
        self.written += 1;
        self.buf.put_u16_le(temp_id);
        &mut self.buf
    }

    /// Emit a placeholder slot with no payload.
    pub fn skip_entry(&mut self) {
        self.written += 1;
        self.buf.put_u16_le(TEMP_ID_SKIP);
    }

    /// Close the frame, verifying the declared count and appending the
    /// trailer.
    pub fn finish(mut self) -> CodecResult<Bytes> {
        if self.written != self.declared {
            return Err(CodecError::CountMismatch {
                declared: self.declared,
                written: self.written,
            });
        }
        self.buf.put_u8(DELTA_TRAILER);
        Ok(self.buf.freeze())
    }
}

/// Incremental reader for a delta frame.
#[derive(Debug)]
pub struct DeltaReader {
    buf: Bytes,
    remaining_entries: u16,
}

impl DeltaReader {
    /// Open a frame, reading its entry count.
    pub fn new(mut buf: Bytes) -> CodecResult<Self> {
        let count = wire::get_u16(&mut buf, "delta count")?;
        Ok(Self {
            buf,
            remaining_entries: count,
        })
    }

    /// Entries declared by the frame header.
    pub fn remaining_entries(&self) -> u16 {
        self.remaining_entries
    }

    /// Yield the next entry, or `None` once the frame is exhausted and its
    /// trailer verified.
    ///
    /// After an `Actor` entry the caller must consume that actor's payload
    /// from [`DeltaReader::payload`] before the next call.
    pub fn next_entry(&mut self) -> CodecResult<Option<DeltaEntry>> {
        if self.remaining_entries == 0 {
            let trailer = wire::get_u8(&mut self.buf, "delta trailer")?;
            if trailer != DELTA_TRAILER {
                return Err(CodecError::trailer_mismatch("delta", DELTA_TRAILER, trailer));
            }
            return Ok(None);
        }

        self.remaining_entries -= 1;
        let temp_id = wire::get_u16(&mut self.buf, "delta entry id")?;
        if temp_id == TEMP_ID_SKIP {
            Ok(Some(DeltaEntry::Skip))
        } else {
            Ok(Some(DeltaEntry::Actor(temp_id)))
        }
    }

    /// Buffer positioned at the current entry's payload.
    pub fn payload(&mut self) -> &mut Bytes {
        &mut self.buf
    }
}
