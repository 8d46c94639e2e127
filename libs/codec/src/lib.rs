//! # Stagecraft Sync Protocol Codec
//!
//! ## Purpose
//!
//! This crate contains the wire "rules" layer of the Stagecraft runtime: the
//! binary framing for the two state-synchronization sub-protocols exchanged
//! between simulation peers.
//!
//! - **Roster sync** — the ordered actor-list snapshot. Establishes the
//!   name-per-index table that makes the compact 16-bit temp-id encoding of
//!   the delta stream meaningful.
//! - **Delta sync** — incremental per-actor dirty-state entries, addressed
//!   by temp id against the most recent roster.
//!
//! Each frame ends in a distinct sanity byte (42 for roster, 43 for delta)
//! so a desynchronized stream is rejected at the frame boundary instead of
//! corrupting the registry downstream.
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → [codec] → actor-runtime
//!     ↑           ↓            ↓
//! Pure Data   Wire Rules   Application
//! Structures  Framing      (registry mutation,
//!             Validation    temp-id resolution)
//! ```
//!
//! ## What This Crate Contains
//! - `wire` — little-endian primitives: length-prefixed strings, blobs,
//!   checked integer reads
//! - `roster` — encode/decode of the ordered actor-list frame
//! - `delta` — `DeltaWriter` / `DeltaReader` for the dirty-state frame
//! - `CodecError` — diagnostic error type for every framing failure
//!
//! ## What This Crate Does NOT Contain
//! - Registry mutation or temp-id resolution (belongs in actor-runtime)
//! - Transport, peering, connection handling
//! - Message payload semantics (belongs in libs/types)

pub mod constants;
pub mod delta;
pub mod error;
pub mod roster;
pub mod wire;

pub use constants::{DELTA_TRAILER, ROSTER_TRAILER, TEMP_ID_SKIP};
pub use delta::{DeltaEntry, DeltaReader, DeltaWriter};
pub use error::{CodecError, CodecResult};
pub use roster::{decode_roster, encode_roster, encode_roster_unchanged};
