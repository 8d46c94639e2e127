//! # Stagecraft Shared Types
//!
//! Pure data structures shared by every Stagecraft crate: message envelopes,
//! delivery values, spatial reference frames, and the payload pack/unpack
//! contract. This crate deliberately knows nothing about the registry, the
//! wire protocols, or transport.
//!
//! ## What This Crate Contains
//! - `QueuedMessage` / `MessageDelivery` / `SendMessageOptions` — the message
//!   envelope as it sits in the queue and as it is handed to handlers
//! - `names` — reserved message-name constants
//! - Spatial types (`Vec3`, `Rotation`, `SpawnFrame`) — opaque reference
//!   frames captured at actor creation
//! - `pack_message_data` / `unpack_message_data` — the opaque payload
//!   contract, with aggregated per-field validation errors
//!
//! ## What This Crate Does NOT Contain
//! - Registry or delivery logic (belongs in actor-runtime)
//! - Binary sync framing (belongs in codec)

pub mod messages;
pub mod names;
pub mod spatial;

pub use messages::{
    pack_message_data, unpack_message_data, MessageDelivery, PackError, QueuedMessage,
    SendMessageOptions,
};
pub use spatial::{Rotation, SpawnFrame, Vec3};
