//! Runtime errors.
//!
//! Routine dispatch conditions (missing target, not-ready actor) are never
//! errors; everything here is either a hard failure that aborts the current
//! operation or a wrapped failure from a lower layer.

use codec::CodecError;
use thiserror::Error;
use types::PackError;

use crate::host::HostError;

/// Hard failures surfaced by runtime operations.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Actor-creating operation attempted at or above the configured
    /// ceiling. The registry is left untouched.
    #[error("actor ceiling reached: {registered} of {limit} actors registered (operation: {operation})")]
    ActorCeiling {
        registered: usize,
        limit: usize,
        operation: &'static str,
    },

    /// Operation referenced an actor the registry has never seen or has
    /// already removed.
    #[error("unknown actor '{name}' (operation: {operation})")]
    UnknownActor {
        name: String,
        operation: &'static str,
    },

    /// Packed payload exceeds the configured enqueue cap.
    #[error("payload too large: {size} bytes exceeds limit {limit} (message: {message})")]
    PayloadTooLarge {
        size: usize,
        limit: usize,
        message: String,
    },

    /// Replicated actor state did not parse.
    #[error("corrupt replicated state for actor '{name}': {reason}")]
    CorruptActorState { name: String, reason: String },

    /// Payload validation failure at enqueue.
    #[error(transparent)]
    Pack(#[from] PackError),

    /// Wire framing failure in either sync protocol.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Host engine reported a create/clone/destroy failure.
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;
