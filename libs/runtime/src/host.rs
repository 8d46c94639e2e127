//! Host engine and network collaborator boundaries.
//!
//! The runtime never creates, destroys, or renders entities itself and never
//! touches a socket; it asks the host engine for lifecycle work and hands
//! outbound messages to the peer forwarder. Both are synchronous in-process
//! calls — no latency is modeled at this boundary.

use bytes::Bytes;
use thiserror::Error;
use types::SpawnFrame;

/// Failure reported by the host engine for a lifecycle request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host refused the operation (bad prefab reference, engine-side
    /// limit, scene not loaded, ...).
    #[error("host rejected {operation}: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },
}

impl HostError {
    pub fn rejected(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            reason: reason.into(),
        }
    }
}

/// An entity the host engine created on the runtime's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnedActor {
    /// Authoritative name assigned by the host. Primary key from here on.
    pub name: String,
    /// Host-side entity index, opaque to the dispatch core.
    pub index: u32,
}

/// Entity-lifecycle collaborator.
pub trait HostEngine {
    /// Create one entity from a prefab reference. Returns its authoritative
    /// name and host index.
    fn instantiate_prefab(&self, prefab: &str, frame: SpawnFrame) -> Result<SpawnedActor, HostError>;

    /// Clone an existing entity. May return several created actors: the
    /// base plus its sub-hierarchy.
    fn clone_actor(&self, base: &str, frame: SpawnFrame) -> Result<Vec<SpawnedActor>, HostError>;

    /// Request removal of the named entities. The registry does not remove
    /// them synchronously; removal lands via the requested-destroy sweep or
    /// a later roster sync.
    fn destroy_actors(&self, names: &[String]) -> Result<(), HostError>;

    /// Name of the designated camera actor, if one exists. Refreshed once
    /// per tick.
    fn camera_actor_name(&self) -> Option<String>;
}

/// Network egress collaborator. Fire-and-forget; the runtime never observes
/// an acknowledgment.
pub trait PeerForwarder {
    /// Forward a packed message. `target == None` broadcasts to all other
    /// peers.
    fn forward(&self, target: Option<&str>, message_name: &str, packed: &Bytes);
}
