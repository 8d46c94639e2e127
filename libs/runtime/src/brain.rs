//! Behavior database collaborator boundary.
//!
//! A brain is the named behavior assignment of an actor: an ordered set of
//! behavior "uses", each of which may handle some message names. The
//! authoring layer owns brain content; the runtime only asks two questions —
//! does this brain handle this message, and which use handlers run for it.
//!
//! Handler invocation goes through a uniform capability interface rather
//! than any reflective method lookup: the pump resolves
//! [`Brain::handlers_for`] once per delivery and calls each binding with the
//! runtime, the actor name, and the shared delivery value. Handlers run
//! synchronously and may re-enter the runtime.

use std::sync::Arc;

use types::MessageDelivery;

use crate::runtime::StageRuntime;

/// Lookup of brain definitions by name.
pub trait BrainRegistry {
    fn brain(&self, name: &str) -> Option<Arc<dyn Brain>>;
}

/// A resolved behavior definition.
pub trait Brain {
    /// Fast interest check used by broadcast scans.
    fn handles(&self, message: &str) -> bool;

    /// Ordered handler bindings for a message name. Empty when the brain
    /// does not handle it.
    fn handlers_for(&self, message: &str) -> Vec<HandlerBinding>;
}

/// One use's handler for one message name.
#[derive(Clone)]
pub struct HandlerBinding {
    /// Behavior-use this handler belongs to. The runtime creates the use's
    /// local memory slot before the first invocation.
    pub use_id: String,
    pub handler: Arc<dyn UseHandler>,
}

/// The capability interface every message handler implements.
pub trait UseHandler {
    /// Handle one delivery for one actor. May re-enter the runtime
    /// (enqueue messages, run lifecycle operations).
    fn handle(
        &self,
        world: &mut StageRuntime,
        actor: &str,
        use_id: &str,
        delivery: &MessageDelivery,
    ) -> anyhow::Result<()>;
}
