//! # Stagecraft Actor Runtime
//!
//! Per-tick message-dispatch and state-synchronization core for a
//! multi-actor game behavior runtime. This crate owns the actor registry and
//! both message queues; everything else in the system reaches them through
//! the entry points defined here.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐     ┌──────────────────────┐
//! │    StageRuntime      │     │    Collaborators     │
//! │                      │     │                      │
//! │  registry (actors)   │────▶│  BrainRegistry       │
//! │  queue + deferred    │     │  (behavior database) │
//! │  roster table        │     │                      │
//! │  reset coordinator   │────▶│  HostEngine          │
//! │  lifecycle ops       │     │  (entity lifecycle)  │
//! │  sync application    │     │                      │
//! │                      │────▶│  PeerForwarder       │
//! └──────────────────────┘     │  (network egress)    │
//!                              └──────────────────────┘
//! ```
//!
//! # Execution model
//!
//! Single-threaded, cooperative, tick-driven. [`StageRuntime::on_tick`]
//! drains the message queue exactly once per call; handlers run
//! synchronously inside the pump and may re-enter the runtime (enqueue
//! messages, instantiate, clone). Nothing here suspends, blocks, or locks —
//! concurrency elsewhere in the system is reached only through the
//! collaborator traits.
//!
//! Ordering guarantees: within one tick, messages are delivered in strict
//! enqueue order, except that the camera actor is processed last in each
//! broadcast scan, and post-reset `Init` delivery runs only after the reset
//! broadcast's own scan completes.

pub mod actor;
pub mod brain;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod reset;
pub mod runtime;
pub mod sync;

pub use actor::Actor;
pub use brain::{Brain, BrainRegistry, HandlerBinding, UseHandler};
pub use error::RuntimeError;
pub use host::{HostEngine, HostError, PeerForwarder, SpawnedActor};
pub use runtime::{RuntimeStats, StageRuntime};
