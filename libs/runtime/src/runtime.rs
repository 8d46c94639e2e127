//! The runtime core: registry, queues, and the tick entry point.
//!
//! `StageRuntime` exclusively owns every actor record and both message
//! buffers. External collaborators only read through accessors or cause
//! mutation via the defined entry points; nothing holds a reference into the
//! registry across ticks.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use bytes::Bytes;
use serde_json::{json, Value};
use tracing::{debug, trace, warn};

use config::RuntimeSettings;
use types::{pack_message_data, QueuedMessage, SendMessageOptions};

use crate::actor::Actor;
use crate::brain::BrainRegistry;
use crate::error::{RuntimeError, RuntimeResult};
use crate::host::{HostEngine, PeerForwarder};

/// A queued item plus its deferral history. The counter survives re-queueing
/// so a target that never becomes ready cannot pin a message forever.
#[derive(Debug, Clone)]
pub(crate) struct PendingMessage {
    pub(crate) msg: QueuedMessage,
    pub(crate) ticks_deferred: u32,
}

/// Per-runtime event counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RuntimeStats {
    pub messages_enqueued: u64,
    pub messages_delivered: u64,
    pub messages_deferred: u64,
    pub messages_forwarded: u64,
    pub messages_dropped: u64,
    pub broadcasts: u64,
    pub resets: u64,
}

/// The per-tick message-dispatch and state-synchronization core.
pub struct StageRuntime {
    pub(crate) settings: RuntimeSettings,

    /// All live actors, keyed by name. Ordered map so every scan (broadcast
    /// interest, dirty encode, roster build) iterates deterministically.
    pub(crate) actors: BTreeMap<String, Actor>,

    /// Names by temp id from the most recent roster sync. Sole resolver for
    /// delta-sync entries until the next roster.
    pub(crate) roster_table: Vec<String>,
    pub(crate) roster_synced: bool,

    pub(crate) queue: VecDeque<PendingMessage>,
    pub(crate) deferred: Vec<PendingMessage>,

    /// Designated camera actor, refreshed from the host once per tick.
    pub(crate) camera_actor: Option<String>,

    pub(crate) game_time: f64,
    pub(crate) last_reset_time: Option<f64>,

    pub(crate) stats: RuntimeStats,

    pub(crate) brains: Arc<dyn BrainRegistry>,
    pub(crate) host: Arc<dyn HostEngine>,
    pub(crate) peers: Arc<dyn PeerForwarder>,
}

impl StageRuntime {
    pub fn new(
        settings: RuntimeSettings,
        brains: Arc<dyn BrainRegistry>,
        host: Arc<dyn HostEngine>,
        peers: Arc<dyn PeerForwarder>,
    ) -> Self {
        Self {
            settings,
            actors: BTreeMap::new(),
            roster_table: Vec::new(),
            roster_synced: false,
            queue: VecDeque::new(),
            deferred: Vec::new(),
            camera_actor: None,
            game_time: 0.0,
            last_reset_time: None,
            stats: RuntimeStats::default(),
            brains,
            host,
            peers,
        }
    }

    /// Tick entry point. Must be called with positive `delta_seconds` and
    /// monotonically non-decreasing `game_time_seconds`.
    ///
    /// Order of work: camera refresh, queue pump (handlers may enqueue more
    /// work for this same pass), deferred re-queue, per-actor update, then
    /// the requested-destroy sweep.
    pub fn on_tick(&mut self, delta_seconds: f64, game_time_seconds: f64) {
        debug_assert!(delta_seconds > 0.0, "delta_seconds must be positive");
        debug_assert!(
            game_time_seconds >= self.game_time,
            "game time must not run backwards"
        );
        self.game_time = game_time_seconds;
        self.camera_actor = self.host.camera_actor_name();

        // Intrinsic per-tick messages. Every peer generates its own copies,
        // which is why the forwarding policy exempts these kinds.
        let tick_payload = json!({ "delta_seconds": delta_seconds });
        for kind in [types::names::TICK, types::names::LOCAL_TICK] {
            if let Err(e) = self.send_message(None, kind, &tick_payload, None, Default::default())
            {
                warn!(message = kind, error = %e, "failed to enqueue tick message");
            }
        }

        self.pump();

        for actor in self.actors.values_mut() {
            actor.update(delta_seconds);
        }

        // Collect-then-apply: never remove while iterating.
        let doomed: Vec<String> = self
            .actors
            .values()
            .filter(|a| a.requested_destroy)
            .map(|a| a.name.clone())
            .collect();
        for name in doomed {
            debug!(actor = %name, "removing actor after destroy request");
            self.actors.remove(&name);
        }
    }

    /// Enqueue a message. `to == None` broadcasts. The payload is packed
    /// here, exactly once, so every recipient of a broadcast shares it.
    pub fn send_message(
        &mut self,
        to: Option<&str>,
        name: &str,
        data: &Value,
        from: Option<&str>,
        options: SendMessageOptions,
    ) -> RuntimeResult<()> {
        let packed = pack_message_data(data)?;
        self.enqueue_packed(to, name, packed, from, options)
    }

    /// Enqueue a message that arrived from a remote peer, already packed by
    /// the sender. Marked `from_remote` so a broadcast is never forwarded
    /// back out.
    pub fn receive_remote(
        &mut self,
        to: Option<&str>,
        name: &str,
        packed: Bytes,
        from: Option<&str>,
    ) -> RuntimeResult<()> {
        self.enqueue_packed(to, name, packed, from, SendMessageOptions::remote())
    }

    fn enqueue_packed(
        &mut self,
        to: Option<&str>,
        name: &str,
        packed: Bytes,
        from: Option<&str>,
        options: SendMessageOptions,
    ) -> RuntimeResult<()> {
        let limit = self.settings.limits.max_payload_bytes;
        if packed.len() > limit {
            return Err(RuntimeError::PayloadTooLarge {
                size: packed.len(),
                limit,
                message: name.to_string(),
            });
        }

        trace!(message = name, to = ?to, from = ?from, "enqueueing message");
        let pending = PendingMessage {
            msg: QueuedMessage {
                to: to.map(str::to_string),
                name: name.to_string(),
                data: packed,
                from: from.map(str::to_string),
                options,
            },
            ticks_deferred: 0,
        };
        // The reset sentinel jumps the queue: the epoch boundary must come
        // before every still-undelivered message, so the coordinator can
        // discard all of them in one sweep.
        if pending.msg.to.is_none() && name == types::names::RESET_GAME {
            self.queue.push_front(pending);
        } else {
            self.queue.push_back(pending);
        }
        self.stats.messages_enqueued += 1;
        Ok(())
    }

    // --- Registry accessors -------------------------------------------------

    pub fn actor(&self, name: &str) -> Option<&Actor> {
        self.actors.get(name)
    }

    pub fn actor_mut(&mut self, name: &str) -> Option<&mut Actor> {
        self.actors.get_mut(name)
    }

    pub fn contains_actor(&self, name: &str) -> bool {
        self.actors.contains_key(name)
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Live actor names in registry (deterministic) order.
    pub fn actor_names(&self) -> Vec<String> {
        self.actors.keys().cloned().collect()
    }

    pub fn camera_actor(&self) -> Option<&str> {
        self.camera_actor.as_deref()
    }

    pub fn game_time(&self) -> f64 {
        self.game_time
    }

    /// Simulation time of the most recent reset, if one has happened.
    pub fn last_reset_time(&self) -> Option<f64> {
        self.last_reset_time
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    /// Assign a brain to an actor, making it ready for delivery. Called by
    /// the behavior-database integration once authoring data is resolved.
    pub fn assign_brain(&mut self, actor: &str, brain_name: &str) -> RuntimeResult<()> {
        let record = self
            .actors
            .get_mut(actor)
            .ok_or_else(|| RuntimeError::UnknownActor {
                name: actor.to_string(),
                operation: "assign_brain",
            })?;
        debug!(actor, brain = brain_name, "assigning brain");
        record.brain_name = Some(brain_name.to_string());
        Ok(())
    }

    /// Move an actor in or out of the active simulation scope.
    pub fn set_offstage(&mut self, actor: &str, offstage: bool) -> RuntimeResult<()> {
        let record = self
            .actors
            .get_mut(actor)
            .ok_or_else(|| RuntimeError::UnknownActor {
                name: actor.to_string(),
                operation: "set_offstage",
            })?;
        record.is_offstage = offstage;
        Ok(())
    }

    // --- Internal helpers ---------------------------------------------------

    /// Ceiling check shared by every actor-creating operation.
    pub(crate) fn ensure_capacity(
        &self,
        adding: usize,
        operation: &'static str,
    ) -> RuntimeResult<()> {
        let limit = self.settings.limits.max_actors;
        if self.actors.len() + adding > limit {
            return Err(RuntimeError::ActorCeiling {
                registered: self.actors.len(),
                limit,
                operation,
            });
        }
        Ok(())
    }
}
