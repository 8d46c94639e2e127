//! Delivery resolver: the queue pump and per-message routing.
//!
//! The pump is the sole queue consumer and runs to exhaustion once per tick.
//! Handlers run synchronously inside it and may enqueue new messages, which
//! land at the queue tail of the same pass — causal FIFO order is preserved
//! because a handler's sends are not processed until the handler returns.
//!
//! A missing target or a not-yet-ready actor is a routine condition here,
//! never an error: targeted messages legitimately race with actor removal,
//! and newly created actors wait for the behavior database.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use tracing::{trace, warn};

use types::{names, unpack_message_data, MessageDelivery};

use crate::runtime::{PendingMessage, StageRuntime};

/// Message kinds every peer generates locally each tick or lifecycle event.
/// Forwarding them would be redundant traffic.
static NEVER_FORWARDED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [names::TICK, names::LOCAL_TICK, names::INIT, names::CLONED]
        .into_iter()
        .collect()
});

/// Message kinds that still run locally on a remote-owned mirror.
static MIRROR_LOCAL_DELIVERY: Lazy<HashSet<&'static str>> =
    Lazy::new(|| [names::LOCAL_TICK].into_iter().collect());

/// Whether a message kind is eligible for remote forwarding.
pub fn should_remote_forward(message: &str) -> bool {
    !NEVER_FORWARDED.contains(message)
}

/// Whether a message kind is delivered locally even when the recipient is a
/// remote-owned mirror.
pub fn delivers_locally_on_mirror(message: &str) -> bool {
    MIRROR_LOCAL_DELIVERY.contains(message)
}

impl StageRuntime {
    /// Drain the queue, then re-submit deferred items for the next tick.
    ///
    /// Deferred items are never reprocessed within the pump that deferred
    /// them; re-queueing after the drain puts them at the head-equivalent of
    /// the next tick without busy-looping inside this one.
    pub(crate) fn pump(&mut self) {
        while let Some(item) = self.queue.pop_front() {
            self.dispatch(item);
        }

        let bound = self.settings.limits.max_deferred_ticks;
        let deferred = std::mem::take(&mut self.deferred);
        for mut item in deferred {
            item.ticks_deferred += 1;
            if item.ticks_deferred > bound {
                warn!(
                    message = %item.msg.name,
                    to = ?item.msg.to,
                    ticks = item.ticks_deferred,
                    "dropping message deferred past the configured bound"
                );
                self.stats.messages_dropped += 1;
            } else {
                self.queue.push_back(item);
            }
        }
    }

    fn dispatch(&mut self, pending: PendingMessage) {
        // Unpack exactly once; the delivery value is shared by every
        // recipient of a broadcast and by the single forwarded copy.
        let data = match unpack_message_data(&pending.msg.data) {
            Ok(value) => value,
            Err(e) => {
                warn!(message = %pending.msg.name, error = %e, "dropping undecodable message");
                self.stats.messages_dropped += 1;
                return;
            }
        };
        let delivery = MessageDelivery {
            name: pending.msg.name.clone(),
            data,
            game_time: self.game_time,
            sender: pending.msg.from.clone(),
        };

        let forwardable = should_remote_forward(&pending.msg.name);
        let force_local = delivers_locally_on_mirror(&pending.msg.name);

        if pending.msg.to.is_some() {
            self.dispatch_targeted(pending, &delivery, forwardable, force_local);
        } else {
            self.dispatch_broadcast(pending, &delivery, forwardable, force_local);
        }
    }

    fn dispatch_targeted(
        &mut self,
        pending: PendingMessage,
        delivery: &MessageDelivery,
        forwardable: bool,
        force_local: bool,
    ) {
        let target = pending.msg.to.clone().unwrap_or_default();

        let Some(actor) = self.actors.get(&target) else {
            // Raced with removal; expected, not an error.
            trace!(message = %delivery.name, to = %target, "target gone, discarding");
            return;
        };

        if !actor.is_ready() {
            trace!(message = %delivery.name, to = %target, "target not ready, deferring");
            self.stats.messages_deferred += 1;
            self.deferred.push(pending);
            return;
        }

        if actor.is_local || force_local {
            self.deliver_to(&target, delivery);
        } else if forwardable {
            self.peers
                .forward(Some(&target), &pending.msg.name, &pending.msg.data);
            self.stats.messages_forwarded += 1;
        }
    }

    fn dispatch_broadcast(
        &mut self,
        pending: PendingMessage,
        delivery: &MessageDelivery,
        forwardable: bool,
        force_local: bool,
    ) {
        let is_reset = pending.msg.name == names::RESET_GAME;
        if is_reset {
            self.run_reset();
        }

        // Interest scan. The camera actor always goes last so camera-follow
        // behaviors never observe a partially updated tick.
        let mut interested = Vec::new();
        let mut camera = None;
        for actor in self.actors.values() {
            if !actor.has_handlers_for(&delivery.name, self.brains.as_ref()) {
                continue;
            }
            if self.camera_actor.as_deref() == Some(actor.name()) {
                camera = Some(actor.name.clone());
            } else {
                interested.push(actor.name.clone());
            }
        }
        interested.extend(camera);

        let opts = pending.msg.options;
        let mut forward_needed = false;
        for name in interested {
            // A handler earlier in the scan may have destroyed this actor.
            let Some(actor) = self.actors.get(&name) else {
                continue;
            };
            let eligible = if actor.is_offstage {
                opts.offstage
            } else {
                opts.onstage
            };
            if !eligible {
                continue;
            }

            if actor.is_local || force_local {
                self.deliver_to(&name, delivery);
            } else if forwardable {
                forward_needed = true;
            }
        }

        // One forward for the whole broadcast, and never for a message that
        // itself came from a peer.
        if forward_needed && !opts.from_remote {
            self.peers.forward(None, &pending.msg.name, &pending.msg.data);
            self.stats.messages_forwarded += 1;
        }
        self.stats.broadcasts += 1;

        if is_reset {
            self.deliver_init_locally();
        }
    }

    /// Invoke every handler binding the target's brain declares for this
    /// message, creating each use's local memory slot on first contact.
    pub(crate) fn deliver_to(&mut self, actor_name: &str, delivery: &MessageDelivery) {
        let Some(brain_name) = self
            .actors
            .get(actor_name)
            .and_then(|a| a.brain_name.clone())
        else {
            return;
        };
        let Some(brain) = self.brains.brain(&brain_name) else {
            // Behavior database lagging behind the assignment; treat as
            // not interested rather than failing the pump.
            trace!(actor = actor_name, brain = %brain_name, "brain not resolvable yet");
            return;
        };

        let bindings = brain.handlers_for(&delivery.name);
        if bindings.is_empty() {
            return;
        }

        for binding in &bindings {
            match self.actors.get_mut(actor_name) {
                Some(actor) => {
                    if !actor.has_use_memory(&binding.use_id) {
                        actor.create_use_memory(&binding.use_id);
                    }
                }
                // Destroyed by a previous binding's handler.
                None => return,
            }
            if let Err(e) = binding
                .handler
                .handle(self, actor_name, &binding.use_id, delivery)
            {
                warn!(
                    actor = actor_name,
                    message = %delivery.name,
                    use_id = %binding.use_id,
                    error = %e,
                    "message handler failed"
                );
            }
        }
        self.stats.messages_delivered += 1;
        trace!(actor = actor_name, message = %delivery.name, "delivered");
    }
}
