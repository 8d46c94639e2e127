//! Reset coordinator.
//!
//! A `ResetGame` broadcast starts a new epoch. Everything queued before the
//! reset — main queue and deferred buffer alike — is discarded so no
//! pre-reset message leaks into the new epoch, script-created clones are
//! destroyed, and every surviving actor is notified before interested local
//! actors receive their `Init`.

use serde_json::Value;
use tracing::{debug, info, warn};

use types::{names, MessageDelivery};

use crate::runtime::StageRuntime;

impl StageRuntime {
    /// Run the reset sub-protocol. Invoked by the pump when it dequeues a
    /// `ResetGame` broadcast, before that broadcast's own delivery scan.
    pub(crate) fn run_reset(&mut self) {
        info!(game_time = self.game_time, "reset: starting new epoch");
        self.stats.resets += 1;

        // Destroy transient clones. Only locally-owned actors can be
        // destroyed from this side; mirrors reset on their own peer.
        let clones: Vec<String> = self
            .actors
            .values()
            .filter(|a| a.is_local && a.was_cloned_by_script)
            .map(|a| a.name.clone())
            .collect();
        if !clones.is_empty() {
            if let Err(e) = self.host.destroy_actors(&clones) {
                // The epoch change must proceed regardless; the entities
                // will be reaped by a later destroy request or roster sync.
                warn!(error = %e, count = clones.len(), "host refused clone destruction during reset");
            }
            for name in &clones {
                debug!(actor = %name, "reset: removing script clone");
                self.actors.remove(name);
            }
        }

        self.last_reset_time = Some(self.game_time);

        for actor in self.actors.values_mut() {
            actor.on_reset_game();
        }

        let discarded = self.queue.len() + self.deferred.len();
        if discarded > 0 {
            debug!(discarded, "reset: discarding pre-reset messages");
            self.stats.messages_dropped += discarded as u64;
        }
        self.queue.clear();
        self.deferred.clear();
    }

    /// Post-reset initialization: deliver `Init` to every interested actor,
    /// local actors only — remote mirrors receive their own reset and init
    /// from their owning peer.
    pub(crate) fn deliver_init_locally(&mut self) {
        let delivery = MessageDelivery {
            name: names::INIT.to_string(),
            data: Value::Null,
            game_time: self.game_time,
            sender: None,
        };

        let interested: Vec<String> = self
            .actors
            .values()
            .filter(|a| a.is_local && a.has_handlers_for(names::INIT, self.brains.as_ref()))
            .map(|a| a.name.clone())
            .collect();
        for name in interested {
            self.deliver_to(&name, &delivery);
        }
    }
}
