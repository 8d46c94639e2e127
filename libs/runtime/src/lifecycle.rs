//! Lifecycle operations: instantiate, clone, batched destroy.
//!
//! Every actor-creating operation is gated by the configured ceiling — a
//! hard failure, never silent truncation. Actual entity work is delegated to
//! the host engine; the registry only records the outcome.

use serde_json::json;
use tracing::debug;

use types::{names, Rotation, SendMessageOptions, SpawnFrame, Vec3};

use crate::actor::Actor;
use crate::error::{RuntimeError, RuntimeResult};
use crate::runtime::StageRuntime;

impl StageRuntime {
    /// Instantiate a prefab as a new local actor.
    ///
    /// The new actor registers not-yet-ready (no brain), so it is excluded
    /// from delivery until the behavior database assigns one.
    pub fn instantiate(
        &mut self,
        prefab: &str,
        creator: Option<&str>,
        position: Vec3,
        rotation: Rotation,
    ) -> RuntimeResult<String> {
        self.ensure_capacity(1, "instantiate")?;

        let frame = SpawnFrame::new(position, rotation);
        let spawned = self.host.instantiate_prefab(prefab, frame)?;
        debug!(actor = %spawned.name, prefab, creator = ?creator, "registering instantiated actor");

        let mut actor = Actor::new_local(spawned.name.clone(), frame);
        actor.host_index = Some(spawned.index);
        self.actors.insert(spawned.name.clone(), actor);
        Ok(spawned.name)
    }

    /// Clone an existing actor, fanning out to every actor the host creates
    /// for it (base plus sub-hierarchy).
    ///
    /// Registration is two-phase: all clones are registered first, then each
    /// is sent its notification — so a notification handler can never
    /// observe a not-yet-registered sibling.
    pub fn clone_actor(
        &mut self,
        base_name: &str,
        creator: &str,
        position: Vec3,
        rotation: Rotation,
    ) -> RuntimeResult<Vec<String>> {
        self.ensure_capacity(1, "clone")?;

        let base = self
            .actors
            .get(base_name)
            .ok_or_else(|| RuntimeError::UnknownActor {
                name: base_name.to_string(),
                operation: "clone",
            })?;
        let brain_name = base.brain_name.clone();
        let memory = base.memory.clone();

        let frame = SpawnFrame::new(position, rotation);
        let spawned = self.host.clone_actor(base_name, frame)?;

        let mut created = Vec::with_capacity(spawned.len());
        for entry in spawned {
            debug!(actor = %entry.name, base = base_name, "registering clone");
            let mut actor = Actor::new_local(entry.name.clone(), frame);
            actor.brain_name = brain_name.clone();
            actor.memory = memory.clone();
            actor.was_cloned_by_script = true;
            actor.host_index = Some(entry.index);
            self.actors.insert(entry.name.clone(), actor);
            created.push(entry.name);
        }

        for name in &created {
            self.send_message(
                Some(name.as_str()),
                names::CLONED,
                &json!({ "creator": creator, "original": base_name }),
                Some(creator),
                SendMessageOptions::default(),
            )?;
        }

        Ok(created)
    }

    /// Request destruction of a batch of actors. Remote-owned mirrors are
    /// filtered out — they cannot be destroyed from this side.
    ///
    /// The registry is not mutated synchronously: actors are marked and
    /// removed by the end-of-tick sweep (or by a later roster sync),
    /// whichever lands first.
    pub fn destroy_batch(&mut self, actor_names: &[String]) -> RuntimeResult<()> {
        let local: Vec<String> = actor_names
            .iter()
            .filter(|n| self.actors.get(*n).is_some_and(|a| a.is_local))
            .cloned()
            .collect();
        if local.is_empty() {
            return Ok(());
        }

        self.host.destroy_actors(&local)?;
        for name in &local {
            if let Some(actor) = self.actors.get_mut(name) {
                actor.requested_destroy = true;
            }
        }
        debug!(count = local.len(), "destroy requested for local actors");
        Ok(())
    }
}
