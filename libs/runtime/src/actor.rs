//! Actor records.
//!
//! An actor is owned exclusively by the registry while alive. Identity is
//! the stable `name`; the `temp_id` is a short-lived wire index that is only
//! meaningful between two roster syncs and is never used as identity.

use bytes::{Bytes, BytesMut};
use codec::{wire, CodecResult};
use serde_json::{Map, Value};

use crate::brain::BrainRegistry;
use crate::error::RuntimeError;
use types::SpawnFrame;

/// A named participant in message exchange, locally owned or a mirror of a
/// remote peer's actor.
#[derive(Debug, Clone)]
pub struct Actor {
    pub(crate) name: String,
    pub(crate) temp_id: Option<u16>,
    pub(crate) brain_name: Option<String>,
    pub(crate) is_local: bool,
    pub(crate) is_offstage: bool,
    pub(crate) was_cloned_by_script: bool,
    pub(crate) requested_destroy: bool,
    pub(crate) memory_dirty: bool,
    pub(crate) spawn_frame: SpawnFrame,
    /// Per-use behavior memory, keyed by use id. The replicated unit of
    /// dirty-state sync.
    pub(crate) memory: Map<String, Value>,
    pub(crate) age_seconds: f64,
    pub(crate) host_index: Option<u32>,
}

impl Actor {
    /// A locally-owned actor, not yet ready: no brain assigned, so it is
    /// excluded from delivery until the behavior database catches up.
    pub fn new_local(name: String, spawn_frame: SpawnFrame) -> Self {
        Self {
            name,
            temp_id: None,
            brain_name: None,
            is_local: true,
            is_offstage: false,
            was_cloned_by_script: false,
            requested_destroy: false,
            memory_dirty: false,
            spawn_frame,
            memory: Map::new(),
            age_seconds: 0.0,
            host_index: None,
        }
    }

    /// A mirror of an actor another peer is authoritative for, created by a
    /// roster sync.
    pub fn new_mirror(name: String) -> Self {
        Self {
            is_local: false,
            ..Self::new_local(name, SpawnFrame::default())
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wire index from the most recent roster sync, if this actor appeared
    /// in one.
    pub fn temp_id(&self) -> Option<u16> {
        self.temp_id
    }

    pub fn brain_name(&self) -> Option<&str> {
        self.brain_name.as_deref()
    }

    /// Ready means a brain has been assigned; only ready actors receive
    /// deliveries.
    pub fn is_ready(&self) -> bool {
        self.brain_name.is_some()
    }

    pub fn is_local(&self) -> bool {
        self.is_local
    }

    pub fn is_offstage(&self) -> bool {
        self.is_offstage
    }

    pub fn spawn_frame(&self) -> SpawnFrame {
        self.spawn_frame
    }

    pub fn age_seconds(&self) -> f64 {
        self.age_seconds
    }

    pub fn memory_dirty(&self) -> bool {
        self.memory_dirty
    }

    /// Entity index the host engine reported at creation, if this side
    /// created the entity.
    pub fn host_index(&self) -> Option<u32> {
        self.host_index
    }

    /// Fast interest check for broadcast scans; delegates to the brain
    /// definition. An actor with no brain is interested in nothing.
    pub fn has_handlers_for(&self, message: &str, brains: &dyn BrainRegistry) -> bool {
        self.brain_name
            .as_deref()
            .and_then(|b| brains.brain(b))
            .is_some_and(|b| b.handles(message))
    }

    /// Full memory snapshot as a JSON object.
    pub fn memory_json(&self) -> Value {
        Value::Object(self.memory.clone())
    }

    pub fn has_use_memory(&self, use_id: &str) -> bool {
        self.memory.contains_key(use_id)
    }

    /// Create an empty memory slot for a behavior use.
    pub fn create_use_memory(&mut self, use_id: &str) {
        self.memory
            .insert(use_id.to_string(), Value::Object(Map::new()));
        self.memory_dirty = true;
    }

    pub fn use_memory(&self, use_id: &str) -> Option<&Value> {
        self.memory.get(use_id)
    }

    /// Replace a use's memory, marking the actor dirty for the next sync.
    pub fn set_use_memory(&mut self, use_id: &str, value: Value) {
        self.memory.insert(use_id.to_string(), value);
        self.memory_dirty = true;
    }

    /// Reset notification: a new epoch starts with empty behavior memory
    /// and nothing pending to sync.
    pub fn on_reset_game(&mut self) {
        self.memory.clear();
        self.memory_dirty = false;
    }

    /// Per-tick housekeeping.
    pub(crate) fn update(&mut self, delta_seconds: f64) {
        self.age_seconds += delta_seconds;
    }

    /// Encode this actor's replicated state into a delta entry payload and
    /// clear the dirty flag as the unit of synchronization.
    pub(crate) fn encode_dirty_state(&mut self, buf: &mut BytesMut) -> CodecResult<()> {
        let blob = Value::Object(self.memory.clone()).to_string().into_bytes();
        wire::put_blob(buf, &blob, &format!("dirty state for '{}'", self.name))?;
        self.memory_dirty = false;
        Ok(())
    }

    /// Decode a delta entry payload produced by [`Actor::encode_dirty_state`]
    /// and clear the dirty flag.
    pub(crate) fn decode_dirty_state(&mut self, buf: &mut Bytes) -> Result<(), RuntimeError> {
        let blob = wire::get_blob(buf, &format!("dirty state for '{}'", self.name))
            .map_err(RuntimeError::Codec)?;
        self.apply_dirty_blob(&blob)
    }

    pub(crate) fn apply_dirty_blob(&mut self, blob: &[u8]) -> Result<(), RuntimeError> {
        let value: Value =
            serde_json::from_slice(blob).map_err(|e| RuntimeError::CorruptActorState {
                name: self.name.clone(),
                reason: e.to_string(),
            })?;
        match value {
            Value::Object(map) => {
                self.memory = map;
                self.memory_dirty = false;
                Ok(())
            }
            other => Err(RuntimeError::CorruptActorState {
                name: self.name.clone(),
                reason: format!("expected object, got {other}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_actor_is_not_ready() {
        let actor = Actor::new_local("door_1".to_string(), SpawnFrame::default());
        assert!(!actor.is_ready());
        assert!(actor.is_local());
        assert_eq!(actor.temp_id(), None);
    }

    #[test]
    fn test_memory_mutation_marks_dirty() {
        let mut actor = Actor::new_local("door_1".to_string(), SpawnFrame::default());
        assert!(!actor.memory_dirty());

        actor.set_use_memory("door_use", json!({ "open": true }));
        assert!(actor.memory_dirty());
        assert_eq!(actor.use_memory("door_use"), Some(&json!({ "open": true })));
    }

    #[test]
    fn test_dirty_state_round_trip() {
        let mut sender = Actor::new_local("crate_1".to_string(), SpawnFrame::default());
        sender.set_use_memory("loot", json!({ "coins": 7 }));

        let mut buf = BytesMut::new();
        sender.encode_dirty_state(&mut buf).unwrap();
        assert!(!sender.memory_dirty());

        let mut receiver = Actor::new_mirror("crate_1".to_string());
        receiver.memory_dirty = true;
        receiver.decode_dirty_state(&mut buf.freeze()).unwrap();
        assert!(!receiver.memory_dirty());
        assert_eq!(receiver.use_memory("loot"), Some(&json!({ "coins": 7 })));
    }

    #[test]
    fn test_reset_clears_memory() {
        let mut actor = Actor::new_local("crate_1".to_string(), SpawnFrame::default());
        actor.set_use_memory("loot", json!({ "coins": 7 }));

        actor.on_reset_game();
        assert!(!actor.memory_dirty());
        assert_eq!(actor.memory_json(), json!({}));
    }

    #[test]
    fn test_corrupt_blob_rejected() {
        let mut actor = Actor::new_mirror("crate_1".to_string());
        let err = actor.apply_dirty_blob(b"[1,2,3]").unwrap_err();
        assert!(matches!(err, RuntimeError::CorruptActorState { .. }));
    }
}
