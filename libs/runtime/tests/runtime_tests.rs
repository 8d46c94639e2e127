//! # Runtime Integration Tests
//!
//! End-to-end tests of the dispatch core against mock collaborators:
//! deferral and eventual delivery, broadcast forward dedup, ping-pong
//! prevention, reset epoch semantics, sync round trips, and ceiling
//! enforcement.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use serde_json::{json, Value};

use actor_runtime::{
    Brain, BrainRegistry, HandlerBinding, HostEngine, HostError, PeerForwarder, RuntimeError,
    SpawnedActor, StageRuntime, UseHandler,
};
use codec::{CodecError, DeltaWriter};
use config::RuntimeSettings;
use types::{names, MessageDelivery, SendMessageOptions, SpawnFrame};

// --- Mock collaborators -----------------------------------------------------

/// Shared record of every handler invocation: (actor, message, sender).
#[derive(Default)]
struct DeliveryLog(Mutex<Vec<(String, String, Option<String>)>>);

impl DeliveryLog {
    fn entries(&self) -> Vec<(String, String, Option<String>)> {
        self.0.lock().unwrap().clone()
    }

    fn count_of(&self, actor: &str, message: &str) -> usize {
        self.entries()
            .iter()
            .filter(|(a, m, _)| a == actor && m == message)
            .count()
    }
}

struct Recorder {
    log: Arc<DeliveryLog>,
}

impl UseHandler for Recorder {
    fn handle(
        &self,
        _world: &mut StageRuntime,
        actor: &str,
        _use_id: &str,
        delivery: &MessageDelivery,
    ) -> anyhow::Result<()> {
        self.log.0.lock().unwrap().push((
            actor.to_string(),
            delivery.name.clone(),
            delivery.sender.clone(),
        ));
        Ok(())
    }
}

/// Records like `Recorder`, and answers "First" by sending "Second".
struct ChainSender {
    log: Arc<DeliveryLog>,
}

impl UseHandler for ChainSender {
    fn handle(
        &self,
        world: &mut StageRuntime,
        actor: &str,
        _use_id: &str,
        delivery: &MessageDelivery,
    ) -> anyhow::Result<()> {
        self.log.0.lock().unwrap().push((
            actor.to_string(),
            delivery.name.clone(),
            delivery.sender.clone(),
        ));
        if delivery.name == "First" {
            world.send_message(None, "Second", &Value::Null, Some(actor), Default::default())?;
        }
        Ok(())
    }
}

struct StaticBrain {
    interests: Vec<&'static str>,
    chain: bool,
    log: Arc<DeliveryLog>,
}

impl Brain for StaticBrain {
    fn handles(&self, message: &str) -> bool {
        self.interests.contains(&message)
    }

    fn handlers_for(&self, message: &str) -> Vec<HandlerBinding> {
        if !self.handles(message) {
            return Vec::new();
        }
        let handler: Arc<dyn UseHandler> = if self.chain {
            Arc::new(ChainSender {
                log: self.log.clone(),
            })
        } else {
            Arc::new(Recorder {
                log: self.log.clone(),
            })
        };
        vec![HandlerBinding {
            use_id: "use0".to_string(),
            handler,
        }]
    }
}

#[derive(Default)]
struct TestBrains {
    brains: Mutex<HashMap<String, Arc<dyn Brain>>>,
}

impl TestBrains {
    fn define(&self, name: &str, interests: Vec<&'static str>, log: &Arc<DeliveryLog>) {
        self.brains.lock().unwrap().insert(
            name.to_string(),
            Arc::new(StaticBrain {
                interests,
                chain: false,
                log: log.clone(),
            }),
        );
    }

    fn define_chain(&self, name: &str, interests: Vec<&'static str>, log: &Arc<DeliveryLog>) {
        self.brains.lock().unwrap().insert(
            name.to_string(),
            Arc::new(StaticBrain {
                interests,
                chain: true,
                log: log.clone(),
            }),
        );
    }
}

impl BrainRegistry for TestBrains {
    fn brain(&self, name: &str) -> Option<Arc<dyn Brain>> {
        self.brains.lock().unwrap().get(name).cloned()
    }
}

#[derive(Default)]
struct TestHost {
    next_index: Mutex<u32>,
    camera: Mutex<Option<String>>,
    destroyed: Mutex<Vec<String>>,
    clone_fanout: usize,
}

impl TestHost {
    fn with_fanout(fanout: usize) -> Self {
        Self {
            clone_fanout: fanout,
            ..Self::default()
        }
    }
}

impl HostEngine for TestHost {
    fn instantiate_prefab(
        &self,
        prefab: &str,
        _frame: SpawnFrame,
    ) -> Result<SpawnedActor, HostError> {
        let mut index = self.next_index.lock().unwrap();
        *index += 1;
        Ok(SpawnedActor {
            name: format!("{prefab}_{index}", index = *index),
            index: *index,
        })
    }

    fn clone_actor(&self, base: &str, _frame: SpawnFrame) -> Result<Vec<SpawnedActor>, HostError> {
        let fanout = self.clone_fanout.max(1);
        let mut index = self.next_index.lock().unwrap();
        let mut spawned = Vec::new();
        for _ in 0..fanout {
            *index += 1;
            spawned.push(SpawnedActor {
                name: format!("{base}_c{index}", index = *index),
                index: *index,
            });
        }
        Ok(spawned)
    }

    fn destroy_actors(&self, actor_names: &[String]) -> Result<(), HostError> {
        self.destroyed.lock().unwrap().extend_from_slice(actor_names);
        Ok(())
    }

    fn camera_actor_name(&self) -> Option<String> {
        self.camera.lock().unwrap().clone()
    }
}

#[derive(Default)]
struct TestPeers {
    forwards: Mutex<Vec<(Option<String>, String)>>,
}

impl TestPeers {
    fn forward_count(&self) -> usize {
        self.forwards.lock().unwrap().len()
    }
}

impl PeerForwarder for TestPeers {
    fn forward(&self, target: Option<&str>, message_name: &str, _packed: &Bytes) {
        self.forwards
            .lock()
            .unwrap()
            .push((target.map(str::to_string), message_name.to_string()));
    }
}

// --- Fixture ----------------------------------------------------------------

struct Fixture {
    rt: StageRuntime,
    brains: Arc<TestBrains>,
    host: Arc<TestHost>,
    peers: Arc<TestPeers>,
    log: Arc<DeliveryLog>,
    ticks: u32,
}

impl Fixture {
    fn new() -> Self {
        Self::with_settings(RuntimeSettings::default())
    }

    fn with_settings(settings: RuntimeSettings) -> Self {
        Self::with_host(settings, TestHost::with_fanout(1))
    }

    fn with_host(settings: RuntimeSettings, host: TestHost) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let brains = Arc::new(TestBrains::default());
        let host = Arc::new(host);
        let peers = Arc::new(TestPeers::default());
        let rt = StageRuntime::new(
            settings,
            brains.clone() as Arc<dyn BrainRegistry>,
            host.clone() as Arc<dyn HostEngine>,
            peers.clone() as Arc<dyn PeerForwarder>,
        );
        Self {
            rt,
            brains,
            host,
            peers,
            log: Arc::new(DeliveryLog::default()),
            ticks: 0,
        }
    }

    /// Instantiate a local actor and assign it a same-named brain with the
    /// given interests.
    fn spawn_ready(&mut self, prefab: &str, interests: Vec<&'static str>) -> String {
        let name = self
            .rt
            .instantiate(prefab, None, Default::default(), Default::default())
            .unwrap();
        self.brains.define(&name, interests, &self.log);
        self.rt.assign_brain(&name, &name).unwrap();
        name
    }

    /// Adopt a roster containing both existing actors and `mirrors`, which
    /// become remote-owned mirrors; the mirrors get interested brains.
    fn add_mirrors(&mut self, mirrors: &[&str], interests: Vec<&'static str>) {
        let mut roster = self.rt.actor_names();
        roster.extend(mirrors.iter().map(|m| m.to_string()));
        roster.sort();
        let frame = codec::encode_roster(&roster).unwrap();
        self.rt.apply_roster_sync(frame).unwrap();
        for mirror in mirrors {
            self.brains.define(mirror, interests.clone(), &self.log);
            self.rt.assign_brain(mirror, mirror).unwrap();
            assert!(!self.rt.actor(mirror).unwrap().is_local());
        }
    }

    fn tick(&mut self) {
        self.ticks += 1;
        self.rt.on_tick(0.016, 0.016 * f64::from(self.ticks));
    }
}

// --- Deferral ---------------------------------------------------------------

#[test]
fn test_never_ready_target_defers_every_tick() {
    let mut fx = Fixture::new();
    let name = fx
        .rt
        .instantiate("statue", None, Default::default(), Default::default())
        .unwrap();
    // No brain assigned: the actor is never ready.

    fx.rt
        .send_message(Some(name.as_str()), "Poke", &json!({}), None, Default::default())
        .unwrap();

    for expected in 1..=5u64 {
        fx.tick();
        assert_eq!(fx.rt.stats().messages_deferred, expected);
    }
    assert_eq!(fx.rt.stats().messages_delivered, 0);
    assert_eq!(fx.rt.stats().messages_dropped, 0);
    assert!(fx.log.entries().is_empty());
}

#[test]
fn test_deferred_message_dropped_at_bound() {
    let mut settings = RuntimeSettings::default();
    settings.limits.max_deferred_ticks = 3;
    let mut fx = Fixture::with_settings(settings);
    let name = fx
        .rt
        .instantiate("statue", None, Default::default(), Default::default())
        .unwrap();

    fx.rt
        .send_message(Some(name.as_str()), "Poke", &json!({}), None, Default::default())
        .unwrap();

    for _ in 0..3 {
        fx.tick();
    }
    assert_eq!(fx.rt.stats().messages_dropped, 0);
    fx.tick();
    assert_eq!(fx.rt.stats().messages_dropped, 1);
    assert_eq!(fx.rt.stats().messages_delivered, 0);
}

#[test]
fn test_deferred_message_delivered_once_target_ready() {
    let mut fx = Fixture::new();
    let name = fx
        .rt
        .instantiate("door", None, Default::default(), Default::default())
        .unwrap();
    fx.brains.define(&name, vec!["Open"], &fx.log);

    fx.rt
        .send_message(
            Some(name.as_str()),
            "Open",
            &json!({ "speed": 2 }),
            Some("lever_1"),
            Default::default(),
        )
        .unwrap();

    fx.tick();
    assert!(fx.log.entries().is_empty());

    fx.rt.assign_brain(&name, &name).unwrap();
    fx.tick();

    // Delivered exactly once, payload sender preserved.
    let entries = fx.log.entries();
    assert_eq!(
        entries,
        vec![(name.clone(), "Open".to_string(), Some("lever_1".to_string()))]
    );

    fx.tick();
    assert_eq!(fx.log.entries().len(), 1);
}

#[test]
fn test_message_to_unknown_actor_silently_discarded() {
    let mut fx = Fixture::new();
    fx.rt
        .send_message(Some("nobody"), "Poke", &json!({}), None, Default::default())
        .unwrap();
    fx.tick();

    assert_eq!(fx.rt.stats().messages_deferred, 0);
    assert!(fx.log.entries().is_empty());
}

// --- Broadcast and forwarding ----------------------------------------------

#[test]
fn test_broadcast_forwards_exactly_once() {
    let mut fx = Fixture::new();
    let a = fx.spawn_ready("guard", vec!["Alarm"]);
    let b = fx.spawn_ready("guard", vec!["Alarm"]);
    fx.add_mirrors(&["mirror_x", "mirror_y", "mirror_z"], vec!["Alarm"]);

    fx.rt
        .send_message(None, "Alarm", &json!({}), None, Default::default())
        .unwrap();
    fx.tick();

    // Both local actors delivered, one single broadcast forward.
    assert_eq!(fx.log.count_of(&a, "Alarm"), 1);
    assert_eq!(fx.log.count_of(&b, "Alarm"), 1);
    assert_eq!(fx.peers.forward_count(), 1);
    assert_eq!(
        fx.peers.forwards.lock().unwrap()[0],
        (None, "Alarm".to_string())
    );
}

#[test]
fn test_remote_origin_broadcast_never_forwarded_back() {
    let mut fx = Fixture::new();
    fx.spawn_ready("guard", vec!["Alarm"]);
    fx.add_mirrors(&["mirror_x"], vec!["Alarm"]);

    fx.rt
        .receive_remote(None, "Alarm", Bytes::from_static(b"{}"), None)
        .unwrap();
    fx.tick();

    assert_eq!(fx.peers.forward_count(), 0);
    assert_eq!(fx.rt.stats().messages_delivered, 1);
}

#[test]
fn test_intrinsic_broadcast_never_forwarded() {
    let mut fx = Fixture::new();
    fx.add_mirrors(&["mirror_x"], vec![names::TICK]);

    fx.rt
        .send_message(None, names::TICK, &json!({}), None, Default::default())
        .unwrap();
    fx.tick();

    assert_eq!(fx.peers.forward_count(), 0);
}

#[test]
fn test_targeted_message_to_mirror_forwards_to_owner() {
    let mut fx = Fixture::new();
    fx.add_mirrors(&["mirror_x"], vec!["Poke"]);

    fx.rt
        .send_message(Some("mirror_x"), "Poke", &json!({}), None, Default::default())
        .unwrap();
    fx.tick();

    let forwards = fx.peers.forwards.lock().unwrap().clone();
    assert_eq!(
        forwards,
        vec![(Some("mirror_x".to_string()), "Poke".to_string())]
    );
    // Not delivered locally: the owner's peer runs the handlers.
    assert!(fx.log.entries().is_empty());
}

#[test]
fn test_offstage_actor_skipped_unless_requested() {
    let mut fx = Fixture::new();
    let a = fx.spawn_ready("guard", vec!["Alarm"]);
    fx.rt.set_offstage(&a, true).unwrap();

    fx.rt
        .send_message(
            None,
            "Alarm",
            &json!({}),
            None,
            SendMessageOptions {
                offstage: false,
                ..Default::default()
            },
        )
        .unwrap();
    fx.tick();
    assert_eq!(fx.log.count_of(&a, "Alarm"), 0);

    fx.rt
        .send_message(None, "Alarm", &json!({}), None, Default::default())
        .unwrap();
    fx.tick();
    assert_eq!(fx.log.count_of(&a, "Alarm"), 1);
}

#[test]
fn test_camera_actor_processed_last() {
    let mut fx = Fixture::new();
    // Registry order is name-sorted; give the camera the first-sorting name
    // so only the camera-last rule can put it at the end.
    let cam = fx.spawn_ready("aaa_camera", vec!["Frame"]);
    let m = fx.spawn_ready("mmm_prop", vec!["Frame"]);
    let z = fx.spawn_ready("zzz_prop", vec!["Frame"]);
    *fx.host.camera.lock().unwrap() = Some(cam.clone());

    fx.rt
        .send_message(None, "Frame", &json!({}), None, Default::default())
        .unwrap();
    fx.tick();

    let order: Vec<String> = fx.log.entries().iter().map(|(a, _, _)| a.clone()).collect();
    assert_eq!(order, vec![m, z, cam]);
}

#[test]
fn test_tick_messages_generated_each_tick() {
    let mut fx = Fixture::new();
    let a = fx.spawn_ready("clock", vec![names::TICK]);
    fx.add_mirrors(&["mirror_x"], vec![names::LOCAL_TICK]);

    fx.tick();
    fx.tick();

    assert_eq!(fx.log.count_of(&a, names::TICK), 2);
    // LocalTick runs even on remote-owned mirrors, and neither tick kind is
    // ever forwarded.
    assert_eq!(fx.log.count_of("mirror_x", names::LOCAL_TICK), 2);
    assert_eq!(fx.peers.forward_count(), 0);
}

#[test]
fn test_handler_sends_land_in_same_pump_in_causal_order() {
    let mut fx = Fixture::new();
    let name = fx
        .rt
        .instantiate("chained", None, Default::default(), Default::default())
        .unwrap();
    fx.brains
        .define_chain(&name, vec!["First", "Second"], &fx.log);
    fx.rt.assign_brain(&name, &name).unwrap();

    fx.rt
        .send_message(None, "First", &json!({}), None, Default::default())
        .unwrap();
    fx.tick();

    let messages: Vec<String> = fx.log.entries().iter().map(|(_, m, _)| m.clone()).collect();
    assert_eq!(messages, vec!["First".to_string(), "Second".to_string()]);
}

// --- Reset ------------------------------------------------------------------

#[test]
fn test_reset_discards_pending_and_reinitializes() {
    let mut fx = Fixture::new();
    let survivor = fx.spawn_ready("arena", vec!["A", "B", "C", names::INIT]);
    let base = fx.spawn_ready("crate", vec![]);
    let clones = fx
        .rt
        .clone_actor(&base, &survivor, Default::default(), Default::default())
        .unwrap();

    fx.rt
        .actor_mut(&survivor)
        .unwrap()
        .set_use_memory("use0", json!({ "round": 3 }));

    fx.rt
        .send_message(None, "A", &json!({}), None, Default::default())
        .unwrap();
    fx.rt
        .send_message(None, "B", &json!({}), None, Default::default())
        .unwrap();
    fx.rt
        .send_message(None, names::RESET_GAME, &json!({}), None, Default::default())
        .unwrap();
    fx.rt
        .send_message(None, "C", &json!({}), None, Default::default())
        .unwrap();
    fx.tick();

    // A, B and C are never delivered; the epoch swallowed them.
    assert_eq!(fx.log.count_of(&survivor, "A"), 0);
    assert_eq!(fx.log.count_of(&survivor, "B"), 0);
    assert_eq!(fx.log.count_of(&survivor, "C"), 0);

    // Exactly one Init for the interested survivor, after the reset scan.
    assert_eq!(fx.log.count_of(&survivor, names::INIT), 1);

    // Script clones destroyed, survivor's memory reset.
    for clone in &clones {
        assert!(!fx.rt.contains_actor(clone));
    }
    assert!(fx
        .host
        .destroyed
        .lock()
        .unwrap()
        .iter()
        .any(|n| n == &clones[0]));
    // Pre-reset memory is gone; Init delivery recreated an empty use slot.
    assert_eq!(
        fx.rt.actor(&survivor).unwrap().use_memory("use0"),
        Some(&json!({}))
    );
    assert_eq!(fx.rt.last_reset_time(), Some(fx.rt.game_time()));
    assert_eq!(fx.rt.stats().resets, 1);
}

// --- Lifecycle --------------------------------------------------------------

#[test]
fn test_clone_fans_out_and_notifies_each() {
    let mut fx = Fixture::new();
    let base = fx.spawn_ready("turret", vec![names::CLONED]);
    fx.rt
        .actor_mut(&base)
        .unwrap()
        .set_use_memory("use0", json!({ "ammo": 12 }));

    let clones = fx
        .rt
        .clone_actor(&base, "creator_1", Default::default(), Default::default())
        .unwrap();
    assert_eq!(clones.len(), 1);

    // Clones copy brain and memory snapshot, and are script-flagged local
    // actors.
    let clone = fx.rt.actor(&clones[0]).unwrap();
    assert!(clone.is_local());
    assert!(clone.is_ready());
    assert_eq!(clone.use_memory("use0"), Some(&json!({ "ammo": 12 })));

    fx.tick();
    let entries = fx.log.entries();
    assert_eq!(
        entries,
        vec![(
            clones[0].clone(),
            names::CLONED.to_string(),
            Some("creator_1".to_string())
        )]
    );
}

#[test]
fn test_clone_sub_hierarchy_registers_all_before_notifying() {
    let mut fx = Fixture::with_host(RuntimeSettings::default(), TestHost::with_fanout(3));
    let base = fx.spawn_ready("vehicle", vec![names::CLONED]);

    let clones = fx
        .rt
        .clone_actor(&base, "creator_1", Default::default(), Default::default())
        .unwrap();
    assert_eq!(clones.len(), 3);
    for clone in &clones {
        assert!(fx.rt.contains_actor(clone));
        assert!(fx.rt.actor(clone).unwrap().is_ready());
    }

    fx.tick();
    for clone in &clones {
        assert_eq!(fx.log.count_of(clone, names::CLONED), 1);
    }
}

#[test]
fn test_ceiling_blocks_instantiate_and_clone() {
    let mut settings = RuntimeSettings::default();
    settings.limits.max_actors = 2;
    let mut fx = Fixture::with_settings(settings);

    let first = fx.spawn_ready("prop", vec![]);
    fx.spawn_ready("prop", vec![]);
    assert_eq!(fx.rt.actor_count(), 2);

    let err = fx
        .rt
        .instantiate("prop", None, Default::default(), Default::default())
        .unwrap_err();
    assert!(matches!(err, RuntimeError::ActorCeiling { limit: 2, .. }));

    let err = fx
        .rt
        .clone_actor(&first, "creator", Default::default(), Default::default())
        .unwrap_err();
    assert!(matches!(err, RuntimeError::ActorCeiling { .. }));

    // Registry untouched by the failed operations.
    assert_eq!(fx.rt.actor_count(), 2);
}

#[test]
fn test_destroy_batch_filters_mirrors_and_sweeps_next_tick() {
    let mut fx = Fixture::new();
    let local = fx.spawn_ready("prop", vec![]);
    fx.add_mirrors(&["mirror_x"], vec![]);

    fx.rt
        .destroy_batch(&[local.clone(), "mirror_x".to_string()])
        .unwrap();

    // Host asked to destroy only the local actor; nothing removed yet.
    assert_eq!(*fx.host.destroyed.lock().unwrap(), vec![local.clone()]);
    assert!(fx.rt.contains_actor(&local));

    fx.tick();
    assert!(!fx.rt.contains_actor(&local));
    assert!(fx.rt.contains_actor("mirror_x"));
}

// --- State sync -------------------------------------------------------------

#[test]
fn test_roster_assigns_dense_temp_ids() {
    let mut fx = Fixture::new();
    let frame = codec::encode_roster(&["a".into(), "b".into(), "c".into()]).unwrap();
    fx.rt.apply_roster_sync(frame).unwrap();

    assert_eq!(fx.rt.actor("a").unwrap().temp_id(), Some(0));
    assert_eq!(fx.rt.actor("b").unwrap().temp_id(), Some(1));
    assert_eq!(fx.rt.actor("c").unwrap().temp_id(), Some(2));
}

#[test]
fn test_roster_removes_absent_actors() {
    let mut fx = Fixture::new();
    let frame = codec::encode_roster(&["a".into(), "b".into(), "c".into()]).unwrap();
    fx.rt.apply_roster_sync(frame).unwrap();

    let frame = codec::encode_roster(&["a".into(), "c".into()]).unwrap();
    fx.rt.apply_roster_sync(frame).unwrap();

    assert!(!fx.rt.contains_actor("b"));
    assert_eq!(fx.rt.actor("c").unwrap().temp_id(), Some(1));
}

#[test]
fn test_dirty_round_trip_between_runtimes() {
    let mut sender = Fixture::new();
    sender.spawn_ready("aaa", vec![]);
    sender.spawn_ready("bbb", vec![]);
    sender.spawn_ready("ccc", vec![]);
    let names = sender.rt.actor_names();

    let roster_frame = sender.rt.encode_roster_sync().unwrap();
    let mut receiver = Fixture::new();
    receiver.rt.apply_roster_sync(roster_frame).unwrap();
    assert_eq!(receiver.rt.actor_count(), 3);

    // Dirty exactly {first, third}.
    sender
        .rt
        .actor_mut(&names[0])
        .unwrap()
        .set_use_memory("u", json!({ "hp": 5 }));
    sender
        .rt
        .actor_mut(&names[2])
        .unwrap()
        .set_use_memory("u", json!({ "hp": 9 }));

    let delta = sender.rt.encode_dirty_actors().unwrap();
    assert!(!sender.rt.actor(&names[0]).unwrap().memory_dirty());
    assert!(!sender.rt.actor(&names[2]).unwrap().memory_dirty());

    receiver.rt.apply_dirty_delta(delta).unwrap();
    let a = receiver.rt.actor(&names[0]).unwrap();
    let b = receiver.rt.actor(&names[1]).unwrap();
    let c = receiver.rt.actor(&names[2]).unwrap();
    assert_eq!(a.use_memory("u"), Some(&json!({ "hp": 5 })));
    assert_eq!(b.use_memory("u"), None);
    assert_eq!(c.use_memory("u"), Some(&json!({ "hp": 9 })));
    assert!(!a.memory_dirty());
}

#[test]
fn test_unchanged_roster_skip_frame() {
    let mut fx = Fixture::new();
    fx.spawn_ready("prop", vec![]);

    let first = fx.rt.encode_roster_sync().unwrap();
    assert!(first.len() > 2);

    let second = fx.rt.encode_roster_sync().unwrap();
    assert_eq!(second.len(), 2);

    // A skip frame leaves a receiver untouched.
    let mut other = Fixture::new();
    other.rt.apply_roster_sync(first).unwrap();
    let before = other.rt.actor_names();
    other.rt.apply_roster_sync(second).unwrap();
    assert_eq!(other.rt.actor_names(), before);
}

#[test]
fn test_skip_sentinel_ignored_without_lookup() {
    let mut fx = Fixture::new();
    let frame = codec::encode_roster(&["a".into()]).unwrap();
    fx.rt.apply_roster_sync(frame).unwrap();

    let mut writer = DeltaWriter::new(2);
    writer.skip_entry();
    writer.skip_entry();
    fx.rt.apply_dirty_delta(writer.finish().unwrap()).unwrap();
}

#[test]
fn test_out_of_range_temp_id_is_fatal() {
    let mut fx = Fixture::new();
    let frame = codec::encode_roster(&["a".into(), "b".into(), "c".into()]).unwrap();
    fx.rt.apply_roster_sync(frame).unwrap();

    let mut writer = DeltaWriter::new(1);
    codec::wire::put_blob(writer.entry(9), b"{}", "test").unwrap();

    let err = fx.rt.apply_dirty_delta(writer.finish().unwrap()).unwrap_err();
    match err {
        RuntimeError::Codec(CodecError::UnknownTempId { temp_id, table_len }) => {
            assert_eq!(temp_id, 9);
            assert_eq!(table_len, 3);
        }
        other => panic!("expected UnknownTempId, got {other:?}"),
    }
}

#[test]
#[should_panic(expected = "before any roster sync")]
fn test_delta_before_roster_is_a_contract_violation() {
    let mut fx = Fixture::new();
    let frame = DeltaWriter::new(0).finish().unwrap();
    let _ = fx.rt.apply_dirty_delta(frame);
}

#[test]
fn test_roster_sync_respects_ceiling() {
    let mut settings = RuntimeSettings::default();
    settings.limits.max_actors = 2;
    let mut fx = Fixture::with_settings(settings);

    let frame = codec::encode_roster(&["a".into(), "b".into(), "c".into()]).unwrap();
    let err = fx.rt.apply_roster_sync(frame).unwrap_err();
    assert!(matches!(err, RuntimeError::ActorCeiling { .. }));
    assert_eq!(fx.rt.actor_count(), 0);
}
