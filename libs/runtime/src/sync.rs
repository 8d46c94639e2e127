//! State-sync application: roster adoption and dirty-state exchange.
//!
//! The codec crate frames the bytes; this module is where the frames meet
//! the registry. The roster table established here is the sole resolver for
//! delta-sync temp ids until the next roster lands.

use bytes::Bytes;
use codec::{
    decode_roster, encode_roster, encode_roster_unchanged, wire, CodecError, DeltaEntry,
    DeltaReader, DeltaWriter,
};
use tracing::{debug, trace, warn};

use crate::actor::Actor;
use crate::error::{RuntimeError, RuntimeResult};
use crate::runtime::StageRuntime;

impl StageRuntime {
    /// Encode a roster snapshot of this registry, assigning fresh temp ids
    /// locally so the sender and receivers agree on the index space.
    ///
    /// Emits the two-byte "unchanged" frame when the actor list has not
    /// moved since the last snapshot (configurable).
    pub fn encode_roster_sync(&mut self) -> RuntimeResult<Bytes> {
        let names: Vec<String> = self.actors.keys().cloned().collect();

        if self.roster_synced
            && self.settings.sync.roster_skip_when_unchanged
            && names == self.roster_table
        {
            trace!("roster unchanged, emitting skip frame");
            return Ok(encode_roster_unchanged());
        }

        let frame = encode_roster(&names)?;
        self.adopt_roster(names);
        Ok(frame)
    }

    /// Apply a roster frame received from the authoritative peer.
    ///
    /// Creates any listed actor not already present (as a not-ready remote
    /// mirror), reassigns every temp id to the new index order, and removes
    /// every registered actor the list omits. An "unchanged" frame mutates
    /// nothing.
    pub fn apply_roster_sync(&mut self, mut frame: Bytes) -> RuntimeResult<()> {
        let Some(names) = decode_roster(&mut frame)? else {
            trace!("roster skip frame, registry untouched");
            return Ok(());
        };

        let removed: Vec<String> = self
            .actors
            .keys()
            .filter(|name| !names.contains(name))
            .cloned()
            .collect();
        let added = names
            .iter()
            .filter(|name| !self.actors.contains_key(*name))
            .count();

        // The ceiling binds snapshot merges like any other creation path.
        let limit = self.settings.limits.max_actors;
        let resulting = self.actors.len() - removed.len() + added;
        if resulting > limit {
            return Err(RuntimeError::ActorCeiling {
                registered: self.actors.len(),
                limit,
                operation: "roster sync",
            });
        }

        for name in &removed {
            debug!(actor = %name, "roster sync: removing absent actor");
            self.actors.remove(name);
        }
        for name in &names {
            if !self.actors.contains_key(name) {
                debug!(actor = %name, "roster sync: creating mirror");
                self.actors
                    .insert(name.clone(), Actor::new_mirror(name.clone()));
            }
        }

        self.adopt_roster(names);
        Ok(())
    }

    fn adopt_roster(&mut self, names: Vec<String>) {
        for (index, name) in names.iter().enumerate() {
            if let Some(actor) = self.actors.get_mut(name) {
                actor.temp_id = Some(index as u16);
            }
        }
        self.roster_table = names;
        self.roster_synced = true;
    }

    /// Encode every dirty actor's replicated state for transmission,
    /// clearing dirty flags as entries are written.
    ///
    /// Two passes over the registry — count, then emit — and both iterate
    /// the same ordered snapshot, which the length-prefixed frame requires.
    pub fn encode_dirty_actors(&mut self) -> RuntimeResult<Bytes> {
        let qualifying: Vec<String> = self
            .actors
            .values()
            .filter(|a| a.memory_dirty && !a.requested_destroy)
            .map(|a| a.name.clone())
            .collect();
        if qualifying.len() >= u16::MAX as usize {
            return Err(CodecError::FrameTooLarge {
                count: qualifying.len(),
                max: u16::MAX as usize - 1,
            }
            .into());
        }

        let mut writer = DeltaWriter::new(qualifying.len() as u16);
        for name in &qualifying {
            let Some(actor) = self.actors.get_mut(name) else {
                continue;
            };
            match actor.temp_id {
                Some(id) => actor.encode_dirty_state(writer.entry(id))?,
                None => {
                    // Dirty but never rostered: hold the state until the
                    // next roster refresh gives it an id.
                    warn!(actor = %name, "dirty actor has no roster id, emitting skip slot");
                    writer.skip_entry();
                }
            }
        }
        Ok(writer.finish()?)
    }

    /// Apply a dirty-state delta received from a peer.
    ///
    /// Skip slots are ignored without lookup. An id beyond the roster table
    /// is fatal stream corruption and aborts the remaining frame. An id that
    /// resolves to an actor removed since the roster is consumed and
    /// discarded — that is an ordinary race, not corruption.
    pub fn apply_dirty_delta(&mut self, frame: Bytes) -> RuntimeResult<()> {
        assert!(
            self.roster_synced,
            "dirty delta applied before any roster sync"
        );

        let mut reader = DeltaReader::new(frame)?;
        while let Some(entry) = reader.next_entry()? {
            let id = match entry {
                DeltaEntry::Skip => continue,
                DeltaEntry::Actor(id) => id,
            };

            let name = self
                .roster_table
                .get(id as usize)
                .cloned()
                .ok_or(CodecError::UnknownTempId {
                    temp_id: id,
                    table_len: self.roster_table.len(),
                })?;

            // Consume the payload either way to stay on the entry boundary.
            let blob = wire::get_blob(reader.payload(), &format!("delta payload for '{name}'"))
                .map_err(RuntimeError::Codec)?;
            match self.actors.get_mut(&name) {
                Some(actor) => actor.apply_dirty_blob(&blob)?,
                None => {
                    trace!(actor = %name, "delta for removed actor, discarding");
                }
            }
        }
        Ok(())
    }
}
