//! Local Shard
//!
//! A fixed-capacity, open-addressed slot array. Exactly one worker owns a
//! shard and only its shard actor touches it, one message at a time, so
//! `try_reserve` gives "first writer wins" without a lock.

use serde::{Deserialize, Serialize};

use super::protocol::InsertOutcome;
use crate::genome::codec::Key;
use crate::genome::types::Record;

#[derive(Debug, Clone, Default)]
pub struct Slot {
    pub used: bool,
    pub record: Option<Record>,
}

/// Diagnostic counters for one shard.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShardStats {
    pub capacity: usize,
    pub occupied: usize,
    /// Longest probe sequence any insert or find has walked so far.
    pub max_probe: usize,
}

pub struct LocalShard {
    slots: Vec<Slot>,
    occupied: usize,
    max_probe: usize,
}

impl LocalShard {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Slot::default(); capacity],
            occupied: 0,
            max_probe: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    // Slot accessors index directly and panic when `slot >= capacity()`;
    // `insert` and `find` only pass indices from `probe_sequence`.

    pub fn is_used(&self, slot: usize) -> bool {
        self.slots[slot].used
    }

    /// Marks `slot` as used. Returns `false` if someone got there first.
    pub fn try_reserve(&mut self, slot: usize) -> bool {
        let entry = &mut self.slots[slot];
        if entry.used {
            return false;
        }
        entry.used = true;
        self.occupied += 1;
        true
    }

    /// Stores `record` into a slot previously won with `try_reserve`.
    pub fn write(&mut self, slot: usize, record: Record) {
        debug_assert!(self.slots[slot].used, "write to unreserved slot {}", slot);
        self.slots[slot].record = Some(record);
    }

    pub fn read(&self, slot: usize) -> Option<Record> {
        self.slots[slot].record
    }

    /// Linear-probing insert starting from `hash mod capacity`.
    pub fn insert(&mut self, hash: u64, record: Record) -> InsertOutcome {
        let mut probes = 0;
        let mut outcome = InsertOutcome::Full;

        for slot in probe_sequence(self.capacity(), hash) {
            probes += 1;
            if self.try_reserve(slot) {
                self.write(slot, record);
                outcome = InsertOutcome::Inserted;
                break;
            }
            if self.read(slot).is_some_and(|stored| stored.key == record.key) {
                outcome = InsertOutcome::Duplicate;
                break;
            }
        }

        self.max_probe = self.max_probe.max(probes);
        outcome
    }

    /// Walks the same probe sequence as `insert`. Keys are never removed, so
    /// an unused slot ends the search early.
    pub fn find(&mut self, hash: u64, key: &Key) -> Option<Record> {
        let mut probes = 0;
        let mut found = None;

        for slot in probe_sequence(self.capacity(), hash) {
            probes += 1;
            if !self.is_used(slot) {
                break;
            }
            if let Some(stored) = self.read(slot)
                && stored.key == *key
            {
                found = Some(stored);
                break;
            }
        }

        self.max_probe = self.max_probe.max(probes);
        found
    }

    pub fn stats(&self) -> ShardStats {
        ShardStats {
            capacity: self.capacity(),
            occupied: self.occupied,
            max_probe: self.max_probe,
        }
    }
}

/// `(hash + i) mod capacity` for `i` in `0..capacity`.
fn probe_sequence(capacity: usize, hash: u64) -> impl Iterator<Item = usize> {
    let home = if capacity == 0 {
        0
    } else {
        (hash % capacity as u64) as usize
    };
    (0..capacity).map(move |i| (home + i) % capacity)
}
