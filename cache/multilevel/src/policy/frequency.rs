//! Frequency (LFU) bookkeeping.
//!
//! Each tracked slot carries an access count and the sequence number it was
//! admitted with. An ordered set keyed by `(count, sequence)` yields the
//! victim as its first element: lowest count wins, and among equal counts the
//! oldest admission is evicted first.

use crate::storage::SlotIndex;
use std::collections::BTreeSet;

/// Count assigned on admission.
pub const INITIAL_COUNT: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Meta {
    count: u64,
    sequence: u64,
}

/// Least-frequently-used ordering over slot indices.
#[derive(Debug, Default)]
pub struct FrequencyIndex {
    meta: Vec<Option<Meta>>,
    /// `(count, sequence, slot)`, sequence is unique per admission.
    ordered: BTreeSet<(u64, u64, SlotIndex)>,
    next_sequence: u64,
}

impl FrequencyIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked slots.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Current access count of a slot.
    pub fn count(&self, slot: SlotIndex) -> Option<u64> {
        self.get(slot).map(|meta| meta.count)
    }

    fn get(&self, slot: SlotIndex) -> Option<Meta> {
        self.meta.get(slot as usize).copied().flatten()
    }

    /// Record a newly stored slot with a count of one.
    ///
    /// Admitting a slot that is already tracked behaves like [`touch`](Self::touch)
    /// so an overwrite never resets history.
    pub fn admit(&mut self, slot: SlotIndex) {
        if self.get(slot).is_some() {
            self.touch(slot);
            return;
        }

        let idx = slot as usize;
        if idx >= self.meta.len() {
            self.meta.resize(idx + 1, None);
        }

        let meta = Meta {
            count: INITIAL_COUNT,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.meta[idx] = Some(meta);
        self.ordered.insert((meta.count, meta.sequence, slot));
    }

    /// Increment a slot's access count. Unknown slots are ignored.
    pub fn touch(&mut self, slot: SlotIndex) {
        let Some(meta) = self.get(slot) else {
            return;
        };

        self.ordered.remove(&(meta.count, meta.sequence, slot));
        let bumped = Meta {
            count: meta.count.saturating_add(1),
            sequence: meta.sequence,
        };
        self.meta[slot as usize] = Some(bumped);
        self.ordered.insert((bumped.count, bumped.sequence, slot));
    }

    /// The slot with the lowest count, oldest admission first on ties.
    pub fn victim(&self) -> Option<SlotIndex> {
        self.ordered.first().map(|&(_, _, slot)| slot)
    }

    /// Stop tracking a slot. Unknown slots are ignored.
    pub fn remove(&mut self, slot: SlotIndex) {
        if let Some(meta) = self.meta.get_mut(slot as usize).and_then(Option::take) {
            self.ordered.remove(&(meta.count, meta.sequence, slot));
        }
    }

    /// Slots in eviction order.
    pub fn order(&self) -> Vec<SlotIndex> {
        self.ordered.iter().map(|&(_, _, slot)| slot).collect()
    }

    /// Forget every slot. Sequence numbers keep increasing.
    pub fn clear(&mut self) {
        self.meta.clear();
        self.ordered.clear();
    }
}
