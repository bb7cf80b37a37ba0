//! Bounded slot storage with a free list.
//!
//! Entries live in a vector of slots addressed by [`SlotIndex`]. Freed slots
//! are threaded onto an intrusive free list and reused before the vector is
//! allowed to grow, and the vector never grows past the configured capacity.
//! A store into full storage hands the entry back instead of exceeding the
//! bound, so a tier has to evict before it inserts.

/// Index of a slot within a tier's storage.
pub type SlotIndex = u32;

/// Largest capacity a tier may be configured with.
pub const MAX_CAPACITY: usize = SlotIndex::MAX as usize;

/// Sentinel value indicating an empty free list.
const EMPTY_FREE_LIST: SlotIndex = SlotIndex::MAX;

/// A stored key-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

#[derive(Debug)]
enum Slot<K, V> {
    Occupied(Entry<K, V>),
    Free { next: SlotIndex },
}

/// Storage for one tier's entries.
#[derive(Debug)]
pub struct SlotStorage<K, V> {
    slots: Vec<Slot<K, V>>,
    /// Head of the free list, or `EMPTY_FREE_LIST`.
    free_head: SlotIndex,
    occupied: usize,
    capacity: usize,
}

impl<K, V> SlotStorage<K, V> {
    /// Create storage holding at most `capacity` entries.
    ///
    /// Slots are allocated lazily as entries arrive.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0 && capacity <= MAX_CAPACITY);
        Self {
            slots: Vec::new(),
            free_head: EMPTY_FREE_LIST,
            occupied: 0,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.occupied >= self.capacity
    }

    /// Store an entry, returning its slot.
    ///
    /// Returns the entry back if every slot is occupied.
    pub fn store(&mut self, entry: Entry<K, V>) -> Result<SlotIndex, Entry<K, V>> {
        if self.is_full() {
            return Err(entry);
        }

        let index = if self.free_head != EMPTY_FREE_LIST {
            let index = self.free_head;
            let slot = &mut self.slots[index as usize];
            if let Slot::Free { next } = *slot {
                self.free_head = next;
            }
            *slot = Slot::Occupied(entry);
            index
        } else {
            let index = self.slots.len() as SlotIndex;
            self.slots.push(Slot::Occupied(entry));
            index
        };

        self.occupied += 1;
        Ok(index)
    }

    pub fn get(&self, index: SlotIndex) -> Option<&Entry<K, V>> {
        match self.slots.get(index as usize)? {
            Slot::Occupied(entry) => Some(entry),
            Slot::Free { .. } => None,
        }
    }

    pub fn get_mut(&mut self, index: SlotIndex) -> Option<&mut Entry<K, V>> {
        match self.slots.get_mut(index as usize)? {
            Slot::Occupied(entry) => Some(entry),
            Slot::Free { .. } => None,
        }
    }

    /// Remove the entry in a slot and return the slot to the free list.
    pub fn take(&mut self, index: SlotIndex) -> Option<Entry<K, V>> {
        let slot = self.slots.get_mut(index as usize)?;
        if matches!(slot, Slot::Free { .. }) {
            return None;
        }

        let previous = std::mem::replace(
            slot,
            Slot::Free {
                next: self.free_head,
            },
        );
        self.free_head = index;
        self.occupied -= 1;

        match previous {
            Slot::Occupied(entry) => Some(entry),
            Slot::Free { .. } => None,
        }
    }

    /// Drop every entry and release the slot vector.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = EMPTY_FREE_LIST;
        self.occupied = 0;
    }
}
