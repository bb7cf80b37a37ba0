//! Recency (LRU) bookkeeping.
//!
//! Slots are threaded onto an intrusive doubly linked list stored in a flat
//! vector indexed by slot. The head is the least recently used slot and the
//! tail the most recently used one, so admit, touch, victim and remove are
//! all constant time.

use crate::storage::SlotIndex;

/// Sentinel for "no neighbour".
const NIL: SlotIndex = SlotIndex::MAX;

#[derive(Debug, Clone, Copy)]
struct Link {
    prev: SlotIndex,
    next: SlotIndex,
    linked: bool,
}

impl Link {
    const UNLINKED: Link = Link {
        prev: NIL,
        next: NIL,
        linked: false,
    };
}

/// Least-recently-used ordering over slot indices.
#[derive(Debug)]
pub struct RecencyList {
    links: Vec<Link>,
    /// Least recently used slot.
    head: SlotIndex,
    /// Most recently used slot.
    tail: SlotIndex,
    len: usize,
}

impl Default for RecencyList {
    fn default() -> Self {
        Self::new()
    }
}

impl RecencyList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            links: Vec::new(),
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    /// Number of tracked slots.
    pub fn len(&self) -> usize {
        self.len
    }

    fn is_linked(&self, slot: SlotIndex) -> bool {
        self.links
            .get(slot as usize)
            .is_some_and(|link| link.linked)
    }

    /// Record a newly stored slot as the most recently used.
    ///
    /// Admitting a slot that is already tracked behaves like [`touch`](Self::touch).
    pub fn admit(&mut self, slot: SlotIndex) {
        if self.is_linked(slot) {
            self.move_to_back(slot);
            return;
        }

        let idx = slot as usize;
        if idx >= self.links.len() {
            self.links.resize(idx + 1, Link::UNLINKED);
        }
        self.push_back(slot);
        self.len += 1;
    }

    /// Mark a slot as most recently used. Unknown slots are ignored.
    pub fn touch(&mut self, slot: SlotIndex) {
        if self.is_linked(slot) {
            self.move_to_back(slot);
        }
    }

    /// The least recently used slot, if any.
    pub fn victim(&self) -> Option<SlotIndex> {
        (self.head != NIL).then_some(self.head)
    }

    /// Stop tracking a slot. Unknown slots are ignored.
    pub fn remove(&mut self, slot: SlotIndex) {
        if !self.is_linked(slot) {
            return;
        }
        self.unlink(slot);
        self.links[slot as usize] = Link::UNLINKED;
        self.len -= 1;
    }

    /// Slots from least to most recently used.
    pub fn order(&self) -> Vec<SlotIndex> {
        let mut order = Vec::with_capacity(self.len);
        let mut cursor = self.head;
        while cursor != NIL {
            order.push(cursor);
            cursor = self.links[cursor as usize].next;
        }
        order
    }

    /// Forget every slot.
    pub fn clear(&mut self) {
        self.links.clear();
        self.head = NIL;
        self.tail = NIL;
        self.len = 0;
    }

    fn move_to_back(&mut self, slot: SlotIndex) {
        if self.tail == slot {
            return;
        }
        self.unlink(slot);
        self.push_back(slot);
    }

    fn push_back(&mut self, slot: SlotIndex) {
        let old_tail = self.tail;
        self.links[slot as usize] = Link {
            prev: old_tail,
            next: NIL,
            linked: true,
        };
        if old_tail == NIL {
            self.head = slot;
        } else {
            self.links[old_tail as usize].next = slot;
        }
        self.tail = slot;
    }

    fn unlink(&mut self, slot: SlotIndex) {
        let Link { prev, next, .. } = self.links[slot as usize];

        if prev == NIL {
            self.head = next;
        } else {
            self.links[prev as usize].next = next;
        }

        if next == NIL {
            self.tail = prev;
        } else {
            self.links[next as usize].prev = prev;
        }

        let link = &mut self.links[slot as usize];
        link.prev = NIL;
        link.next = NIL;
    }
}
