//! A single bounded cache tier.
//!
//! [`CacheTier`] combines a key index, bounded [`SlotStorage`] and one
//! eviction policy. Capacity is enforced by evicting before storing: the
//! storage refuses a store when full, so the bound holds at every point, not
//! only between operations.
//!
//! ```text
//! +----------------------------------------+
//! |               CacheTier                |
//! |  +-----------+       +--------------+  |
//! |  | key index | ----> | SlotStorage  |  |
//! |  | K -> slot |       | [slot]: K, V |  |
//! |  +-----------+       +--------------+  |
//! |        |                               |
//! |        v                               |
//! |  +----------------------------------+  |
//! |  | EvictionPolicy (recency | freq)  |  |
//! |  | slot -> metadata, victim()       |  |
//! |  +----------------------------------+  |
//! +----------------------------------------+
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::policy::{EvictionPolicy, PolicyKind};
use crate::storage::{Entry, MAX_CAPACITY, SlotIndex, SlotStorage};
use ahash::RandomState;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::{error, trace};

/// A bounded key-value store with its own eviction policy.
#[derive(Debug)]
pub struct CacheTier<K, V> {
    index: HashMap<K, SlotIndex, RandomState>,
    storage: SlotStorage<K, V>,
    policy: EvictionPolicy,
}

impl<K, V> CacheTier<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create an empty tier.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCapacity`] if `capacity` is zero or does
    /// not fit a slot index.
    pub fn new(capacity: usize, policy: PolicyKind) -> ConfigResult<Self> {
        if capacity == 0 || capacity > MAX_CAPACITY {
            return Err(ConfigError::InvalidCapacity(capacity));
        }

        Ok(Self {
            index: HashMap::with_hasher(RandomState::new()),
            storage: SlotStorage::new(capacity),
            policy: EvictionPolicy::new(policy),
        })
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Returns `true` if the tier holds no entries.
    pub fn is_empty(&self) -> bool {
        self.storage.len() == 0
    }

    /// The eviction policy this tier was built with.
    pub fn policy_kind(&self) -> PolicyKind {
        self.policy.kind()
    }

    /// Look up a key and record the access with the policy.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let slot = *self.index.get(key)?;
        self.policy.touch(slot);
        self.storage.get(slot).map(|entry| &entry.value)
    }

    /// Look up a key without recording an access.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let slot = *self.index.get(key)?;
        self.storage.get(slot).map(|entry| &entry.value)
    }

    /// Returns `true` if the key is resident. Does not record an access.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Access count of a resident key. Only frequency tiers keep one.
    pub fn access_count(&self, key: &K) -> Option<u64> {
        let slot = *self.index.get(key)?;
        self.policy.count(slot)
    }

    /// Store a value.
    ///
    /// Overwriting a resident key replaces its value and counts as an access.
    /// Inserting a new key into a full tier first evicts the policy's victim,
    /// which is returned.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        self.insert(key, value)
    }

    /// Store a value copied up from a slower tier.
    ///
    /// Same observable effect as [`put`](Self::put).
    pub fn promote(&mut self, key: K, value: V) -> Option<(K, V)> {
        trace!(policy = %self.policy.kind(), "promotion write");
        self.insert(key, value)
    }

    /// Remove the policy's victim. Returns `None` on an empty tier.
    pub fn evict(&mut self) -> Option<(K, V)> {
        let slot = self.policy.victim()?;
        self.policy.remove(slot);
        let entry = self.storage.take(slot)?;
        self.index.remove(&entry.key);
        trace!(policy = %self.policy.kind(), len = self.storage.len(), "evicted entry");
        Some((entry.key, entry.value))
    }

    /// Remove a key, returning its value if it was resident.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.index.remove(key)?;
        self.policy.remove(slot);
        self.storage.take(slot).map(|entry| entry.value)
    }

    /// Remove every entry and all policy state.
    pub fn clear(&mut self) {
        self.index.clear();
        self.storage.clear();
        self.policy.clear();
    }

    fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&slot) = self.index.get(&key) {
            if let Some(entry) = self.storage.get_mut(slot) {
                entry.value = value;
            }
            self.policy.touch(slot);
            return None;
        }

        let evicted = if self.storage.is_full() {
            self.evict()
        } else {
            None
        };

        let entry = Entry {
            key: key.clone(),
            value,
        };
        match self.storage.store(entry) {
            Ok(slot) => {
                self.index.insert(key, slot);
                self.policy.admit(slot);
            }
            Err(_) => {
                // storage full with nothing for the policy to evict
                error!(
                    len = self.storage.len(),
                    tracked = self.policy.len(),
                    "tier storage and policy out of sync, dropping write"
                );
            }
        }

        evicted
    }
}

impl<K, V> CacheTier<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Copy out all entries in eviction order, next victim first.
    ///
    /// Recency tiers list least recently used first. Frequency tiers list by
    /// ascending access count, oldest admission first among equal counts.
    /// Taking a snapshot does not record any access.
    pub fn snapshot(&self) -> Vec<(K, V)> {
        self.policy
            .order()
            .into_iter()
            .filter_map(|slot| self.storage.get(slot))
            .map(|entry| (entry.key.clone(), entry.value.clone()))
            .collect()
    }
}
