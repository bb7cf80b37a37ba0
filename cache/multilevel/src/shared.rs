//! Thread-safe multilevel cache.
//!
//! [`SharedMultilevelCache`] guards every tier with its own mutex. A lock is
//! held across each tier's whole read-modify-write, so evict-then-insert is
//! atomic with respect to other writers and capacity is never exceeded.
//!
//! A read that hits below tier 0 takes two critical sections: one on the tier
//! that hit, released before the promotion write, and one on each destination
//! tier. Between the two another thread may evict or write the key in the
//! destination. A promotion that finds the key already resident is skipped so
//! a newer value written by `put` is never replaced by an older lower-tier
//! copy. A key evicted from tier 0 in that window is simply found in the lower
//! tier again on the next read.

use crate::cache::{MultilevelCache, TierSnapshot};
use crate::config::{CacheConfig, PromotionMode};
use crate::error::ConfigResult;
use crate::metrics::{AtomicCounters, CounterSnapshot};
use crate::sync::Mutex;
use crate::tier::CacheTier;
use std::hash::Hash;
use tracing::{debug, trace, warn};

/// A multilevel cache that can be shared between threads.
///
/// The tier list is fixed at construction. Build one from a
/// [`MultilevelCache`] with [`into_shared`](MultilevelCache::into_shared) or
/// directly from a [`CacheConfig`].
pub struct SharedMultilevelCache<K, V> {
    tiers: Vec<Mutex<CacheTier<K, V>>>,
    promotion: PromotionMode,
    counters: AtomicCounters,
}

impl<K, V> SharedMultilevelCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub(crate) fn from_parts(
        tiers: Vec<CacheTier<K, V>>,
        promotion: PromotionMode,
        counters: AtomicCounters,
    ) -> Self {
        Self {
            tiers: tiers.into_iter().map(Mutex::new).collect(),
            promotion,
            counters,
        }
    }

    /// Build a shared cache from a validated configuration.
    ///
    /// # Errors
    ///
    /// Same as [`MultilevelCache::from_config`].
    pub fn from_config(config: &CacheConfig) -> ConfigResult<Self> {
        MultilevelCache::from_config(config).map(MultilevelCache::into_shared)
    }

    /// Number of tiers.
    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// The configured promotion mode.
    pub fn promotion(&self) -> PromotionMode {
        self.promotion
    }

    /// Run `f` with exclusive access to one tier.
    ///
    /// Returns `None` if `index` is out of range.
    pub fn with_tier<R>(&self, index: usize, f: impl FnOnce(&mut CacheTier<K, V>) -> R) -> Option<R> {
        let tier = self.tiers.get(index)?;
        let mut guard = tier.lock();
        Some(f(&mut guard))
    }

    /// Total entries across all tiers.
    ///
    /// Tiers are locked one at a time, so under concurrent writes the sum is
    /// approximate.
    pub fn len(&self) -> usize {
        self.tiers.iter().map(|tier| tier.lock().len()).sum()
    }

    /// Returns `true` if no tier holds an entry.
    pub fn is_empty(&self) -> bool {
        self.tiers.iter().all(|tier| tier.lock().is_empty())
    }

    /// Look up a key, probing tiers from fastest to slowest.
    pub fn get(&self, key: &K) -> Option<V> {
        for (found, tier) in self.tiers.iter().enumerate() {
            let hit = tier.lock().get(key).cloned();
            if let Some(value) = hit {
                self.counters.record_get(true);
                if found > 0 {
                    self.promote(key, &value, found);
                }
                return Some(value);
            }
        }

        trace!(tiers = self.tiers.len(), "cache miss");
        self.counters.record_get(false);
        None
    }

    /// Store a value in tier 0.
    pub fn put(&self, key: K, value: V) {
        let Some(first) = self.tiers.first() else {
            warn!("put on a cache with no tiers, value dropped");
            return;
        };

        self.counters.record_put();
        if first.lock().put(key, value).is_some() {
            self.counters.record_eviction();
        }
    }

    /// Remove a key from every tier. Returns `true` if any tier held it.
    pub fn remove(&self, key: &K) -> bool {
        self.tiers
            .iter()
            .fold(false, |removed, tier| tier.lock().remove(key).is_some() || removed)
    }

    /// Empty every tier.
    pub fn clear(&self) {
        for tier in &self.tiers {
            tier.lock().clear();
        }
    }

    /// Copy out every tier's contents, locking one tier at a time.
    pub fn snapshot_all(&self) -> Vec<TierSnapshot<K, V>> {
        self.tiers
            .iter()
            .enumerate()
            .map(|(index, tier)| {
                let tier = tier.lock();
                TierSnapshot {
                    index,
                    policy: tier.policy_kind(),
                    capacity: tier.capacity(),
                    entries: tier.snapshot(),
                }
            })
            .collect()
    }

    /// Snapshot of operation counters.
    pub fn stats(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    fn promote(&self, key: &K, value: &V, found: usize) {
        for index in self.promotion.targets(found) {
            let mut tier = self.tiers[index].lock();
            if tier.contains(key) {
                trace!(to = index, "promotion skipped, key already resident");
                continue;
            }
            if tier.promote(key.clone(), value.clone()).is_some() {
                self.counters.record_eviction();
            }
            self.counters.record_promotion();
            debug!(from = found, to = index, "promoted entry");
        }
    }
}


#[cfg(all(test, feature = "loom"))]
mod loom_tests {
    use super::*;
    use crate::policy::PolicyKind;
    use loom::sync::Arc;
    use loom::thread;

    /// Two writers racing into a full single-slot tier leave exactly one entry.
    #[test]
    fn test_concurrent_puts_respect_capacity() {
        loom::model(|| {
            let mut cache = MultilevelCache::new();
            cache.add_tier(1, PolicyKind::Recency).unwrap();
            let cache = Arc::new(cache.into_shared());

            let c1 = cache.clone();
            let c2 = cache.clone();

            let t1 = thread::spawn(move || c1.put(1u32, 10u32));
            let t2 = thread::spawn(move || c2.put(2, 20));

            t1.join().unwrap();
            t2.join().unwrap();

            let entries = cache.snapshot_all().remove(0).entries;
            assert_eq!(entries.len(), 1);
            assert!(entries == vec![(1, 10)] || entries == vec![(2, 20)]);
        });
    }

    /// A promotion racing a put of the same key never leaves the stale value
    /// in tier 0.
    #[test]
    fn test_promotion_races_with_put() {
        loom::model(|| {
            let mut cache = MultilevelCache::new();
            cache.add_tier(1, PolicyKind::Recency).unwrap();
            cache.add_tier(1, PolicyKind::Recency).unwrap();
            let cache = cache.into_shared();
            cache.with_tier(1, |tier| tier.put(1u32, 10u32));
            let cache = Arc::new(cache);

            let reader = cache.clone();
            let writer = cache.clone();

            let t1 = thread::spawn(move || reader.get(&1));
            let t2 = thread::spawn(move || writer.put(1, 20));

            let seen = t1.join().unwrap();
            t2.join().unwrap();

            assert!(seen == Some(10) || seen == Some(20));
            assert_eq!(cache.with_tier(0, |tier| tier.peek(&1).copied()), Some(Some(20)));
        });
    }
}
