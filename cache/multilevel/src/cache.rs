//! MultilevelCache - orchestrating lookups across an ordered tier list.
//!
//! [`MultilevelCache`] owns a sequence of [`CacheTier`]s, index 0 being the
//! fastest and first probed:
//! - Writes go to tier 0 only
//! - Reads probe tiers in order and stop at the first hit
//! - A hit below tier 0 is copied upward according to [`PromotionMode`]
//!
//! Nothing is demoted on eviction. Tiers below 0 receive data only through
//! promotion (every tier above the hit under [`PromotionMode::AllAbove`]) or
//! when a caller seeds them through [`tier_mut`](MultilevelCache::tier_mut).
//! Inclusion is not enforced: a key evicted from tier 0 may still live below
//! and will be found and promoted again on the next read.

use crate::config::{CacheConfig, PromotionMode};
use crate::error::ConfigResult;
use crate::metrics::{AtomicCounters, CounterSnapshot};
use crate::policy::PolicyKind;
use crate::shared::SharedMultilevelCache;
use crate::tier::CacheTier;
use std::hash::Hash;
use tracing::{debug, trace, warn};

/// Diagnostic copy of one tier's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierSnapshot<K, V> {
    /// Position in the hierarchy, 0 is the fastest tier.
    pub index: usize,
    /// The tier's eviction policy.
    pub policy: PolicyKind,
    /// The tier's capacity.
    pub capacity: usize,
    /// Entries in the tier's eviction order, next victim first.
    pub entries: Vec<(K, V)>,
}

/// An ordered chain of cache tiers with promotion on hit.
#[derive(Debug)]
pub struct MultilevelCache<K, V> {
    tiers: Vec<CacheTier<K, V>>,
    promotion: PromotionMode,
    counters: AtomicCounters,
}

impl<K, V> Default for MultilevelCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MultilevelCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a cache with no tiers and tier-0-only promotion.
    pub fn new() -> Self {
        Self {
            tiers: Vec::new(),
            promotion: PromotionMode::default(),
            counters: AtomicCounters::new(),
        }
    }

    /// Set how hits below tier 0 are copied upward.
    pub fn with_promotion(mut self, promotion: PromotionMode) -> Self {
        self.promotion = promotion;
        self
    }

    /// Build a cache from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration declares no tiers or a tier has
    /// an invalid capacity.
    pub fn from_config(config: &CacheConfig) -> ConfigResult<Self> {
        config.validate()?;
        let mut cache = Self::new().with_promotion(config.promotion);
        for tier in &config.tiers {
            cache.add_tier(tier.capacity, tier.policy)?;
        }
        Ok(cache)
    }

    /// Append a tier below all existing tiers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCapacity`](crate::ConfigError::InvalidCapacity)
    /// if `capacity` is zero. Existing tiers are left untouched on error.
    pub fn add_tier(&mut self, capacity: usize, policy: PolicyKind) -> ConfigResult<()> {
        let tier = CacheTier::new(capacity, policy)?;
        self.tiers.push(tier);
        debug!(
            index = self.tiers.len() - 1,
            capacity,
            policy = %policy,
            "added cache tier"
        );
        Ok(())
    }

    /// Append a tier, parsing the policy from its name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownPolicy`](crate::ConfigError::UnknownPolicy)
    /// for an unrecognized name, or an invalid capacity error as for
    /// [`add_tier`](Self::add_tier).
    pub fn add_tier_named(&mut self, capacity: usize, policy: &str) -> ConfigResult<()> {
        self.add_tier(capacity, policy.parse()?)
    }

    /// Number of tiers.
    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// Borrow a tier by index.
    pub fn tier(&self, index: usize) -> Option<&CacheTier<K, V>> {
        self.tiers.get(index)
    }

    /// Mutably borrow a tier by index, for callers that seed lower tiers.
    pub fn tier_mut(&mut self, index: usize) -> Option<&mut CacheTier<K, V>> {
        self.tiers.get_mut(index)
    }

    /// The configured promotion mode.
    pub fn promotion(&self) -> PromotionMode {
        self.promotion
    }

    /// Total entries across all tiers. A key held by two tiers counts twice.
    pub fn len(&self) -> usize {
        self.tiers.iter().map(CacheTier::len).sum()
    }

    /// Returns `true` if no tier holds an entry.
    pub fn is_empty(&self) -> bool {
        self.tiers.iter().all(CacheTier::is_empty)
    }

    /// Look up a key, probing tiers from fastest to slowest.
    ///
    /// A hit at tier `i > 0` is promoted before returning. A miss leaves every
    /// tier unchanged and is left to the caller to handle.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let hit = self
            .tiers
            .iter_mut()
            .enumerate()
            .find_map(|(index, tier)| tier.get(key).map(|value| (index, value.clone())));

        let Some((found, value)) = hit else {
            trace!(tiers = self.tiers.len(), "cache miss");
            self.counters.record_get(false);
            return None;
        };

        self.counters.record_get(true);
        if found > 0 {
            self.promote(key, &value, found);
        }
        Some(value)
    }

    /// Store a value in tier 0. Lower tiers are never written by `put`.
    pub fn put(&mut self, key: K, value: V) {
        let Some(first) = self.tiers.first_mut() else {
            warn!("put on a cache with no tiers, value dropped");
            return;
        };

        self.counters.record_put();
        if first.put(key, value).is_some() {
            self.counters.record_eviction();
        }
    }

    /// Remove a key from every tier. Returns `true` if any tier held it.
    pub fn remove(&mut self, key: &K) -> bool {
        self.tiers
            .iter_mut()
            .fold(false, |removed, tier| tier.remove(key).is_some() || removed)
    }

    /// Empty every tier. The tiers themselves are kept.
    pub fn clear(&mut self) {
        for tier in &mut self.tiers {
            tier.clear();
        }
    }

    /// Copy out every tier's contents for diagnostics.
    pub fn snapshot_all(&self) -> Vec<TierSnapshot<K, V>> {
        self.tiers
            .iter()
            .enumerate()
            .map(|(index, tier)| TierSnapshot {
                index,
                policy: tier.policy_kind(),
                capacity: tier.capacity(),
                entries: tier.snapshot(),
            })
            .collect()
    }

    /// Snapshot of operation counters.
    pub fn stats(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    /// Convert into a cache safe to share between threads.
    pub fn into_shared(self) -> SharedMultilevelCache<K, V> {
        SharedMultilevelCache::from_parts(self.tiers, self.promotion, self.counters)
    }

    /// Copy a hit from tier `found` upward. Every tier above `found` missed
    /// during the probe, so none of the targets holds the key yet.
    fn promote(&mut self, key: &K, value: &V, found: usize) {
        let targets = self.promotion.targets(found);
        for (index, tier) in self.tiers[targets].iter_mut().enumerate() {
            if tier.promote(key.clone(), value.clone()).is_some() {
                self.counters.record_eviction();
            }
            self.counters.record_promotion();
            debug!(from = found, to = index, "promoted entry");
        }
    }
}
