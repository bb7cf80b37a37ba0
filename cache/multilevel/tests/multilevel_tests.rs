//! Behavioural tests for the multilevel cache.
//!
//! These exercise the public API only: tier capacity bounds, policy victim
//! selection, cross-tier lookup and promotion.

use multilevel_cache::{
    CacheConfig, CacheTier, ConfigError, MultilevelCache, PolicyKind, PromotionMode,
    SharedMultilevelCache,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn tier_keys<K: Clone, V: Clone>(cache: &MultilevelCache<K, V>, index: usize) -> Vec<K>
where
    K: std::hash::Hash + Eq,
{
    cache.snapshot_all()[index]
        .entries
        .iter()
        .map(|(k, _)| k.clone())
        .collect()
}

// =============================================================================
// Capacity
// =============================================================================

#[test]
fn test_capacity_invariant_random_ops() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for kind in [PolicyKind::Recency, PolicyKind::Frequency] {
        for capacity in [1usize, 2, 5, 17] {
            let mut tier = CacheTier::new(capacity, kind).unwrap();

            for _ in 0..2_000 {
                let key: u16 = rng.random_range(0..64);
                match rng.random_range(0..5) {
                    0 | 1 => {
                        tier.put(key, u32::from(key));
                    }
                    2 => {
                        tier.promote(key, u32::from(key) + 1);
                    }
                    3 => {
                        tier.get(&key);
                    }
                    _ => {
                        tier.evict();
                    }
                }
                assert!(
                    tier.len() <= capacity,
                    "{kind} tier of capacity {capacity} holds {}",
                    tier.len()
                );
                assert_eq!(tier.snapshot().len(), tier.len());
            }
        }
    }
}

#[test]
fn test_capacity_invariant_across_tiers() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut cache = MultilevelCache::new().with_promotion(PromotionMode::AllAbove);
    cache.add_tier(2, PolicyKind::Recency).unwrap();
    cache.add_tier(4, PolicyKind::Frequency).unwrap();
    cache.add_tier(8, PolicyKind::Recency).unwrap();
    for key in 0..8u32 {
        cache.tier_mut(2).unwrap().put(key, key);
    }

    for _ in 0..5_000 {
        let key: u32 = rng.random_range(0..16);
        if rng.random_bool(0.3) {
            cache.put(key, key * 10);
        } else {
            cache.get(&key);
        }

        for snapshot in cache.snapshot_all() {
            assert!(snapshot.entries.len() <= snapshot.capacity);
        }
    }
}

// =============================================================================
// Policies
// =============================================================================

#[test]
fn test_lru_refreshed_key_survives() {
    let mut tier = CacheTier::new(3, PolicyKind::Recency).unwrap();
    tier.put("A", 1);
    tier.put("B", 2);
    tier.put("C", 3);
    tier.get(&"A");

    assert_eq!(tier.put("D", 4), Some(("B", 2)));
    assert!(tier.contains(&"A"));
    assert!(tier.contains(&"C"));
    assert!(tier.contains(&"D"));
}

#[test]
fn test_lfu_tie_break_is_repeatable() {
    for _ in 0..10 {
        let mut tier = CacheTier::new(2, PolicyKind::Frequency).unwrap();
        tier.put("A", 1);
        tier.put("B", 2);
        assert_eq!(tier.put("C", 3), Some(("A", 1)));
        assert_eq!(
            tier.snapshot(),
            vec![("B", 2), ("C", 3)],
            "eviction order must not depend on hashing"
        );
    }
}

#[test]
fn test_lfu_ties_by_admission_not_last_access() {
    let mut tier = CacheTier::new(3, PolicyKind::Frequency).unwrap();
    tier.put("A", 1);
    tier.put("B", 2);
    tier.put("C", 3);
    // B reaches count 2 before A does
    tier.get(&"B");
    tier.get(&"A");
    // A and B tie at 2, C is alone at 1
    assert_eq!(tier.put("D", 4), Some(("C", 3)));
    // D at 1 goes next, then A (admitted before B)
    assert_eq!(tier.evict(), Some(("D", 4)));
    assert_eq!(tier.evict(), Some(("A", 1)));
    assert_eq!(tier.evict(), Some(("B", 2)));
    assert_eq!(tier.evict(), None);
}

// =============================================================================
// Cross-tier protocol
// =============================================================================

#[test]
fn test_put_never_reaches_lower_tier() {
    let mut cache = MultilevelCache::new();
    cache.add_tier(1, PolicyKind::Recency).unwrap();
    cache.add_tier(2, PolicyKind::Recency).unwrap();

    cache.put("A", 1);
    cache.put("B", 2);

    // A was evicted from tier 0 and was never written below, so it is gone
    assert_eq!(cache.get(&"A"), None);
    assert_eq!(cache.get(&"B"), Some(2));
    assert!(cache.tier(1).unwrap().is_empty());
}

#[test]
fn test_miss_on_empty_cache_mutates_nothing() {
    let mut cache: MultilevelCache<&str, i32> = MultilevelCache::new();
    cache.add_tier(2, PolicyKind::Recency).unwrap();
    cache.add_tier(2, PolicyKind::Frequency).unwrap();
    let before = cache.snapshot_all();

    assert_eq!(cache.get(&"X"), None);
    assert_eq!(cache.snapshot_all(), before);
    assert!(cache.is_empty());
}

#[test]
fn test_repeated_get_from_tier_zero() {
    let mut cache = MultilevelCache::new();
    cache.add_tier(2, PolicyKind::Frequency).unwrap();
    cache.add_tier(2, PolicyKind::Recency).unwrap();
    cache.put("K", 5);

    assert_eq!(cache.get(&"K"), Some(5));
    assert_eq!(cache.get(&"K"), Some(5));
    assert_eq!(tier_keys(&cache, 0), vec!["K"]);
    assert!(tier_keys(&cache, 1).is_empty());
    assert_eq!(cache.stats().promotions, 0);
}

#[test]
fn test_evicted_from_tier_zero_is_refound_below() {
    let mut cache = MultilevelCache::new();
    cache.add_tier(1, PolicyKind::Recency).unwrap();
    cache.add_tier(4, PolicyKind::Frequency).unwrap();
    cache.tier_mut(1).unwrap().put("deep", 1);

    assert_eq!(cache.get(&"deep"), Some(1));
    cache.put("other", 2);
    assert!(!cache.tier(0).unwrap().contains(&"deep"));

    assert_eq!(cache.get(&"deep"), Some(1));
    assert!(cache.tier(0).unwrap().contains(&"deep"));
    assert_eq!(cache.stats().promotions, 2);
    assert_eq!(cache.tier(1).unwrap().access_count(&"deep"), Some(3));
}

#[test]
fn test_first_tier_promotion_skips_middle() {
    let mut cache = MultilevelCache::new();
    cache.add_tier(2, PolicyKind::Recency).unwrap();
    cache.add_tier(2, PolicyKind::Recency).unwrap();
    cache.add_tier(2, PolicyKind::Recency).unwrap();
    cache.tier_mut(2).unwrap().put(1u8, 1u8);

    assert_eq!(cache.get(&1), Some(1));
    assert!(cache.tier(0).unwrap().contains(&1));
    assert!(!cache.tier(1).unwrap().contains(&1));
}

#[test]
fn test_snapshot_all_shape() {
    let mut cache = MultilevelCache::new();
    cache.add_tier(3, PolicyKind::Recency).unwrap();
    cache.add_tier(2, PolicyKind::Frequency).unwrap();
    cache.put("A", 1);
    cache.put("B", 2);
    cache.get(&"A");

    let snapshots = cache.snapshot_all();
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].index, 0);
    assert_eq!(snapshots[1].index, 1);
    assert_eq!(snapshots[0].entries, vec![("B", 2), ("A", 1)]);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_build_from_toml() {
    let config = CacheConfig::from_toml(
        r#"
        promotion = "all-above"

        [[tier]]
        capacity = 1
        policy = "recency"

        [[tier]]
        capacity = 1
        policy = "recency"

        [[tier]]
        capacity = 4
        policy = "frequency"
        "#,
    )
    .unwrap();

    let mut cache = MultilevelCache::from_config(&config).unwrap();
    assert_eq!(cache.tier_count(), 3);
    assert_eq!(cache.promotion(), PromotionMode::AllAbove);

    cache.tier_mut(2).unwrap().put("Z", 26);
    assert_eq!(cache.get(&"Z"), Some(26));
    assert!(cache.tier(0).unwrap().contains(&"Z"));
    assert!(cache.tier(1).unwrap().contains(&"Z"));
}

#[test]
fn test_invalid_config_rejected() {
    let config = CacheConfig::new()
        .with_tier(4, PolicyKind::Recency)
        .with_tier(0, PolicyKind::Frequency);
    assert!(matches!(
        MultilevelCache::<u32, u32>::from_config(&config),
        Err(ConfigError::InvalidCapacity(0))
    ));
    assert!(matches!(
        SharedMultilevelCache::<u32, u32>::from_config(&CacheConfig::new()),
        Err(ConfigError::NoTiers)
    ));
}

#[test]
fn test_shared_matches_single_threaded() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut single = MultilevelCache::new();
    single.add_tier(3, PolicyKind::Recency).unwrap();
    single.add_tier(5, PolicyKind::Frequency).unwrap();
    for key in 0..5u32 {
        single.tier_mut(1).unwrap().put(key, key);
    }

    let mut reference = MultilevelCache::new();
    reference.add_tier(3, PolicyKind::Recency).unwrap();
    reference.add_tier(5, PolicyKind::Frequency).unwrap();
    for key in 0..5u32 {
        reference.tier_mut(1).unwrap().put(key, key);
    }
    let shared = reference.into_shared();

    for _ in 0..500 {
        let key: u32 = rng.random_range(0..10);
        if rng.random_bool(0.25) {
            single.put(key, key + 100);
            shared.put(key, key + 100);
        } else {
            assert_eq!(single.get(&key), shared.get(&key));
        }
    }

    assert_eq!(single.snapshot_all(), shared.snapshot_all());
    assert_eq!(single.stats(), shared.stats());
}
