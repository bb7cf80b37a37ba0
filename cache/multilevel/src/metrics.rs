//! Cache operation counters.
//!
//! [`AtomicCounters`] can be updated through a shared reference, so the same
//! type serves the single-owner [`MultilevelCache`](crate::MultilevelCache)
//! and the lock-per-tier [`SharedMultilevelCache`](crate::SharedMultilevelCache).

use crate::sync::{AtomicU64, Ordering};

/// Atomic counters for tracking cache operations.
#[derive(Debug)]
pub struct AtomicCounters {
    /// GET operations.
    pub gets: AtomicU64,
    /// GET operations answered by any tier.
    pub hits: AtomicU64,
    /// GET operations no tier could answer.
    pub misses: AtomicU64,
    /// PUT operations.
    pub puts: AtomicU64,
    /// Copies made into a faster tier after a hit.
    pub promotions: AtomicU64,
    /// Entries removed to make room.
    pub evictions: AtomicU64,
}

impl Default for AtomicCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomicCounters {
    /// Create new atomic counters.
    pub fn new() -> Self {
        Self {
            gets: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            puts: AtomicU64::new(0),
            promotions: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Record a GET operation.
    #[inline]
    pub fn record_get(&self, hit: bool) {
        self.gets.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a PUT operation.
    #[inline]
    pub fn record_put(&self) {
        self.puts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a promotion into a faster tier.
    #[inline]
    pub fn record_promotion(&self) {
        self.promotions.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an eviction.
    #[inline]
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the current counter values.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            gets: self.gets.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            puts: self.puts.load(Ordering::Relaxed),
            promotions: self.promotions.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.gets.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.puts.store(0, Ordering::Relaxed);
        self.promotions.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }
}

/// Snapshot of counter values at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// GET operations.
    pub gets: u64,
    /// GET hits.
    pub hits: u64,
    /// GET misses.
    pub misses: u64,
    /// PUT operations.
    pub puts: u64,
    /// Promotions.
    pub promotions: u64,
    /// Evictions.
    pub evictions: u64,
}

impl CounterSnapshot {
    /// Get hit rate as a percentage (0.0 - 100.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Compute the difference between two snapshots (self - other).
    pub fn diff(&self, other: &CounterSnapshot) -> CounterSnapshot {
        CounterSnapshot {
            gets: self.gets.saturating_sub(other.gets),
            hits: self.hits.saturating_sub(other.hits),
            misses: self.misses.saturating_sub(other.misses),
            puts: self.puts.saturating_sub(other.puts),
            promotions: self.promotions.saturating_sub(other.promotions),
            evictions: self.evictions.saturating_sub(other.evictions),
        }
    }
}
