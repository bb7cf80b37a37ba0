//! Multilevel lookup cache.
//!
//! This crate provides an ordered chain of bounded cache tiers, each with its
//! own capacity and eviction policy:
//!
//! - **Policies**: `PolicyKind::Recency` (LRU) and `PolicyKind::Frequency` (LFU)
//! - **Tiers**: `CacheTier`, a bounded key-value store bound to one policy
//! - **Cache**: `MultilevelCache`, probing tiers in order with promotion on hit
//! - **Shared**: `SharedMultilevelCache`, the same protocol with a lock per tier
//! - **Configuration**: `CacheConfig` loaded from TOML
//!
//! # Architecture
//!
//! ```text
//!            put                       get
//!             |                         |
//!             v                         v
//!     +---------------+  miss   +---------------+
//!     |    Tier 0     | ------> |    Tier 0     |
//!     | (small, fast) |         +-------+-------+
//!     +---------------+                 | miss
//!             ^                         v
//!             |                 +---------------+
//!             |   promote       |    Tier 1     |
//!             +---------------- |  (larger)     |
//!                       hit     +-------+-------+
//!                                       | miss
//!                                       v
//!                                      ...
//! ```
//!
//! Writes only ever land in tier 0. Lower tiers never receive demoted entries,
//! a hit in tier `i > 0` is copied upward and the lower copy stays in place.
//!
//! # Example
//!
//! ```
//! use multilevel_cache::{MultilevelCache, PolicyKind};
//!
//! let mut cache = MultilevelCache::new();
//! cache.add_tier(3, PolicyKind::Recency).unwrap();
//! cache.add_tier(2, PolicyKind::Frequency).unwrap();
//!
//! cache.put("A", 1);
//! assert_eq!(cache.get(&"A"), Some(1));
//! assert_eq!(cache.get(&"missing"), None);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod cache;
mod config;
mod error;
mod metrics;
mod policy;
mod shared;
mod storage;
mod sync;
mod tier;

pub use cache::{MultilevelCache, TierSnapshot};
pub use config::{CacheConfig, PromotionMode, TierConfig};
pub use error::{ConfigError, ConfigResult};
pub use metrics::{AtomicCounters, CounterSnapshot};
pub use policy::PolicyKind;
pub use shared::SharedMultilevelCache;
pub use storage::MAX_CAPACITY;
pub use tier::CacheTier;
