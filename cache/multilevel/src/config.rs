//! Cache configuration.
//!
//! A hierarchy can be described in TOML and loaded at startup:
//!
//! ```toml
//! promotion = "first-tier"
//!
//! [[tier]]
//! capacity = 3
//! policy = "lru"
//!
//! [[tier]]
//! capacity = 2
//! policy = "lfu"
//! ```
//!
//! Tiers are listed fastest first.

use crate::error::{ConfigError, ConfigResult};
use crate::policy::PolicyKind;
use crate::storage::MAX_CAPACITY;
use serde::Deserialize;
use std::ops::Range;
use std::path::Path;

/// Which tiers receive a copy when a read hits below tier 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromotionMode {
    /// Copy into tier 0 only.
    #[default]
    FirstTier,
    /// Copy into every tier above the one that hit.
    AllAbove,
}

impl PromotionMode {
    /// Tier indices that receive a copy of a hit found at `found`.
    pub fn targets(&self, found: usize) -> Range<usize> {
        if found == 0 {
            return 0..0;
        }
        match self {
            PromotionMode::FirstTier => 0..1,
            PromotionMode::AllAbove => 0..found,
        }
    }
}

impl<'de> Deserialize<'de> for PromotionMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "first-tier" | "first" | "l1" => Ok(PromotionMode::FirstTier),
            "all-above" | "all" | "inclusive" => Ok(PromotionMode::AllAbove),
            _ => Err(serde::de::Error::custom(format!(
                "invalid promotion value: '{}' (expected 'first-tier' or 'all-above')",
                s
            ))),
        }
    }
}

/// One tier of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierConfig {
    /// Maximum number of entries.
    pub capacity: usize,
    /// Eviction policy: "recency"/"lru" or "frequency"/"lfu".
    pub policy: PolicyKind,
}

impl TierConfig {
    /// Create a tier description.
    pub fn new(capacity: usize, policy: PolicyKind) -> Self {
        Self { capacity, policy }
    }
}

/// Cache configuration loaded from a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Promotion rule for hits below tier 0.
    #[serde(default)]
    pub promotion: PromotionMode,

    /// Tiers, fastest first.
    #[serde(default, rename = "tier")]
    pub tiers: Vec<TierConfig>,
}

impl CacheConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tier.
    pub fn with_tier(mut self, capacity: usize, policy: PolicyKind) -> Self {
        self.tiers.push(TierConfig::new(capacity, policy));
        self
    }

    /// Set the promotion mode.
    pub fn with_promotion(mut self, promotion: PromotionMode) -> Self {
        self.promotion = promotion;
        self
    }

    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        let config: CacheConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.tiers.is_empty() {
            return Err(ConfigError::NoTiers);
        }

        if let Some(tier) = self
            .tiers
            .iter()
            .find(|tier| tier.capacity == 0 || tier.capacity > MAX_CAPACITY)
        {
            return Err(ConfigError::InvalidCapacity(tier.capacity));
        }

        Ok(())
    }
}
