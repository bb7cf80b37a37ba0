//! Error types for cache configuration.
//!
//! Lookups, writes and evictions never fail: a miss is `None` and evicting an
//! empty tier is a no-op. The only fallible surface is building the tier
//! hierarchy, either tier by tier or from a configuration file.

/// Errors that can occur while configuring a cache.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Tier capacity must be at least one entry and fit a slot index.
    #[error("invalid tier capacity: {0} (must be between 1 and {max})", max = u32::MAX)]
    InvalidCapacity(usize),

    /// The eviction policy name is not recognized.
    #[error("unknown eviction policy: '{0}' (expected 'recency'/'lru' or 'frequency'/'lfu')")]
    UnknownPolicy(String),

    /// A configuration declared no tiers.
    #[error("cache configuration must declare at least one tier")]
    NoTiers,

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
