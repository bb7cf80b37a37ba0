//! Eviction policies.
//!
//! A policy decides which slot a full tier gives up and how an access changes
//! that decision. The set is closed:
//!
//! - [`PolicyKind::Recency`]: evict the least recently used entry
//! - [`PolicyKind::Frequency`]: evict the least frequently used entry, oldest
//!   admission first among equal counts
//!
//! Policies track slot indices handed out by the tier's storage and never see
//! keys or values.

mod frequency;
mod recency;

use frequency::FrequencyIndex;
use recency::RecencyList;

use crate::error::ConfigError;
use crate::storage::SlotIndex;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Which eviction policy a tier uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    /// Least recently used.
    Recency,
    /// Least frequently used.
    Frequency,
}

impl PolicyKind {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recency => "recency",
            Self::Frequency => "frequency",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "recency" | "lru" => Ok(Self::Recency),
            "frequency" | "lfu" => Ok(Self::Frequency),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for PolicyKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Per-tier policy state.
#[derive(Debug)]
pub(crate) enum EvictionPolicy {
    Recency(RecencyList),
    Frequency(FrequencyIndex),
}

impl EvictionPolicy {
    pub fn new(kind: PolicyKind) -> Self {
        match kind {
            PolicyKind::Recency => Self::Recency(RecencyList::new()),
            PolicyKind::Frequency => Self::Frequency(FrequencyIndex::new()),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::Recency(_) => PolicyKind::Recency,
            Self::Frequency(_) => PolicyKind::Frequency,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Recency(list) => list.len(),
            Self::Frequency(index) => index.len(),
        }
    }

    /// Record initial metadata for a freshly stored slot.
    pub fn admit(&mut self, slot: SlotIndex) {
        match self {
            Self::Recency(list) => list.admit(slot),
            Self::Frequency(index) => index.admit(slot),
        }
    }

    /// Record an access. No-op for untracked slots.
    pub fn touch(&mut self, slot: SlotIndex) {
        match self {
            Self::Recency(list) => list.touch(slot),
            Self::Frequency(index) => index.touch(slot),
        }
    }

    /// Select the slot to evict. `None` only when nothing is tracked.
    pub fn victim(&self) -> Option<SlotIndex> {
        match self {
            Self::Recency(list) => list.victim(),
            Self::Frequency(index) => index.victim(),
        }
    }

    pub fn remove(&mut self, slot: SlotIndex) {
        match self {
            Self::Recency(list) => list.remove(slot),
            Self::Frequency(index) => index.remove(slot),
        }
    }

    /// Access count of a slot, for policies that keep one.
    pub fn count(&self, slot: SlotIndex) -> Option<u64> {
        match self {
            Self::Recency(_) => None,
            Self::Frequency(index) => index.count(slot),
        }
    }

    /// Tracked slots in eviction order, next victim first.
    pub fn order(&self) -> Vec<SlotIndex> {
        match self {
            Self::Recency(list) => list.order(),
            Self::Frequency(index) => index.order(),
        }
    }

    pub fn clear(&mut self) {
        match self {
            Self::Recency(list) => list.clear(),
            Self::Frequency(index) => index.clear(),
        }
    }
}
