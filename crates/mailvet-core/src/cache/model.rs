//! Cache data models.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::validate::Outcome;

/// Storage key the cache persists under.
pub const DEFAULT_STORAGE_KEY: &str = "email_validation_cache";

/// Maximum number of entries kept at persistence time.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default time-to-live in hours.
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// A cached outcome for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Normalized address.
    pub address: String,
    /// The outcome produced for it.
    pub outcome: Outcome,
    /// When the outcome was stored.
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Creates an entry stored now.
    #[must_use]
    pub fn new(address: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            address: address.into(),
            outcome,
            stored_at: Utc::now(),
        }
    }

    /// Returns true if the entry is older than `ttl` at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now - self.stored_at > ttl
    }
}

/// Cache tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum age before an entry is treated as absent.
    pub ttl: TimeDelta,
    /// Maximum number of entries written to storage.
    pub capacity: usize,
    /// Storage key.
    pub storage_key: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: TimeDelta::hours(DEFAULT_TTL_HOURS),
            capacity: DEFAULT_CAPACITY,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl CacheConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the time-to-live.
    #[must_use]
    pub fn ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the capacity.
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the storage key.
    #[must_use]
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}

/// What happened when the cache was loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing was stored.
    Empty,
    /// Entries were restored.
    Loaded(usize),
    /// Stored data could not be read or parsed; the cache starts empty.
    Reset {
        /// Why the stored data was discarded.
        reason: String,
    },
}

impl LoadStatus {
    /// Returns true if stored data was discarded.
    #[must_use]
    pub const fn is_reset(&self) -> bool {
        matches!(self, Self::Reset { .. })
    }
}
