//! Result cache with TTL and size-bounded persistence.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::model::{CacheConfig, CacheEntry, LoadStatus};
use crate::Result;
use crate::storage::Storage;
use crate::validate::Outcome;

/// An entry plus its insertion sequence, used to keep the newest entries.
#[derive(Debug, Clone)]
struct Slot {
    seq: u64,
    entry: CacheEntry,
}

/// Address → outcome cache persisted through a [`Storage`] backend.
///
/// Reads never refresh an entry. Expired entries are only dropped when the
/// cache is saved, at which point the newest `capacity` survivors are kept.
#[derive(Debug)]
pub struct ResultCache<S> {
    storage: S,
    config: CacheConfig,
    entries: HashMap<String, Slot>,
    next_seq: u64,
}

impl<S: Storage> ResultCache<S> {
    /// Creates an empty cache without touching storage.
    #[must_use]
    pub fn new(storage: S, config: CacheConfig) -> Self {
        Self {
            storage,
            config,
            entries: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Creates a cache and loads persisted entries.
    ///
    /// Unreadable data leaves the cache empty; see [`Self::load_from_storage`].
    pub async fn open(storage: S, config: CacheConfig) -> (Self, LoadStatus) {
        let mut cache = Self::new(storage, config);
        let status = cache.load_from_storage().await;
        (cache, status)
    }

    /// Returns the cache configuration.
    #[must_use]
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Number of entries held in memory, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entries are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the cached outcome unless it is missing or expired.
    #[must_use]
    pub fn get(&self, address: &str) -> Option<&Outcome> {
        self.get_at(address, Utc::now())
    }

    fn get_at(&self, address: &str, now: DateTime<Utc>) -> Option<&Outcome> {
        self.entries
            .get(address)
            .filter(|slot| !slot.entry.is_expired_at(now, self.config.ttl))
            .map(|slot| &slot.entry.outcome)
    }

    /// Stores an outcome, replacing any previous entry for the address.
    pub fn put(&mut self, address: impl Into<String>, outcome: Outcome) {
        self.insert(CacheEntry::new(address, outcome));
    }

    fn insert(&mut self, entry: CacheEntry) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries
            .insert(entry.address.clone(), Slot { seq, entry });
    }

    /// Replaces the in-memory state with what storage holds.
    ///
    /// Never fails: unreadable or malformed data resets the cache to empty,
    /// logs a warning and reports [`LoadStatus::Reset`].
    pub async fn load_from_storage(&mut self) -> LoadStatus {
        self.entries.clear();
        self.next_seq = 0;

        let raw = match self.storage.read(&self.config.storage_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadStatus::Empty,
            Err(e) => {
                warn!("Failed to read validation cache: {}", e);
                return LoadStatus::Reset {
                    reason: e.to_string(),
                };
            }
        };

        match serde_json::from_str::<Vec<CacheEntry>>(&raw) {
            Ok(entries) => {
                for entry in entries {
                    self.insert(entry);
                }
                debug!("Loaded {} cached validation results", self.entries.len());
                LoadStatus::Loaded(self.entries.len())
            }
            Err(e) => {
                warn!("Failed to load validation cache, starting empty: {}", e);
                LoadStatus::Reset {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Evicts expired and excess entries, then persists the rest.
    ///
    /// Returns the number of entries written.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub async fn save_to_storage(&mut self) -> Result<usize> {
        self.evict(Utc::now());

        let mut slots: Vec<&Slot> = self.entries.values().collect();
        slots.sort_by_key(|slot| slot.seq);
        let entries: Vec<&CacheEntry> = slots.into_iter().map(|slot| &slot.entry).collect();

        let json = serde_json::to_string(&entries)?;
        self.storage.write(&self.config.storage_key, &json).await?;

        debug!("Saved {} cached validation results", entries.len());
        Ok(entries.len())
    }

    /// Drops expired entries, then all but the newest `capacity`.
    fn evict(&mut self, now: DateTime<Utc>) {
        let ttl = self.config.ttl;
        self.entries
            .retain(|_, slot| !slot.entry.is_expired_at(now, ttl));

        let excess = self.entries.len().saturating_sub(self.config.capacity);
        if excess == 0 {
            return;
        }
        if self.config.capacity == 0 {
            self.entries.clear();
            return;
        }

        let mut seqs: Vec<u64> = self.entries.values().map(|slot| slot.seq).collect();
        seqs.sort_unstable();
        let cutoff = seqs[excess];
        self.entries.retain(|_, slot| slot.seq >= cutoff);
    }

    /// Empties the cache and removes the persisted copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to remove the key.
    pub async fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.next_seq = 0;
        self.storage.remove(&self.config.storage_key).await
    }
}
