//! Validation result cache.
//!
//! Outcomes are kept per normalized address for a limited time and
//! persisted through a [`crate::storage::Storage`] backend after each run.

mod model;
mod repository;

pub use model::{
    CacheConfig, CacheEntry, DEFAULT_CAPACITY, DEFAULT_STORAGE_KEY, DEFAULT_TTL_HOURS, LoadStatus,
};
pub use repository::ResultCache;
