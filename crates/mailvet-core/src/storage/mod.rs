//! Key-value storage backends for persisted state.
//!
//! The result cache keeps its entire state under a single key, so a backend
//! only needs whole-value reads and writes.

mod memory;
mod sqlite;

use std::future::Future;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use crate::Result;

/// String key-value store.
pub trait Storage: Send + Sync {
    /// Reads the value stored under `key`.
    fn read(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Stores `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> impl Future<Output = Result<()>> + Send;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}
