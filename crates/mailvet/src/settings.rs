//! Persistent user settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::TimeDelta;
use mailvet_core::service::scheduler::{DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY};
use mailvet_core::verifier::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use mailvet_core::{CacheConfig, cache};
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "mailvet";
const SETTINGS_FILE: &str = "settings.json";
const CACHE_DB_FILE: &str = "cache.db";

/// Application settings (persisted to disk).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Deliverability service base URL.
    pub backend_url: String,
    /// Addresses per verification request.
    pub batch_size: usize,
    /// Requests in flight.
    pub concurrency: usize,
    /// How long cached outcomes stay fresh.
    pub cache_ttl_hours: i64,
    /// Most outcomes kept in the cache.
    pub cache_capacity: usize,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BASE_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            cache_ttl_hours: cache::DEFAULT_TTL_HOURS,
            cache_capacity: cache::DEFAULT_CAPACITY,
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Settings {
    /// Cache configuration derived from these settings.
    ///
    /// Fails when `cache_ttl_hours` is too large to represent as a duration.
    pub fn cache_config(&self) -> Result<CacheConfig> {
        let hours = self.cache_ttl_hours;
        let ttl = TimeDelta::try_hours(hours)
            .with_context(|| format!("cache_ttl_hours {hours} is out of range"))?;
        Ok(CacheConfig::new().ttl(ttl).capacity(self.cache_capacity))
    }

    /// Verification request timeout.
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}

/// Location of the settings file.
pub fn settings_path() -> PathBuf {
    app_dir(dirs::config_dir()).join(SETTINGS_FILE)
}

/// Location of the cache database, creating its directory if needed.
pub async fn cache_db_path() -> Result<PathBuf> {
    let data_dir = app_dir(dirs::data_dir());
    tokio::fs::create_dir_all(&data_dir)
        .await
        .with_context(|| format!("creating {}", data_dir.display()))?;
    Ok(data_dir.join(CACHE_DB_FILE))
}

/// Load settings from the default location.
pub async fn load() -> Result<Settings> {
    load_from(&settings_path()).await
}

/// Load settings from a file; a missing file yields defaults.
pub async fn load_from(path: &Path) -> Result<Settings> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(Settings::default());
    }

    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;

    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

/// Save settings to the default location.
pub async fn save(settings: &Settings) -> Result<()> {
    save_to(settings, &settings_path()).await
}

/// Save settings to a file, creating its directory if needed.
pub async fn save_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;
    }

    let contents = serde_json::to_string_pretty(settings)?;
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("writing {}", path.display()))?;

    tracing::info!("Settings saved to {:?}", path);
    Ok(())
}
