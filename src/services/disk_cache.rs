use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::services::cache_policy;

/// A cached value together with its age verdict. Stale values are still
/// returned so callers can choose to show them.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
    pub value: T,
    pub updated_at: DateTime<Utc>,
    pub is_fresh: bool,
}

#[derive(Serialize, Deserialize)]
struct CacheEnvelope<T> {
    value: T,
    updated_at: DateTime<Utc>,
}

type ErrorHook = Box<dyn Fn(&str) + Send + Sync>;

/// Generic key → JSON-blob store on disk.
///
/// This is a cache, not a source of truth: write failures are logged and
/// swallowed. The error hook makes the swallow observable in tests without
/// changing the external contract. Writes go through a temp file + rename
/// and are serialized behind a mutex.
pub struct DiskCache {
    directory: PathBuf,
    io_lock: Mutex<()>,
    error_hook: Mutex<Option<ErrorHook>>,
}

impl DiskCache {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        let directory = directory.as_ref().to_path_buf();
        if let Err(error) = fs::create_dir_all(&directory) {
            tracing::warn!("Failed to create disk cache directory: {error}");
        }
        Self {
            directory,
            io_lock: Mutex::new(()),
            error_hook: Mutex::new(None),
        }
    }

    /// Installs an observer for swallowed store failures.
    pub fn set_error_hook(&self, hook: impl Fn(&str) + Send + Sync + 'static) {
        *self.error_hook.lock() = Some(Box::new(hook));
    }

    pub fn store<T: Serialize>(&self, value: &T, key: &str) {
        let envelope = CacheEnvelope {
            value,
            updated_at: Utc::now(),
        };
        let data = match serde_json::to_vec(&envelope) {
            Ok(data) => data,
            Err(error) => {
                self.report(&format!("Failed to encode cache entry {key}: {error}"));
                return;
            }
        };

        let path = self.file_path(key);
        let tmp = path.with_extension("json.tmp");
        let _guard = self.io_lock.lock();
        let result = fs::write(&tmp, &data).and_then(|_| fs::rename(&tmp, &path));
        if let Err(error) = result {
            self.report(&format!("Failed to write cache entry {key}: {error}"));
        }
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str, ttl_secs: i64) -> Option<CacheResult<T>> {
        let path = self.file_path(key);
        let data = {
            let _guard = self.io_lock.lock();
            fs::read(&path).ok()?
        };
        let envelope: CacheEnvelope<T> = serde_json::from_slice(&data).ok()?;
        let is_fresh = cache_policy::is_fresh(Some(envelope.updated_at), ttl_secs);
        Some(CacheResult {
            value: envelope.value,
            updated_at: envelope.updated_at,
            is_fresh,
        })
    }

    fn file_path(&self, key: &str) -> PathBuf {
        let safe_key: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.directory.join(format!("{safe_key}.json"))
    }

    fn report(&self, message: &str) {
        tracing::warn!("{message}");
        if let Some(hook) = self.error_hook.lock().as_ref() {
            hook(message);
        }
    }
}
