//! JSON-file cache adapter.
//!
//! Entries live in memory and are written back to a single JSON document
//! after every mutation, so cached reference data survives restarts and the
//! upstream quotas are not spent again on the next run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use commission_types::ReferenceCache;

use crate::CacheError;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    value: Value,
    expires_at: DateTime<Utc>,
}

impl StoredEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

type Entries = HashMap<String, StoredEntry>;

/// Persistent cache backed by a JSON file.
pub struct FileCache {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl FileCache {
    /// Opens the cache at `path`.
    ///
    /// A missing file is an empty cache. An unreadable or malformed file is an
    /// error, so a bad path is reported at startup instead of being silently
    /// overwritten.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();
        let path_text = path.display().to_string();

        let entries: Entries = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Entries::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| CacheError::Corrupt {
                path: path_text.clone(),
                message: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Entries::new(),
            Err(source) => {
                return Err(CacheError::Io {
                    path: path_text,
                    source,
                });
            }
        };

        let now = Utc::now();
        let total = entries.len();
        let entries: Entries = entries.into_iter().filter(|(_, e)| e.is_live(now)).collect();
        debug!(
            path = %path_text,
            live = entries.len(),
            expired = total - entries.len(),
            "opened file cache"
        );

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &Entries) {
        if let Err(e) = self.write_file(entries).await {
            warn!(path = %self.path.display(), error = %e, "failed to persist cache");
        }
    }

    async fn write_file(&self, entries: &Entries) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec_pretty(entries)?;
        // Write-then-rename keeps the previous file intact on a crash.
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await
    }
}

#[async_trait]
impl ReferenceCache for FileCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().await;
        let entry = entries.get(key)?;
        if entry.is_live(Utc::now()) {
            return Some(entry.value.clone());
        }

        entries.remove(key);
        self.persist(&entries).await;
        None
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), StoredEntry { value, expires_at });
        self.persist(&entries).await;
    }

    async fn force_expire(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        if entries.remove(key).is_some() {
            self.persist(&entries).await;
        }
    }
}
