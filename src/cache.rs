//! Fingerprint cache persistence
//!
//! One JSON object per download root, mapping dependency keys to their
//! last known fingerprints. The file is rewritten in full every run
//! from the fingerprints computed that run, so entries for removed
//! dependencies fall out on their own.

use crate::error::{DepotError, DepotResult};
use crate::fingerprint::RefHash;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Cache file name inside the download root
pub const CACHE_FILE: &str = ".depot-cache.json";

/// Persisted fingerprint for one dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub source_hash: String,
    pub conf_hash: String,
}

/// The on-disk fingerprint cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildCache {
    #[serde(flatten)]
    entries: BTreeMap<String, CacheEntry>,
}

impl BuildCache {
    /// Load the cache; a missing file is an empty cache
    pub async fn load(path: &Path) -> DepotResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no cache file, starting empty");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| DepotError::io(format!("reading {}", path.display()), e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Replace the cache file with this run's contents
    pub async fn save(&self, path: &Path) -> DepotResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DepotError::io(format!("creating {}", parent.display()), e))?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)
            .await
            .map_err(|e| DepotError::io(format!("writing {}", path.display()), e))?;
        debug!(path = %path.display(), entries = self.entries.len(), "cache written");
        Ok(())
    }

    /// Record a fingerprint computed this run
    pub fn record(&mut self, fingerprint: &RefHash) {
        self.entries.insert(
            fingerprint.key.clone(),
            CacheEntry {
                source_hash: fingerprint.source_hash.clone(),
                conf_hash: fingerprint.conf_hash.clone(),
            },
        );
    }

    /// Whether the cached fingerprint for this key matches
    pub fn matches(&self, fingerprint: &RefHash) -> bool {
        self.entries.get(&fingerprint.key).is_some_and(|entry| {
            entry.source_hash == fingerprint.source_hash
                && entry.conf_hash == fingerprint.conf_hash
        })
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
