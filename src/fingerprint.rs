//! Cache fingerprints
//!
//! A dependency's fingerprint pairs a source-tree hash (summed file
//! mtimes) with a configuration hash (canonicalized build config).
//! Either changing forces a rebuild; matching both allows the build to
//! be skipped.

use crate::error::DepotResult;
use crate::manifest::{BuildConfig, BuildSpec, Dependency, LOCAL_SOURCE_DIR};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Hex digest length, matching the cache-key style used elsewhere
const DIGEST_CHARS: usize = 12;

/// Fingerprint of one dependency for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefHash {
    pub key: String,
    pub source_hash: String,
    pub conf_hash: String,
}

impl RefHash {
    /// Compute the fingerprint from the on-disk tree and the declared
    /// configuration
    pub fn compute(dep: &Dependency, spec: &BuildSpec) -> DepotResult<Self> {
        let tree = if spec.local_source {
            dep.source_dir.join(LOCAL_SOURCE_DIR)
        } else {
            dep.source_dir.clone()
        };
        let source_hash = source_hash(&tree);
        let conf_hash = conf_hash(&spec.declared)?;
        debug!(dep = %dep.key, %source_hash, %conf_hash, "fingerprint");
        Ok(Self {
            key: dep.key.clone(),
            source_hash,
            conf_hash,
        })
    }
}

/// Hash the source tree: sum every regular file's mtime in whole
/// seconds, then hash the decimal sum.
///
/// A missing or unreadable tree sums to 0; the fetch phase does not
/// guarantee the tree exists.
pub fn source_hash(tree: &Path) -> String {
    let mut sum: u128 = 0;
    for entry in WalkDir::new(tree).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(meta) = entry.metadata() else { continue };
        if let Ok(mtime) = meta.modified() {
            if let Ok(elapsed) = mtime.duration_since(std::time::UNIX_EPOCH) {
                sum += u128::from(elapsed.as_secs());
            }
        }
    }
    digest(sum.to_string().as_bytes())
}

/// Hash the canonical form of the declared build configuration.
///
/// Hook fields are stripped (they are commands, not configuration) and
/// nulls dropped; object keys serialize sorted while array order is
/// preserved, so option reordering changes the hash but key order in
/// the manifest does not.
pub fn conf_hash(conf: &BuildConfig) -> DepotResult<String> {
    let value = serde_json::to_value(conf)?;
    let canonical = canonicalize(value);
    Ok(digest(canonical.to_string().as_bytes()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, v)| !is_hook(key) && !v.is_null())
                .map(|(key, v)| (key, canonicalize(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

fn is_hook(key: &str) -> bool {
    key == "pre_build" || key == "post_build"
}

fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())[..DIGEST_CHARS].to_string()
}
