//! CLI command implementations

pub mod init;
pub mod status;
pub mod sync;

pub use init::execute as init;
pub use status::execute as status;
pub use sync::execute as sync;

use crate::config::{Config, DEFAULT_ROOT, MANIFEST_FILE};
use crate::error::{DepotError, DepotResult};
use crate::manifest::Manifest;
use std::path::{Path, PathBuf};

/// Global path overrides from the command line
#[derive(Debug, Default)]
pub struct Overrides {
    pub manifest: Option<PathBuf>,
    pub root: Option<PathBuf>,
}

/// Resolved workspace paths plus the loaded manifest
pub struct Workspace {
    pub project_root: PathBuf,
    pub root: PathBuf,
    pub manifest: Manifest,
}

/// Locate and load the manifest, resolving the download root.
///
/// Precedence for the root: CLI flag, manifest `root` key, global
/// config, built-in default. All returned paths are absolute.
pub async fn load_workspace(config: &Config, overrides: &Overrides) -> DepotResult<Workspace> {
    let project_root = std::env::current_dir()
        .map_err(|e| DepotError::io("getting current directory", e))?;

    let manifest_path = overrides
        .manifest
        .clone()
        .or_else(|| config.manifest.clone())
        .unwrap_or_else(|| PathBuf::from(MANIFEST_FILE));
    let manifest_path = absolutize(&project_root, &manifest_path);
    let manifest = Manifest::load(&manifest_path).await?;

    let root = overrides
        .root
        .clone()
        .or_else(|| manifest.root.clone())
        .or_else(|| config.root.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));
    let root = absolutize(&project_root, &root);

    Ok(Workspace {
        project_root,
        root,
        manifest,
    })
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
