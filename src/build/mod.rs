//! Build-system adapters
//!
//! Each supported build system implements [`BuildAdapter`]; the
//! orchestrator dispatches on the declared system name and invokes the
//! adapter's configure/build/install sequence. Adapter commands run
//! blocking and strictly sequentially; builds write shared toolchain
//! state and may consume each other's install output.

mod cmake;
mod make;
mod meson;

pub use cmake::CmakeAdapter;
pub use make::MakeAdapter;
pub use meson::MesonAdapter;

use crate::error::{DepotError, DepotResult};
use crate::manifest::{BuildSpec, Dependency};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Per-dependency state accumulated during the build phase
#[derive(Debug, Clone)]
pub struct DepState {
    pub install_path: Option<PathBuf>,
    pub built: bool,
}

/// Run-scoped map of dependency keys to their build-phase state.
///
/// Written after each dependency completes, read by later builds to
/// wire install prefixes. The build phase is sequential, so an entry
/// named in a later dependency's `dependencies` list is already final.
#[derive(Debug, Default)]
pub struct BuildMetadata {
    entries: HashMap<String, DepState>,
}

impl BuildMetadata {
    pub fn record(&mut self, key: impl Into<String>, install_path: Option<PathBuf>, built: bool) {
        self.entries.insert(key.into(), DepState { install_path, built });
    }

    pub fn install_path(&self, key: &str) -> Option<&Path> {
        self.entries.get(key)?.install_path.as_deref()
    }

    /// Whether any of the named upstream dependencies built this run
    pub fn any_built(&self, keys: &[String]) -> bool {
        keys.iter()
            .any(|key| self.entries.get(key).is_some_and(|state| state.built))
    }
}

/// Shared state handed to adapters, threaded explicitly instead of
/// living in globals
pub struct BuildContext<'a> {
    pub metadata: &'a BuildMetadata,
}

/// A build system's configure/build/install command sequence
#[async_trait]
pub trait BuildAdapter: Send + Sync {
    /// The system name this adapter answers to
    fn system(&self) -> &'static str;

    /// Run the full sequence for one dependency
    async fn build(
        &self,
        dep: &Dependency,
        spec: &BuildSpec,
        ctx: &BuildContext<'_>,
    ) -> DepotResult<()>;
}

/// Dispatch on the declared build system name
pub fn adapter_for(system: &str) -> DepotResult<Box<dyn BuildAdapter>> {
    match system {
        "cmake" => Ok(Box::new(CmakeAdapter)),
        "make" => Ok(Box::new(MakeAdapter)),
        "meson" => Ok(Box::new(MesonAdapter)),
        other => Err(DepotError::UnsupportedBuildSystem(other.to_string())),
    }
}
