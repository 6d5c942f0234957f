//! Two-phase run orchestration
//!
//! Phase 1 fetches every network dependency concurrently and drains
//! all fetch tasks before anything else happens. Phase 2 walks the
//! dependencies sequentially in declaration order, deciding per entry
//! whether to build, then rewrites the fingerprint cache.

use crate::build::{adapter_for, BuildContext, BuildMetadata};
use crate::cache::{BuildCache, CACHE_FILE};
use crate::error::{DepotError, DepotResult};
use crate::exec::{run_blocking, CommandSpec};
use crate::fingerprint::RefHash;
use crate::manifest::{normalize_all, Dependency, DependencySpec};
use crate::repo;
use futures_util::future::join_all;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info, warn};

/// Drives a full fetch-and-build run over one dependency list
pub struct Orchestrator {
    root: PathBuf,
    project_root: PathBuf,
    force_rebuild: bool,
}

/// What a run did, for reporting
#[derive(Debug, Default)]
pub struct RunSummary {
    pub fetched: usize,
    pub built: Vec<String>,
    pub skipped: Vec<String>,
}

/// The skip/build invariant, one flag per clause
#[derive(Debug, Clone, Copy, Default)]
struct BuildDecision {
    force: bool,
    install_missing: bool,
    upstream_built: bool,
    fingerprint_changed: bool,
    build_dir_missing: bool,
}

impl BuildDecision {
    fn should_build(&self) -> bool {
        self.force
            || self.install_missing
            || self.upstream_built
            || self.fingerprint_changed
            || self.build_dir_missing
    }
}

impl Orchestrator {
    /// `root` and `project_root` must be absolute so adapter commands
    /// work from any working directory
    pub fn new(root: PathBuf, project_root: PathBuf) -> Self {
        Self {
            root,
            project_root,
            force_rebuild: false,
        }
    }

    /// Force every dependency to rebuild this run
    pub fn force_rebuild(mut self, force: bool) -> Self {
        self.force_rebuild = force;
        self
    }

    /// Run both phases over the declared dependency list
    pub async fn run(&self, specs: &[DependencySpec]) -> DepotResult<RunSummary> {
        let deps = normalize_all(specs, &self.root, &self.project_root)?;

        let fetched = self.fetch_phase(&deps).await?;
        let mut summary = self.build_phase(&deps).await?;
        summary.fetched = fetched;
        Ok(summary)
    }

    /// Resolve and fetch every network dependency, then drain
    async fn fetch_phase(&self, deps: &[Dependency]) -> DepotResult<usize> {
        let mut handles = Vec::new();
        for dep in deps {
            let Some(remote) = &dep.remote else {
                debug!(dep = %dep.key, "local dependency, nothing to fetch");
                continue;
            };
            let refspec = repo::resolve(
                &dep.key,
                &remote.url,
                remote.hash.as_deref(),
                remote.refspec.as_deref(),
            )
            .await?;
            handles.push(tokio::spawn(repo::sync_repo(
                dep.key.clone(),
                remote.url.clone(),
                refspec,
                dep.source_dir.clone(),
            )));
        }

        let count = handles.len();
        if count > 0 {
            info!(fetches = count, "waiting for fetch phase");
        }
        // Run-to-completion barrier: every fetch task settles before
        // any build starts
        for joined in join_all(handles).await {
            if let Err(e) = joined {
                warn!("fetch task panicked: {e}");
            }
        }
        Ok(count)
    }

    /// Sequential build pass in declaration order
    async fn build_phase(&self, deps: &[Dependency]) -> DepotResult<RunSummary> {
        let cache_path = self.root.join(CACHE_FILE);
        let cache = BuildCache::load(&cache_path).await?;
        let mut next_cache = BuildCache::default();
        let mut metadata = BuildMetadata::default();
        let mut summary = RunSummary::default();

        for dep in deps {
            let Some(spec) = &dep.build else {
                continue;
            };

            let fingerprint = RefHash::compute(dep, spec)?;
            let decision = BuildDecision {
                force: spec.force_rebuild || self.force_rebuild,
                install_missing: spec.install.as_ref().is_some_and(|p| !p.exists()),
                upstream_built: metadata.any_built(&spec.dependencies),
                fingerprint_changed: !cache.matches(&fingerprint),
                build_dir_missing: !dep.build_dir.exists(),
            };

            if decision.should_build() {
                debug!(dep = %dep.key, ?decision, "building");
                // Dispatch first: an unknown system must fail before
                // anything spawns
                let adapter = adapter_for(&spec.system)?;

                fs::create_dir_all(&dep.build_dir).await.map_err(|e| {
                    DepotError::io(format!("creating {}", dep.build_dir.display()), e)
                })?;

                if let Some(hook) = &spec.pre_build {
                    self.run_hook(dep, hook).await?;
                }

                let ctx = BuildContext {
                    metadata: &metadata,
                };
                adapter.build(dep, spec, &ctx).await?;

                if let Some(hook) = &spec.post_build {
                    self.run_hook(dep, hook).await?;
                }

                summary.built.push(dep.key.clone());
            } else {
                info!(dep = %dep.key, "up to date, skipping build");
                summary.skipped.push(dep.key.clone());
            }

            metadata.record(&dep.key, spec.install.clone(), decision.should_build());
            // Recorded even when skipped, so the cache always tracks
            // the latest known source state
            next_cache.record(&fingerprint);
        }

        next_cache.save(&cache_path).await?;
        Ok(summary)
    }

    /// Hooks run through the shell with a pinned working directory
    async fn run_hook(&self, dep: &Dependency, hook: &str) -> DepotResult<()> {
        info!(dep = %dep.key, hook, "running hook");
        run_blocking(
            CommandSpec::new("sh")
                .args(["-c", hook])
                .current_dir(&dep.source_dir),
        )
        .await
    }
}
