//! meson adapter

use crate::build::{BuildAdapter, BuildContext};
use crate::error::DepotResult;
use crate::exec::{run_blocking, ArgBuilder, CommandSpec};
use crate::manifest::{BuildSpec, Dependency, Parallel};
use async_trait::async_trait;
use tracing::info;

/// meson builds: `setup`, `compile`, then a destdir-staged `install`
pub struct MesonAdapter;

impl MesonAdapter {
    fn setup_args(dep: &Dependency, spec: &BuildSpec) -> Vec<String> {
        ArgBuilder::new()
            .push("setup")
            .push(dep.build_dir.display().to_string())
            .push(dep.source_dir.display().to_string())
            .push_all(spec.options.iter().cloned())
            .build()
    }

    fn compile_args(dep: &Dependency, spec: &BuildSpec) -> Vec<String> {
        let jobs = match spec.parallel {
            // meson compiles in parallel on its own; only an explicit
            // count overrides it
            Parallel::Enabled(_) => None,
            Parallel::Jobs(n) => Some(n.to_string()),
        };
        ArgBuilder::new()
            .push("compile")
            .push("-C")
            .push(dep.build_dir.display().to_string())
            .push_if(jobs.is_some(), ["-j"])
            .push_opt(jobs)
            .build()
    }

    fn install_args(dep: &Dependency, spec: &BuildSpec) -> Option<Vec<String>> {
        let install = spec.install.as_ref()?;
        Some(
            ArgBuilder::new()
                .push("install")
                .push("-C")
                .push(dep.build_dir.display().to_string())
                .push("--destdir")
                .push(install.display().to_string())
                .build(),
        )
    }
}

#[async_trait]
impl BuildAdapter for MesonAdapter {
    fn system(&self) -> &'static str {
        "meson"
    }

    async fn build(
        &self,
        dep: &Dependency,
        spec: &BuildSpec,
        _ctx: &BuildContext<'_>,
    ) -> DepotResult<()> {
        info!(dep = %dep.key, "configuring");
        run_blocking(CommandSpec::new("meson").args(Self::setup_args(dep, spec))).await?;

        info!(dep = %dep.key, "building");
        run_blocking(CommandSpec::new("meson").args(Self::compile_args(dep, spec))).await?;

        if let Some(args) = Self::install_args(dep, spec) {
            info!(dep = %dep.key, "installing");
            run_blocking(CommandSpec::new("meson").args(args)).await?;
        }
        Ok(())
    }
}
