//! make adapter

use crate::build::{BuildAdapter, BuildContext};
use crate::error::DepotResult;
use crate::exec::{run_blocking, ArgBuilder, CommandSpec};
use crate::manifest::{BuildSpec, Dependency, Parallel};
use async_trait::async_trait;
use tracing::info;

/// In-tree make builds: `make [-j[N]]`, then a DESTDIR-staged install
pub struct MakeAdapter;

impl MakeAdapter {
    fn build_args(spec: &BuildSpec) -> Vec<String> {
        let jobs = match spec.parallel {
            Parallel::Enabled(false) => None,
            Parallel::Enabled(true) => Some("-j".to_string()),
            Parallel::Jobs(n) => Some(format!("-j{n}")),
        };
        ArgBuilder::new().push_opt(jobs).build()
    }

    fn install_args(spec: &BuildSpec) -> Option<Vec<String>> {
        let install = spec.install.as_ref()?;
        Some(
            ArgBuilder::new()
                .push(format!("DESTDIR={}", install.display()))
                .push("install")
                .build(),
        )
    }
}

#[async_trait]
impl BuildAdapter for MakeAdapter {
    fn system(&self) -> &'static str {
        "make"
    }

    async fn build(
        &self,
        dep: &Dependency,
        spec: &BuildSpec,
        _ctx: &BuildContext<'_>,
    ) -> DepotResult<()> {
        info!(dep = %dep.key, "building");
        run_blocking(
            CommandSpec::new("make")
                .args(Self::build_args(spec))
                .current_dir(&dep.source_dir),
        )
        .await?;

        if let Some(args) = Self::install_args(spec) {
            info!(dep = %dep.key, "installing");
            run_blocking(
                CommandSpec::new("make")
                    .args(args)
                    .current_dir(&dep.source_dir),
            )
            .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{normalize_all, DependencyEntry, DependencySpec};
    use std::path::Path;

    fn spec_for(toml: &str) -> BuildSpec {
        let entry: DependencyEntry = toml::from_str(toml).unwrap();
        normalize_all(
            &[DependencySpec::Entry(entry)],
            Path::new("/work/external"),
            Path::new("/work"),
        )
        .unwrap()
        .remove(0)
        .build
        .unwrap()
    }

    #[test]
    fn plain_build_has_no_flags() {
        let spec = spec_for(r#"github = "a/b"
build = { system = "make", install = false }"#);
        assert!(MakeAdapter::build_args(&spec).is_empty());
        assert!(MakeAdapter::install_args(&spec).is_none());
    }

    #[test]
    fn parallel_renders_as_j_flag() {
        let spec = spec_for(r#"github = "a/b"
build = { system = "make", parallel = true }"#);
        assert_eq!(MakeAdapter::build_args(&spec), vec!["-j"]);

        let spec = spec_for(r#"github = "a/b"
build = { system = "make", parallel = 3 }"#);
        assert_eq!(MakeAdapter::build_args(&spec), vec!["-j3"]);
    }

    #[test]
    fn install_stages_through_destdir() {
        let spec = spec_for(r#"github = "a/b"
build = { system = "make" }"#);
        assert_eq!(
            MakeAdapter::install_args(&spec).unwrap(),
            vec!["DESTDIR=/work/external/b-build/install", "install"]
        );
    }
}
