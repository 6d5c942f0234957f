//! cmake adapter

use crate::build::{BuildAdapter, BuildContext};
use crate::error::DepotResult;
use crate::exec::{run_blocking, ArgBuilder, CommandSpec};
use crate::manifest::{BuildSpec, Dependency, Parallel};
use async_trait::async_trait;
use tracing::{info, warn};

/// Default build system: configure, build, optional install-target build
pub struct CmakeAdapter;

impl CmakeAdapter {
    /// Fold the install paths of already-built upstream dependencies
    /// into a `CMAKE_PREFIX_PATH` value; names without a recorded path
    /// are skipped, not fatal
    fn prefix_path(spec: &BuildSpec, ctx: &BuildContext<'_>) -> Option<String> {
        let mut paths = Vec::new();
        for name in &spec.dependencies {
            match ctx.metadata.install_path(name) {
                Some(path) => paths.push(path.display().to_string()),
                None => warn!(dep = %name, "no install path recorded, skipping prefix entry"),
            }
        }
        (!paths.is_empty()).then(|| paths.join(";"))
    }

    fn configure_args(dep: &Dependency, spec: &BuildSpec, prefix: Option<String>) -> Vec<String> {
        // The local in-tree project configures from its own directory,
        // so the source flag is omitted
        ArgBuilder::new()
            .push_if(
                !spec.local_source,
                ["-S".to_string(), dep.source_dir.display().to_string()],
            )
            .push("-B")
            .push(dep.build_dir.display().to_string())
            .push_all(spec.options.iter().cloned())
            .push_kv("-DCMAKE_PREFIX_PATH", prefix)
            .push_kv(
                "-DCMAKE_INSTALL_PREFIX",
                spec.install.as_ref().map(|p| p.display().to_string()),
            )
            .build()
    }

    fn build_args(dep: &Dependency, spec: &BuildSpec) -> Vec<String> {
        let parallel: Vec<String> = match spec.parallel {
            Parallel::Enabled(false) => vec![],
            Parallel::Enabled(true) => vec!["--parallel".to_string()],
            Parallel::Jobs(n) => vec!["--parallel".to_string(), n.to_string()],
        };
        ArgBuilder::new()
            .push("--build")
            .push(dep.build_dir.display().to_string())
            .push_all(parallel)
            .build()
    }

    fn install_args(dep: &Dependency) -> Vec<String> {
        // Install through the build driver, not `cmake --install`, so
        // the underlying build tool reports its own errors
        ArgBuilder::new()
            .push("--build")
            .push(dep.build_dir.display().to_string())
            .push_all(["--target", "install"])
            .build()
    }

    fn command(dep: &Dependency, spec: &BuildSpec, args: Vec<String>) -> CommandSpec {
        let cmd = CommandSpec::new("cmake").args(args);
        if spec.local_source {
            cmd.current_dir(&dep.source_dir)
        } else {
            cmd
        }
    }
}

#[async_trait]
impl BuildAdapter for CmakeAdapter {
    fn system(&self) -> &'static str {
        "cmake"
    }

    async fn build(
        &self,
        dep: &Dependency,
        spec: &BuildSpec,
        ctx: &BuildContext<'_>,
    ) -> DepotResult<()> {
        let prefix = Self::prefix_path(spec, ctx);

        info!(dep = %dep.key, "configuring");
        run_blocking(Self::command(dep, spec, Self::configure_args(dep, spec, prefix))).await?;

        info!(dep = %dep.key, "building");
        run_blocking(Self::command(dep, spec, Self::build_args(dep, spec))).await?;

        if spec.install.is_some() {
            info!(dep = %dep.key, "installing");
            run_blocking(Self::command(dep, spec, Self::install_args(dep))).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::BuildMetadata;
    use crate::manifest::{normalize_all, DependencySpec};
    use std::path::{Path, PathBuf};

    fn dependency(toml: &str) -> Dependency {
        let spec: DependencySpec = toml::from_str::<crate::manifest::DependencyEntry>(toml)
            .map(DependencySpec::Entry)
            .unwrap();
        normalize_all(&[spec], Path::new("/work/external"), Path::new("/work"))
            .unwrap()
            .remove(0)
    }

    #[test]
    fn configure_includes_source_and_install_prefix() {
        let dep = dependency(
            r#"
            github = "fmtlib/fmt"
            build = { options = ["-DFMT_TEST=OFF"] }
            "#,
        );
        let spec = dep.build.as_ref().unwrap();
        let args = CmakeAdapter::configure_args(&dep, spec, None);
        assert_eq!(
            args,
            vec![
                "-S",
                "/work/external/fmt",
                "-B",
                "/work/external/fmt-build",
                "-DFMT_TEST=OFF",
                "-DCMAKE_INSTALL_PREFIX=/work/external/fmt-build/install",
            ]
        );
    }

    #[test]
    fn local_configure_omits_source_flag() {
        let dep = dependency(r#"build = {}"#);
        let spec = dep.build.as_ref().unwrap();
        let args = CmakeAdapter::configure_args(&dep, spec, None);
        assert!(!args.contains(&"-S".to_string()));
        assert_eq!(args[0], "-B");
    }

    #[test]
    fn prefix_path_folds_known_dependencies() {
        let dep = dependency(
            r#"
            github = "gabime/spdlog"
            build = { dependencies = ["fmtlib/fmt", "not/built"] }
            "#,
        );
        let spec = dep.build.as_ref().unwrap();

        let mut metadata = BuildMetadata::default();
        metadata.record("fmtlib/fmt", Some(PathBuf::from("/install/fmt")), true);
        let ctx = BuildContext {
            metadata: &metadata,
        };

        // The unknown name is skipped; the known one folds in
        let prefix = CmakeAdapter::prefix_path(spec, &ctx).unwrap();
        assert_eq!(prefix, "/install/fmt");

        let args = CmakeAdapter::configure_args(&dep, spec, Some(prefix));
        assert!(args.contains(&"-DCMAKE_PREFIX_PATH=/install/fmt".to_string()));
    }

    #[test]
    fn parallel_renders_flag_or_count() {
        let auto = dependency(r#"github = "a/b"
build = { parallel = true }"#);
        let spec = auto.build.as_ref().unwrap();
        assert!(CmakeAdapter::build_args(&auto, spec).contains(&"--parallel".to_string()));

        let counted = dependency(r#"github = "a/b"
build = { parallel = 6 }"#);
        let spec = counted.build.as_ref().unwrap();
        let args = CmakeAdapter::build_args(&counted, spec);
        assert!(args.windows(2).any(|w| w == ["--parallel", "6"]));

        let off = dependency(r#"github = "a/b"
build = {}"#);
        let spec = off.build.as_ref().unwrap();
        assert!(!CmakeAdapter::build_args(&off, spec)
            .iter()
            .any(|a| a.starts_with("--parallel")));
    }

    #[test]
    fn install_is_a_separate_target_build() {
        let dep = dependency(r#"github = "a/b"
build = {}"#);
        let args = CmakeAdapter::install_args(&dep);
        assert_eq!(
            args,
            vec!["--build", "/work/external/b-build", "--target", "install"]
        );
    }
}
