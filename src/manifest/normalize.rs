//! Spec normalization
//!
//! Turns declared entries into canonical build records: keys, derived
//! directories, and build specs with defaults merged. Runs once per
//! invocation, before any fetch.

use crate::error::{DepotError, DepotResult};
use crate::manifest::{BuildConfig, Declaration, DependencySpec, InstallOpt, Parallel};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Key of the local in-tree project
pub const LOCAL_KEY: &str = "local";

/// Folder hashed for the local in-tree project
pub const LOCAL_SOURCE_DIR: &str = "src";

const KNOWN_SYSTEMS: &[&str] = &["cmake", "make", "meson"];

/// A normalized dependency: unique key, derived directories, optional
/// remote and build record
#[derive(Debug, Clone)]
pub struct Dependency {
    pub key: String,
    pub remote: Option<Remote>,
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub build: Option<BuildSpec>,
}

/// Where and what to fetch
#[derive(Debug, Clone)]
pub struct Remote {
    pub url: String,
    pub hash: Option<String>,
    pub refspec: Option<String>,
}

/// Build instructions with defaults merged
#[derive(Debug, Clone)]
pub struct BuildSpec {
    pub system: String,
    /// Resolved install prefix; `None` disables the install step
    pub install: Option<PathBuf>,
    pub options: Vec<String>,
    pub parallel: Parallel,
    pub dependencies: Vec<String>,
    pub local_source: bool,
    pub pre_build: Option<String>,
    pub post_build: Option<String>,
    pub force_rebuild: bool,
    /// The configuration as written, the input to the config fingerprint
    pub declared: BuildConfig,
}

/// Normalize every spec in declaration order, rejecting duplicates
pub fn normalize_all(
    specs: &[DependencySpec],
    root: &Path,
    project_root: &Path,
) -> DepotResult<Vec<Dependency>> {
    let mut deps = Vec::with_capacity(specs.len());
    let mut seen = HashSet::new();

    for (index, spec) in specs.iter().enumerate() {
        let dep = normalize(spec, index, root, project_root)?;
        if !seen.insert(dep.key.clone()) {
            return Err(DepotError::manifest(&dep.key, "declared more than once"));
        }
        deps.push(dep);
    }
    Ok(deps)
}

fn normalize(
    spec: &DependencySpec,
    index: usize,
    root: &Path,
    project_root: &Path,
) -> DepotResult<Dependency> {
    match spec.discriminate(index)? {
        Declaration::Shorthand { owner, project } => {
            let key = format!("{owner}/{project}");
            Ok(Dependency {
                remote: Some(Remote {
                    url: format!("https://github.com/{owner}/{project}"),
                    hash: None,
                    refspec: None,
                }),
                source_dir: root.join(&project),
                build_dir: root.join(format!("{project}-build")),
                build: None,
                key,
            })
        }
        Declaration::Explicit {
            owner,
            project,
            url,
            hash,
            refspec,
            build,
        } => {
            let key = format!("{owner}/{project}");
            let build_dir = root.join(format!("{project}-build"));
            let build = build
                .map(|conf| merge_defaults(conf, &build_dir, false))
                .transpose()?;
            Ok(Dependency {
                remote: Some(Remote { url, hash, refspec }),
                source_dir: root.join(&project),
                build_dir,
                build,
                key,
            })
        }
        Declaration::LocalOnly { build } => {
            let build_dir = root.join(format!("{LOCAL_KEY}-build"));
            let build = merge_defaults(build, &build_dir, true)?;
            Ok(Dependency {
                key: LOCAL_KEY.to_string(),
                remote: None,
                source_dir: project_root.to_path_buf(),
                build_dir,
                build: Some(build),
            })
        }
    }
}

fn merge_defaults(
    conf: BuildConfig,
    build_dir: &Path,
    local_source: bool,
) -> DepotResult<BuildSpec> {
    let system = conf.system.clone().unwrap_or_else(|| "cmake".to_string());
    if !KNOWN_SYSTEMS.contains(&system.as_str()) {
        return Err(DepotError::UnsupportedBuildSystem(system));
    }

    let install = match &conf.install {
        None | Some(InstallOpt::Enabled(true)) => Some(build_dir.join("install")),
        Some(InstallOpt::Enabled(false)) => None,
        Some(InstallOpt::Path(path)) => Some(path.clone()),
    };

    Ok(BuildSpec {
        system,
        install,
        options: conf.options.clone(),
        parallel: conf.parallel.unwrap_or_default(),
        dependencies: conf.dependencies.clone(),
        local_source,
        pre_build: conf.pre_build.clone(),
        post_build: conf.post_build.clone(),
        force_rebuild: conf.force_rebuild,
        declared: conf,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::DependencyEntry;

    fn roots() -> (PathBuf, PathBuf) {
        (PathBuf::from("external"), PathBuf::from("/work/project"))
    }

    #[test]
    fn shorthand_derives_paths_and_url() {
        let (root, project_root) = roots();
        let specs = vec![DependencySpec::Shorthand("fmtlib/fmt".to_string())];
        let deps = normalize_all(&specs, &root, &project_root).unwrap();

        let dep = &deps[0];
        assert_eq!(dep.key, "fmtlib/fmt");
        assert_eq!(dep.source_dir, PathBuf::from("external/fmt"));
        assert_eq!(dep.build_dir, PathBuf::from("external/fmt-build"));
        assert_eq!(
            dep.remote.as_ref().unwrap().url,
            "https://github.com/fmtlib/fmt"
        );
        assert!(dep.build.is_none());
    }

    #[test]
    fn build_defaults_merge() {
        let (root, project_root) = roots();
        let specs = vec![DependencySpec::Entry(DependencyEntry {
            github: Some("gabime/spdlog".to_string()),
            build: Some(BuildConfig::default()),
            ..Default::default()
        })];
        let deps = normalize_all(&specs, &root, &project_root).unwrap();

        let build = deps[0].build.as_ref().unwrap();
        assert_eq!(build.system, "cmake");
        assert_eq!(
            build.install,
            Some(PathBuf::from("external/spdlog-build/install"))
        );
        assert!(build.options.is_empty());
        assert!(build.dependencies.is_empty());
        assert_eq!(build.parallel, Parallel::Enabled(false));
    }

    #[test]
    fn install_false_disables_install() {
        let (root, project_root) = roots();
        let specs = vec![DependencySpec::Entry(DependencyEntry {
            github: Some("a/b".to_string()),
            build: Some(BuildConfig {
                install: Some(InstallOpt::Enabled(false)),
                ..Default::default()
            }),
            ..Default::default()
        })];
        let deps = normalize_all(&specs, &root, &project_root).unwrap();
        assert_eq!(deps[0].build.as_ref().unwrap().install, None);
    }

    #[test]
    fn local_record_uses_project_root() {
        let (root, project_root) = roots();
        let specs = vec![DependencySpec::Entry(DependencyEntry {
            build: Some(BuildConfig::default()),
            ..Default::default()
        })];
        let deps = normalize_all(&specs, &root, &project_root).unwrap();

        let dep = &deps[0];
        assert_eq!(dep.key, "local");
        assert!(dep.remote.is_none());
        assert_eq!(dep.source_dir, project_root);
        assert_eq!(dep.build_dir, PathBuf::from("external/local-build"));
        assert!(dep.build.as_ref().unwrap().local_source);
    }

    #[test]
    fn unknown_system_rejected_at_normalize_time() {
        let (root, project_root) = roots();
        let specs = vec![DependencySpec::Entry(DependencyEntry {
            github: Some("a/b".to_string()),
            build: Some(BuildConfig {
                system: Some("bazel".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        })];
        let err = normalize_all(&specs, &root, &project_root).unwrap_err();
        assert!(matches!(err, DepotError::UnsupportedBuildSystem(_)));
    }

    #[test]
    fn duplicate_keys_rejected() {
        let (root, project_root) = roots();
        let specs = vec![
            DependencySpec::Shorthand("a/b".to_string()),
            DependencySpec::Entry(DependencyEntry {
                github: Some("a/b".to_string()),
                ..Default::default()
            }),
        ];
        let err = normalize_all(&specs, &root, &project_root).unwrap_err();
        assert!(matches!(err, DepotError::Manifest { .. }));
    }
}
