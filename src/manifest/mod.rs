//! Dependency manifest
//!
//! `depot.toml` holds an ordered `deps` array mixing GitHub shorthand
//! strings with structured records. Each entry is discriminated once,
//! at parse time, into a [`Declaration`].

mod normalize;

pub use normalize::{
    normalize_all, BuildSpec, Dependency, Remote, LOCAL_KEY, LOCAL_SOURCE_DIR,
};

use crate::error::{DepotError, DepotResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Project manifest: the ordered dependency list plus an optional
/// download-root override
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub root: Option<PathBuf>,
    pub deps: Vec<DependencySpec>,
}

impl Manifest {
    /// Load and parse a manifest file
    pub async fn load(path: &Path) -> DepotResult<Self> {
        if !path.exists() {
            return Err(DepotError::ManifestNotFound(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| DepotError::io(format!("reading {}", path.display()), e))?;
        Ok(toml::from_str(&raw)?)
    }
}

/// One declared dependency, as written
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    /// GitHub shorthand, `"owner/project"`
    Shorthand(String),
    /// Structured record
    Entry(DependencyEntry),
}

/// Structured dependency record
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DependencyEntry {
    /// GitHub shorthand slot, `"owner/project"`
    pub github: Option<String>,
    /// Explicit repository URL
    pub url: Option<String>,
    /// Commit SHA or unique prefix to pin
    pub hash: Option<String>,
    /// Branch, tag, or other refspec
    pub refspec: Option<String>,
    pub build: Option<BuildConfig>,
}

/// Declared build instructions, before defaults are merged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub system: Option<String>,
    pub install: Option<InstallOpt>,
    pub options: Vec<String>,
    pub parallel: Option<Parallel>,
    pub dependencies: Vec<String>,
    pub pre_build: Option<String>,
    pub post_build: Option<String>,
    pub force_rebuild: bool,
}

/// `install = true/false` or an explicit install path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InstallOpt {
    Enabled(bool),
    Path(PathBuf),
}

/// `parallel = true` (tool-chosen job count) or `parallel = N`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Parallel {
    Enabled(bool),
    Jobs(u32),
}

impl Default for Parallel {
    fn default() -> Self {
        Self::Enabled(false)
    }
}

/// A dependency declaration with its shape decided
#[derive(Debug, Clone)]
pub enum Declaration {
    /// `"owner/project"`: fetch only, canonical GitHub URL
    Shorthand { owner: String, project: String },
    /// Record with a url or shorthand slot
    Explicit {
        owner: String,
        project: String,
        url: String,
        hash: Option<String>,
        refspec: Option<String>,
        build: Option<BuildConfig>,
    },
    /// Record with neither, denoting the local in-tree project
    LocalOnly { build: BuildConfig },
}

impl DependencySpec {
    /// Decide the declaration shape; `index` is the zero-based manifest
    /// position, used to name malformed entries
    pub fn discriminate(&self, index: usize) -> DepotResult<Declaration> {
        match self {
            Self::Shorthand(slug) => {
                let (owner, project) = split_slug(slug)
                    .ok_or_else(|| DepotError::manifest(slug, "expected \"owner/project\""))?;
                Ok(Declaration::Shorthand { owner, project })
            }
            Self::Entry(entry) => entry.discriminate(index),
        }
    }
}

impl DependencyEntry {
    fn discriminate(&self, index: usize) -> DepotResult<Declaration> {
        if self.github.is_none() && self.url.is_none() {
            return match &self.build {
                Some(build) => Ok(Declaration::LocalOnly {
                    build: build.clone(),
                }),
                None => Err(DepotError::manifest(
                    format!("dependency #{}", index + 1),
                    "record has no url, no shorthand, and no build table",
                )),
            };
        }

        let (owner, project) = match &self.github {
            Some(slug) => split_slug(slug)
                .ok_or_else(|| DepotError::manifest(slug, "expected \"owner/project\""))?,
            None => {
                let url = self.url.as_deref().expect("url present");
                slug_from_url(url).ok_or_else(|| {
                    DepotError::manifest(url, "cannot derive owner/project from url")
                })?
            }
        };

        let url = self
            .url
            .clone()
            .unwrap_or_else(|| github_url(&owner, &project));

        Ok(Declaration::Explicit {
            owner,
            project,
            url,
            hash: self.hash.clone(),
            refspec: self.refspec.clone(),
            build: self.build.clone(),
        })
    }
}

fn github_url(owner: &str, project: &str) -> String {
    format!("https://github.com/{owner}/{project}")
}

fn split_slug(slug: &str) -> Option<(String, String)> {
    let (owner, project) = slug.split_once('/')?;
    if owner.is_empty() || project.is_empty() || project.contains('/') {
        return None;
    }
    Some((owner.to_string(), project.to_string()))
}

/// Derive `owner/project` from a repository URL's trailing path
fn slug_from_url(url: &str) -> Option<(String, String)> {
    let trimmed = url.trim_end_matches('/').trim_end_matches(".git");
    let mut segments = trimmed
        .split(['/', ':'])
        .filter(|s| !s.is_empty())
        .rev();
    let project = segments.next()?;
    let owner = segments.next()?;
    if owner.contains('.') {
        // Bare "host.tld/project" URLs have no owner segment
        return None;
    }
    Some((owner.to_string(), project.to_string()))
}
