//! Revision resolution
//!
//! Determines the exact refspec to fetch for a dependency. Precedence:
//! a declared short or full commit hash (expanded against the remote
//! listing), then a declared refspec taken verbatim, then whichever of
//! `main`/`master` the remote advertises.

use crate::error::{DepotError, DepotResult};
use crate::exec::{run_capture, CommandSpec};
use tracing::debug;

/// One line of `git ls-remote` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    pub sha: String,
    pub name: String,
}

/// Resolve the refspec to fetch for `key` at `url`.
///
/// With a hash the result is a full commit SHA; with a refspec it is
/// the refspec unchanged; otherwise it is the default branch name.
pub async fn resolve(
    key: &str,
    url: &str,
    hash: Option<&str>,
    refspec: Option<&str>,
) -> DepotResult<String> {
    if let Some(hash) = hash {
        let refs = list_remote(key, url, &[]).await?;
        let sha = match_hash_prefix(&refs, hash).ok_or_else(|| {
            DepotError::resolve(key, format!("no remote ref matches hash '{hash}'"))
        })?;
        debug!(dep = key, %sha, "resolved hash");
        return Ok(sha);
    }

    if let Some(refspec) = refspec {
        // Taken verbatim; the fetch will fail if the remote lacks it
        return Ok(refspec.to_string());
    }

    let refs = list_remote(key, url, &["refs/heads/main", "refs/heads/master"]).await?;
    let branch = pick_default_branch(&refs)
        .ok_or_else(|| DepotError::resolve(key, "remote has neither main nor master"))?;
    debug!(dep = key, %branch, "resolved default branch");
    Ok(branch)
}

async fn list_remote(key: &str, url: &str, patterns: &[&str]) -> DepotResult<Vec<RemoteRef>> {
    let spec = CommandSpec::new("git")
        .arg("ls-remote")
        .arg(url)
        .args(patterns.iter().copied());
    let output = run_capture(spec).await?;
    if !output.success {
        return Err(DepotError::resolve(
            key,
            format!("git ls-remote failed: {}", output.stderr.trim()),
        ));
    }
    Ok(parse_ls_remote(&output.stdout))
}

/// Parse `git ls-remote` output, preserving listing order
fn parse_ls_remote(output: &str) -> Vec<RemoteRef> {
    output
        .lines()
        .filter_map(|line| {
            let (sha, name) = line.split_once('\t')?;
            Some(RemoteRef {
                sha: sha.trim().to_string(),
                name: name.trim().to_string(),
            })
        })
        .collect()
}

/// First listed SHA with `prefix` as prefix, expanded to the full SHA.
///
/// Ambiguous prefixes take the first match in listing order.
fn match_hash_prefix(refs: &[RemoteRef], prefix: &str) -> Option<String> {
    refs.iter()
        .find(|r| r.sha.starts_with(prefix))
        .map(|r| r.sha.clone())
}

/// Prefer `main` over `master` among the advertised heads
fn pick_default_branch(refs: &[RemoteRef]) -> Option<String> {
    for candidate in ["main", "master"] {
        let full = format!("refs/heads/{candidate}");
        if refs.iter().any(|r| r.name == full) {
            return Some(candidate.to_string());
        }
    }
    None
}
