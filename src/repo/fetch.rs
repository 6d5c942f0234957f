//! Clone-or-update protocol
//!
//! Each network dependency is synced by its own spawned task so
//! fetches overlap. Shallow (depth-1) fetches pull exactly the
//! resolved refspec, followed by a detached checkout of `FETCH_HEAD`.

use crate::error::{DepotError, DepotResult};
use crate::exec::{run_capture, spawn_streamed, CommandSpec};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Fetch or update `dir` to the resolved refspec.
///
/// Task body for `tokio::spawn`: failures are logged and swallowed so
/// one broken remote never aborts the concurrent fetch phase.
pub async fn sync_repo(key: String, url: String, refspec: String, dir: PathBuf) {
    if let Err(e) = try_sync(&key, &url, &refspec, &dir).await {
        warn!(dep = %key, "fetch failed: {}", e);
    }
}

async fn try_sync(key: &str, url: &str, refspec: &str, dir: &Path) -> DepotResult<()> {
    if is_present(dir) {
        update(key, refspec, dir).await
    } else {
        clone(key, url, refspec, dir).await
    }
}

fn is_present(dir: &Path) -> bool {
    dir.join(".git").exists()
}

async fn clone(key: &str, url: &str, refspec: &str, dir: &Path) -> DepotResult<()> {
    info!(dep = key, url, refspec, "cloning");

    fs::create_dir_all(dir)
        .await
        .map_err(|e| DepotError::io(format!("creating {}", dir.display()), e))?;

    git_quiet(key, dir, &["init", "--quiet"]).await?;
    git_quiet(key, dir, &["remote", "add", "origin", url]).await?;
    fetch_and_checkout(dir, refspec).await
}

async fn update(key: &str, refspec: &str, dir: &Path) -> DepotResult<()> {
    let head = current_head(key, dir).await?;
    if head == refspec {
        debug!(dep = key, %head, "already at resolved revision");
        return Ok(());
    }

    // Branch and tag refspecs never equal a HEAD SHA, so they re-fetch
    // on every run
    info!(dep = key, refspec, "updating");
    fetch_and_checkout(dir, refspec).await
}

async fn fetch_and_checkout(dir: &Path, refspec: &str) -> DepotResult<()> {
    git_streamed(dir, &["fetch", "--depth", "1", "origin", refspec]).await?;
    git_streamed(dir, &["checkout", "--detach", "FETCH_HEAD"]).await
}

async fn current_head(key: &str, dir: &Path) -> DepotResult<String> {
    let output = run_capture(
        CommandSpec::new("git")
            .args(["rev-parse", "HEAD"])
            .current_dir(dir),
    )
    .await?;
    if !output.success {
        return Err(DepotError::User(format!(
            "cannot read HEAD of {key}: {}",
            output.stderr.trim()
        )));
    }
    Ok(output.stdout.trim().to_string())
}

/// Quick setup step; captured so its output stays out of the stream
async fn git_quiet(key: &str, dir: &Path, args: &[&str]) -> DepotResult<()> {
    let spec = CommandSpec::new("git")
        .args(args.iter().copied())
        .current_dir(dir);
    let output = run_capture(spec).await?;
    if !output.success {
        return Err(DepotError::User(format!(
            "git {} failed for {key}: {}",
            args[0],
            output.stderr.trim()
        )));
    }
    Ok(())
}

/// Long-running step; streams line records to the log as they arrive
async fn git_streamed(dir: &Path, args: &[&str]) -> DepotResult<()> {
    let spec = CommandSpec::new("git")
        .args(args.iter().copied())
        .current_dir(dir);
    let handle = spawn_streamed(spec).await?;
    // Join only sequences the steps; the child's status was already
    // logged by the streaming task
    let _ = handle.await;
    Ok(())
}
