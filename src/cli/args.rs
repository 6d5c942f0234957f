//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Depot - source dependency fetch-and-build orchestrator
///
/// Fetches pinned git dependencies in parallel, builds them through
/// cmake, make, or meson, and skips builds whose fingerprint is
/// unchanged.
#[derive(Parser, Debug)]
#[command(name = "depot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DEPOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Manifest file path (default: depot.toml)
    #[arg(short, long, global = true)]
    pub manifest: Option<PathBuf>,

    /// Download root (default: external/)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch and build every declared dependency
    Sync(SyncArgs),

    /// Show dependency and cache state without building
    Status,

    /// Initialize a project-local depot.toml manifest
    Init(InitArgs),
}

/// Arguments for the sync command
#[derive(Parser, Debug)]
pub struct SyncArgs {
    /// Rebuild everything, ignoring the fingerprint cache
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    pub path: Option<PathBuf>,

    /// Overwrite an existing manifest
    #[arg(long)]
    pub force: bool,
}
