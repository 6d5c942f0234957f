//! Sync command - fetch and build every declared dependency

use crate::cli::args::SyncArgs;
use crate::cli::commands::{load_workspace, Overrides};
use crate::config::Config;
use crate::error::DepotResult;
use crate::orchestrator::Orchestrator;
use console::style;

/// Execute the sync command
pub async fn execute(args: SyncArgs, config: &Config, overrides: &Overrides) -> DepotResult<()> {
    let workspace = load_workspace(config, overrides).await?;

    if workspace.manifest.deps.is_empty() {
        println!("{}", style("No dependencies declared").yellow());
        return Ok(());
    }

    let summary = Orchestrator::new(workspace.root, workspace.project_root)
        .force_rebuild(args.force)
        .run(&workspace.manifest.deps)
        .await?;

    println!(
        "{} {} fetched, {} built, {} up to date",
        style("Done:").green().bold(),
        summary.fetched,
        summary.built.len(),
        summary.skipped.len()
    );
    for key in &summary.built {
        println!("  {} {}", style("built").green(), key);
    }
    Ok(())
}
