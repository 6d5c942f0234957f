//! Status command - show dependency and cache state without building

use crate::cache::{BuildCache, CACHE_FILE};
use crate::cli::commands::{load_workspace, Overrides};
use crate::config::Config;
use crate::error::DepotResult;
use crate::fingerprint::RefHash;
use crate::manifest::normalize_all;
use console::{style, Emoji};

static CHECK: Emoji<'_, '_> = Emoji("✓ ", "[OK] ");
static BUILD: Emoji<'_, '_> = Emoji("⟳ ", "[BUILD] ");
static WARN: Emoji<'_, '_> = Emoji("⚠ ", "[WARN] ");

/// Execute the status command
pub async fn execute(config: &Config, overrides: &Overrides) -> DepotResult<()> {
    let workspace = load_workspace(config, overrides).await?;
    let deps = normalize_all(
        &workspace.manifest.deps,
        &workspace.root,
        &workspace.project_root,
    )?;

    println!("{}", style("Depot Status").bold().cyan());
    println!();

    if deps.is_empty() {
        println!("  {} No dependencies declared", WARN);
        return Ok(());
    }

    let cache = BuildCache::load(&workspace.root.join(CACHE_FILE)).await?;

    println!("{}", style("Dependencies:").bold());
    for dep in &deps {
        let Some(spec) = &dep.build else {
            if dep.source_dir.exists() {
                println!("  {} {} (fetch only)", CHECK, dep.key);
            } else {
                println!(
                    "  {} {} {}",
                    WARN,
                    dep.key,
                    style("not fetched").yellow()
                );
            }
            continue;
        };

        if dep.remote.is_some() && !dep.source_dir.exists() {
            println!(
                "  {} {} {}",
                BUILD,
                dep.key,
                style("not fetched, will build").yellow()
            );
            continue;
        }

        let fingerprint = RefHash::compute(dep, spec)?;
        let up_to_date = cache.matches(&fingerprint)
            && dep.build_dir.exists()
            && spec.install.as_ref().is_none_or(|p| p.exists());

        if up_to_date {
            println!("  {} {} {}", CHECK, dep.key, style("up to date").green());
        } else {
            println!("  {} {} {}", BUILD, dep.key, style("will build").yellow());
        }
    }

    println!();
    println!("{}", style("Cache:").bold());
    println!(
        "  {} entries in {}",
        cache.len(),
        workspace.root.join(CACHE_FILE).display()
    );

    Ok(())
}
