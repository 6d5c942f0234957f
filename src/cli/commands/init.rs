//! Init command - create a project-local depot.toml

use crate::cli::args::InitArgs;
use crate::config::MANIFEST_FILE;
use crate::error::{DepotError, DepotResult};
use console::style;
use std::path::Path;
use tokio::fs;

/// Template for a fresh manifest
const INIT_TEMPLATE: &str = r#"# Depot dependency manifest
# Entries are fetched in parallel and built in declaration order;
# list a dependency before anything that names it in `dependencies`.

deps = [
    # Shorthand entries are fetched but not built:
    # "fmtlib/fmt",

    # Records pin a revision and carry build instructions:
    # { github = "fmtlib/fmt", refspec = "11.0.2", build = { options = ["-DFMT_TEST=OFF"] } },
    # { github = "gabime/spdlog", hash = "27cb4c7", build = { dependencies = ["fmtlib/fmt"] } },

    # A record with only a build table is the local in-tree project:
    # { build = { dependencies = ["gabime/spdlog"], parallel = true } },
]

# Downloads and build trees live here (default "external"):
# root = "external"
"#;

/// Execute the init command
pub async fn execute(args: InitArgs) -> DepotResult<()> {
    let target_dir = match args.path {
        Some(ref p) => p.clone(),
        None => {
            std::env::current_dir().map_err(|e| DepotError::io("getting current directory", e))?
        }
    };

    let manifest_path = target_dir.join(MANIFEST_FILE);

    if manifest_path.exists() && !args.force {
        return Err(DepotError::User(format!(
            "{} already exists. Use --force to overwrite.",
            manifest_path.display()
        )));
    }

    ensure_dir(&target_dir).await?;

    fs::write(&manifest_path, INIT_TEMPLATE)
        .await
        .map_err(|e| DepotError::io(format!("writing {}", manifest_path.display()), e))?;

    println!(
        "{} {}",
        style("Created manifest:").green().bold(),
        manifest_path.display()
    );

    Ok(())
}

async fn ensure_dir(dir: &Path) -> DepotResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| DepotError::io(format!("creating directory {}", dir.display()), e))?;
    }
    Ok(())
}
