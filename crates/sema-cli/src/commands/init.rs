//! Initialize sema.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use sema_config::Config;
use sema_index::SqliteVectorIndex;

pub fn run() -> Result<()> {
    let config = Config::load().unwrap_or_default();
    let paths = get_paths(&config)?;

    // Check if already initialized
    if paths.is_initialized() {
        println!("{} Sema is already initialized.", "Note:".yellow().bold());
        println!("  Config: {}", paths.config_file.display());
        println!("  Data: {}", paths.data_dir.display());
        return Ok(());
    }

    println!("{}", "Initializing sema...".cyan().bold());

    // Create directories
    paths.ensure_dirs().context("Failed to create directories")?;
    println!("  {} Created directories", "✓".green());

    // Create config file
    Config::create_default_file(&paths.config_file).context("Failed to create config file")?;
    println!(
        "  {} Created config: {}",
        "✓".green(),
        paths.config_file.display()
    );

    // Create the vector index pinned to the configured model
    let _index = SqliteVectorIndex::open(
        &paths.index_file,
        &config.embedding.model,
        config.embedding.dimension,
    )
    .context("Failed to initialize vector index")?;
    println!(
        "  {} Created index: {}",
        "✓".green(),
        paths.index_file.display()
    );

    println!();
    println!("{}", "Sema initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Ingest documents: {}", "sema ingest ./docs".cyan());
    println!(
        "  2. Search them: {}",
        "sema query \"what am I looking for\"".cyan()
    );
    println!("  3. Check status: {}", "sema status".cyan());

    Ok(())
}
