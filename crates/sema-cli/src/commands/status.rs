//! Status command - corpus size and backend reachability.

use anyhow::{Context, Result};
use colored::Colorize;
use tokio::runtime::Runtime;

use sema_config::Config;
use sema_core::{ComponentHealth, EmbeddingGenerator, VectorIndex};
use sema_pipeline::HealthCheck;

use super::build_components;

pub fn run() -> Result<()> {
    let config = Config::load().unwrap_or_default();
    let components = build_components(&config)?;

    println!("{}", "Sema Status".cyan().bold());
    println!("{}", "─".repeat(50));

    let rt = Runtime::new().context("Failed to create async runtime")?;

    let indexed = rt.block_on(components.index.len())?;
    println!();
    println!("{}", "Corpus".white().bold());
    println!("  {} Indexed documents: {}", "●".green(), indexed);
    println!(
        "  {} Embedding model: {} ({} dims)",
        "●".green(),
        components.embedder.model_id(),
        components.embedder.dimension()
    );

    let health = rt.block_on(
        HealthCheck::new(
            components.blob_store,
            components.index,
            components.embedder,
        )
        .check(),
    );

    println!();
    println!("{}", "Backends".white().bold());
    print_component("Blob store", health.blob_store);
    print_component("Vector index", health.vector_index);
    print_component("Embedder", health.embedder);

    if !health.is_healthy() {
        println!();
        println!(
            "{}",
            "One or more backends are unreachable; ingestion and queries may fail.".yellow()
        );
    }

    Ok(())
}

fn print_component(name: &str, health: ComponentHealth) {
    if health.is_up() {
        println!("  {} {}: up", "●".green(), name);
    } else {
        println!("  {} {}: down", "✗".red(), name);
    }
}
