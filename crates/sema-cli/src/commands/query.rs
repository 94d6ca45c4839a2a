//! Query command - semantic search over the corpus.

use anyhow::{Context, Result};
use colored::Colorize;
use tokio::runtime::Runtime;

use sema_config::Config;
use sema_core::SearchQuery;
use sema_pipeline::RetrievalPipeline;

use super::{build_components, truncate};

pub fn run(query: &str, top_k: usize, full: bool) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let components = build_components(&config)?;

    let pipeline = RetrievalPipeline::new(
        components.embedder,
        components.index,
        config.pipeline.clone(),
    );

    println!(
        "{} \"{}\" {}",
        "Searching for:".cyan().bold(),
        query,
        "(meaning-based)".dimmed()
    );
    println!("{}", "─".repeat(70));

    let rt = Runtime::new().context("Failed to create async runtime")?;
    let response = rt.block_on(pipeline.search(SearchQuery::new(query, top_k)))?;

    if response.results.is_empty() {
        println!();
        println!("{}", "No results found.".dimmed());
        println!();
        println!("Tips:");
        println!("  • Try rephrasing your query");
        println!("  • Make sure documents have been ingested: {}", "sema status".cyan());
        return Ok(());
    }

    println!();
    println!(
        "Found {} result{}",
        response.total_results.to_string().green(),
        if response.total_results == 1 { "" } else { "s" }
    );
    println!();

    for result in &response.results {
        println!(
            "{} {} {} {}",
            format!("{}.", result.rank).cyan().bold(),
            result.document.filename.white().bold(),
            format!("[{}]", &result.document.id[..8]).dimmed(),
            format!("{:.0}%", result.score * 100.0).dimmed()
        );

        let content = if full {
            result.document.content.clone()
        } else {
            truncate(&result.document.content, 150)
        };
        if !content.is_empty() {
            println!("   {}", content.dimmed());
        }
        println!();
    }

    Ok(())
}
