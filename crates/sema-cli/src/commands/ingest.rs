//! Ingest command implementation.

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

use sema_config::Config;
use sema_core::FileOutcome;
use sema_extract::Format;
use sema_pipeline::{FileUpload, IngestionPipeline};

use super::build_components;

/// Ingest files and/or directories.
pub fn run(paths: &[String], dry_run: bool) -> Result<()> {
    if paths.is_empty() {
        anyhow::bail!("No paths given. Usage: sema ingest <file-or-directory>...");
    }

    let files = collect_files(paths)?;
    if files.is_empty() {
        println!("{}", "No supported files found.".yellow());
        return Ok(());
    }

    if dry_run {
        println!("{} {} file(s)", "Would ingest:".cyan().bold(), files.len());
        for file in &files {
            println!("  {} {}", "•".dimmed(), file.display());
        }
        return Ok(());
    }

    let config = Config::load().unwrap_or_default();
    let components = build_components(&config)?;
    let pipeline = IngestionPipeline::new(
        components.blob_store,
        components.embedder,
        components.index,
        config.pipeline.clone(),
    );

    let mut uploads = Vec::with_capacity(files.len());
    for path in &files {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = std::fs::read(path)?;
        uploads.push(FileUpload::new(filename, bytes));
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Ingesting {} file(s)", uploads.len()));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let rt = Runtime::new()?;
    let outcomes = rt.block_on(pipeline.ingest_batch(uploads));

    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    let failed = outcomes.len() - succeeded;
    pb.finish_with_message(format!(
        "{} {} succeeded, {} failed",
        "Done:".green().bold(),
        succeeded,
        failed
    ));

    println!();
    for outcome in &outcomes {
        print_outcome(outcome);
    }

    if failed > 0 {
        anyhow::bail!("{} file(s) failed to ingest", failed);
    }
    Ok(())
}

fn print_outcome(outcome: &FileOutcome) {
    match outcome {
        FileOutcome::Created(document) => {
            let searchable = document.embedding.is_some();
            println!(
                "{} {} {}",
                "✓".green(),
                document.filename.white().bold(),
                format!("[{}]", &document.id[..8]).dimmed()
            );
            if !searchable {
                println!("    {}", "no text extracted; stored but unsearchable".yellow());
            }
        }
        FileOutcome::Failed(failure) => {
            println!(
                "{} {} {}",
                "✗".red(),
                failure.filename.white().bold(),
                format!("({})", failure.kind).dimmed()
            );
            println!("    {}", failure.message.red());
            if let Some(ref orphan) = failure.orphaned_blob {
                println!(
                    "    {} orphaned blob left at {}",
                    "!".yellow(),
                    orphan
                );
            }
        }
    }
}

/// Expand the given paths into a flat list of supported files.
fn collect_files(paths: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for raw in paths {
        let path = Path::new(raw);
        if !path.exists() {
            anyhow::bail!("Path does not exist: {}", path.display());
        }

        if path.is_file() {
            // Explicitly named files are taken as-is; unsupported
            // extensions surface as per-file validation failures.
            files.push(path.to_path_buf());
            continue;
        }

        for entry in walkdir::WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
        {
            let entry_path = entry.path();

            // Skip hidden files
            if entry_path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(false)
            {
                continue;
            }

            // Only pick up supported formats when scanning directories
            let supported = entry_path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(Format::from_extension)
                .is_some();
            if supported {
                files.push(entry_path.to_path_buf());
            }
        }
    }

    Ok(files)
}
