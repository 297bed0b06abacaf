//! Process command: run files through the pipeline.

use std::path::PathBuf;

use console::style;

use super::helpers::spinner;
use crate::config::{Config, Settings};
use crate::pipeline::{Pipeline, Stage};
use crate::storage::Upload;

/// Process each file and register the results.
pub async fn cmd_process(
    settings: &Settings,
    config: &Config,
    files: &[PathBuf],
) -> anyhow::Result<()> {
    // Fails on a missing API key before touching anything
    let pipeline = Pipeline::from_config(settings, config)?;
    settings.ensure_directories()?;
    let mut registry = settings.open_registry()?;

    let mut failed = 0usize;
    for path in files {
        let name = path.display().to_string();
        let upload = match Upload::from_path(path) {
            Ok(u) => u,
            Err(e) => {
                println!("{} {}: {}", style("✗").red(), name, e);
                failed += 1;
                continue;
            }
        };

        let pb = spinner(format!("{}: starting", name))?;
        let progress = |stage: Stage| pb.set_message(format!("{}: {}...", name, stage.as_str()));
        let result = pipeline
            .process_with_progress(&mut registry, upload, &progress)
            .await;
        pb.finish_and_clear();

        match result {
            Ok(record) => {
                println!(
                    "{} {} -> {} ({})",
                    style("✓").green(),
                    name,
                    style(record.domain).cyan(),
                    record.id
                );
                if !record.has_analysis() {
                    println!("  {} {}", style("!").yellow(), record.analysis);
                }
            }
            Err(e) => {
                println!("{} {}: {}", style("✗").red(), name, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} files failed", failed, files.len());
    }
    println!(
        "  {} Run 'docshelf ls' to see all documents",
        style("→").dim()
    );
    Ok(())
}
