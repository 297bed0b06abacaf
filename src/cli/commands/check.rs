//! Check command: verify the environment is ready for processing.

use console::style;

use crate::config::{Config, Settings};
use crate::ocr::TesseractExtractor;
use crate::registry::RegistryError;

/// What the registry file holds.
#[derive(Debug, PartialEq, Eq)]
struct RegistryHealth {
    documents: usize,
    /// Records whose stored upload is gone.
    missing_files: usize,
}

fn registry_health(settings: &Settings) -> Result<RegistryHealth, RegistryError> {
    let registry = settings.open_registry()?;
    let missing_files = registry
        .list(None)
        .iter()
        .filter(|r| !r.stored_path.exists())
        .count();
    Ok(RegistryHealth {
        documents: registry.len(),
        missing_files,
    })
}

/// Check tools, credential and registry.
pub fn cmd_check(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    let mut problems = 0usize;

    println!("\n{}", style("External Tools").bold());
    println!("{}", "-".repeat(40));
    let extractor = TesseractExtractor::new(config.ocr.clone());
    let searched = match &config.ocr.tools_dir {
        Some(dir) => dir.display().to_string(),
        None => "PATH".to_string(),
    };
    for (tool, found) in extractor.check_tools() {
        if found {
            println!("  {} {}", style("✓").green(), tool);
        } else {
            println!("  {} {} not found in {}", style("✗").red(), tool, searched);
            problems += 1;
        }
    }

    println!("\n{}", style("Analysis").bold());
    println!("{}", "-".repeat(40));
    println!("  {:<14} {}", "Endpoint:", config.analysis.endpoint);
    println!("  {:<14} {}", "Model:", config.analysis.model);
    println!("  {:<14} {:?}", "On failure:", config.analysis.on_failure);
    match config.analysis.require_api_key() {
        Ok(_) => println!("  {} API key configured", style("✓").green()),
        Err(e) => {
            println!("  {} {}", style("✗").red(), e);
            problems += 1;
        }
    }

    println!("\n{}", style("Registry").bold());
    println!("{}", "-".repeat(40));
    if let Some(path) = &config.source_path {
        println!("  {:<14} {}", "Config:", path.display());
    }
    println!("  {:<14} {}", "Path:", settings.registry_path.display());
    if !settings.registry_exists() {
        println!(
            "  {} Not created yet (run 'docshelf init')",
            style("!").yellow()
        );
    } else {
        match registry_health(settings) {
            Ok(health) => {
                println!("  {} {} documents", style("✓").green(), health.documents);
                if health.missing_files > 0 {
                    println!(
                        "  {} {} records point at missing files",
                        style("!").yellow(),
                        health.missing_files
                    );
                }
            }
            Err(e) => {
                println!("  {} {}", style("✗").red(), e);
                problems += 1;
            }
        }
    }

    if problems > 0 {
        anyhow::bail!("{} check(s) failed", problems);
    }
    println!("\n{} Ready", style("✓").green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::record;
    use crate::models::Domain;
    use crate::registry::{save_records, RecordMap};
    use tempfile::tempdir;

    #[test]
    fn test_registry_health_counts_missing_files() {
        let dir = tempdir().unwrap();
        let settings = Settings::with_data_dir(dir.path().to_path_buf());
        settings.ensure_directories().unwrap();

        let mut present = record("present", Domain::Finance, 1);
        present.stored_path = settings.uploads_dir.join("present.png");
        std::fs::write(&present.stored_path, b"png").unwrap();
        let gone = record("gone", Domain::Legal, 2);

        let records: RecordMap = [present, gone]
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect();
        save_records(&settings.registry_path, &records).unwrap();

        assert_eq!(
            registry_health(&settings).unwrap(),
            RegistryHealth {
                documents: 2,
                missing_files: 1,
            }
        );
    }

    #[test]
    fn test_registry_health_reports_corrupt_file() {
        let dir = tempdir().unwrap();
        let settings = Settings::with_data_dir(dir.path().to_path_buf());
        settings.ensure_directories().unwrap();
        std::fs::write(&settings.registry_path, "[{\"filename\": \"old.pdf\"}]").unwrap();

        let err = registry_health(&settings).unwrap_err();
        assert!(matches!(err, RegistryError::Corrupt { .. }));
    }
}
