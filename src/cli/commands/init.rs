//! Initialize command.

use console::style;

use crate::config::{Config, Settings};
use crate::registry::{save_records, RecordMap};

/// Starter config written by `init`.
const STARTER_CONFIG: &str = r#"# docshelf configuration
#
# The API key is read from GOOGLE_API_KEY (or GEMINI_API_KEY), for example
# from a .env file. It is never stored here.

[analysis]
# model = "gemini-1.5-flash"
# timeout_secs = 120
# "abort" saves nothing when analysis fails; "degraded" saves the record
# with the analysis marked unavailable.
# on_failure = "abort"

[ocr]
# language = "eng"
# dpi = 300
# tools_dir = "/opt/homebrew/bin"

# Extra classifier keywords, merged into the built-in lists.
# [classifier.keywords]
# Legal = ["subpoena", "affidavit"]
"#;

/// Initialize the data directory and registry.
pub async fn cmd_init(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    if settings.registry_exists() {
        // Fail loudly on a corrupt file instead of overwriting it
        let registry = settings.open_registry()?;
        println!(
            "  {} Registry exists with {} documents",
            style("✓").green(),
            registry.len()
        );
    } else {
        save_records(&settings.registry_path, &RecordMap::new())?;
        println!(
            "  {} Created {}",
            style("✓").green(),
            settings.registry_path.display()
        );
    }

    if config.source_path.is_none() {
        let config_path = settings.data_dir.join("docshelf.toml");
        if !config_path.exists() {
            tokio::fs::write(&config_path, STARTER_CONFIG).await?;
            println!(
                "  {} Wrote starter config {}",
                style("✓").green(),
                config_path.display()
            );
        }
    }

    if config.analysis.require_api_key().is_err() {
        println!(
            "{} No API key found. Set GOOGLE_API_KEY before processing documents.",
            style("!").yellow()
        );
    }

    println!(
        "{} Initialized docshelf in {}",
        style("✓").green(),
        settings.data_dir.display()
    );

    Ok(())
}
