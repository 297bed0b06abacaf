//! Shared helper functions for CLI commands.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Settings;
use crate::registry::Registry;

/// Open the registry, pointing at `init` when nothing has been set up yet.
pub fn open_registry(settings: &Settings) -> anyhow::Result<Registry> {
    if !settings.registry_exists() && !settings.data_dir.exists() {
        anyhow::bail!(
            "No data directory at {}. Run 'docshelf init' first.",
            settings.data_dir.display()
        );
    }
    Ok(settings.open_registry()?)
}

/// Resolve a full id from an exact id or a unique prefix.
pub fn resolve_id(registry: &Registry, query: &str) -> anyhow::Result<String> {
    if registry.contains(query) {
        return Ok(query.to_string());
    }

    let matches: Vec<&str> = registry
        .records()
        .keys()
        .filter(|id| id.starts_with(query))
        .map(String::as_str)
        .collect();

    match matches.as_slice() {
        [] => anyhow::bail!("Document not found: {}", query),
        [id] => Ok(id.to_string()),
        many => anyhow::bail!(
            "'{}' matches {} documents: {}",
            query,
            many.len(),
            many.join(", ")
        ),
    }
}

/// Spinner with the standard style.
pub fn spinner(message: String) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// Truncate a string for table display.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}
