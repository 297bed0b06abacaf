//! Classify command: dry-run classification of plain text.

use std::io::Read;

use console::style;

use crate::config::Config;

/// Classify text read from a file or stdin.
pub fn cmd_classify(config: &Config, input: &str) -> anyhow::Result<()> {
    let text = if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input)
            .map_err(|e| anyhow::anyhow!("Failed to read {} as text: {}", input, e))?
    };

    let classifier = config.classifier()?;
    match classifier.explain(&text) {
        Some((domain, keyword)) => println!(
            "{} {} (matched \"{}\")",
            style("✓").green(),
            style(domain).cyan(),
            keyword
        ),
        None => println!(
            "{} {} (no keyword matched)",
            style("✓").green(),
            style(crate::models::Domain::General).cyan()
        ),
    }
    Ok(())
}
