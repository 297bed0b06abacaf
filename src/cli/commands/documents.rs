//! Document listing, detail and removal commands.

use console::style;

use super::helpers::{open_registry, resolve_id, truncate};
use super::ListFormat;
use crate::config::Settings;
use crate::models::Domain;

/// List registered documents.
pub fn cmd_ls(settings: &Settings, domain: Option<Domain>, format: ListFormat) -> anyhow::Result<()> {
    let registry = open_registry(settings)?;
    let documents = registry.list(domain);

    match format {
        ListFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&documents)?);
        }
        ListFormat::Ids => {
            for doc in &documents {
                println!("{}", doc.id);
            }
        }
        ListFormat::Table => {
            if documents.is_empty() {
                println!("{} No documents found", style("!").yellow());
                return Ok(());
            }

            println!(
                "\n{:<36}  {:<30}  {:<10}  {:<16}  Summary",
                "ID", "File", "Domain", "Processed"
            );
            println!("{}", "-".repeat(120));

            for doc in &documents {
                println!(
                    "{:<36}  {:<30}  {:<10}  {:<16}  {}",
                    truncate(&doc.id, 36),
                    truncate(&doc.original_filename, 30),
                    doc.domain,
                    doc.created_at.format("%Y-%m-%d %H:%M"),
                    doc.summary_excerpt(40)
                );
            }

            println!("\n{} documents", documents.len());
        }
    }

    Ok(())
}

/// Show one document.
pub fn cmd_show(settings: &Settings, query: &str, show_text: bool) -> anyhow::Result<()> {
    let registry = open_registry(settings)?;
    let id = resolve_id(&registry, query)?;
    let Some(doc) = registry.get(&id) else {
        anyhow::bail!("Document not found: {}", query);
    };

    println!("\n{}", style("Document Info").bold());
    println!("{}", "=".repeat(60));
    println!("{:<18} {}", "ID:", doc.id);
    println!("{:<18} {}", "File:", doc.original_filename);
    println!("{:<18} {}", "Domain:", doc.domain);
    println!("{:<18} {}", "MIME Type:", doc.mime_type);
    if let Some(pages) = doc.page_count {
        println!("{:<18} {}", "Pages:", pages);
    }
    println!("{:<18} {}", "Stored At:", doc.stored_path.display());
    println!("{:<18} {}", "Content Hash:", &doc.content_hash[..16.min(doc.content_hash.len())]);
    println!(
        "{:<18} {}",
        "Processed:",
        doc.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("{:<18} {}", "Analysis:", doc.analysis_status.as_str());
    if let Some(model) = &doc.model {
        println!("{:<18} {}", "Model:", model);
    }

    if doc.has_analysis() {
        println!("\n{}", style("Summary").bold());
        println!("{}", "-".repeat(60));
        println!("{}", doc.summary);
    }

    println!("\n{}", style("Analysis").bold());
    println!("{}", "-".repeat(60));
    println!("{}", doc.analysis);

    if show_text {
        println!("\n{}", style("Extracted Text").bold());
        println!("{}", "-".repeat(60));
        println!("{}", doc.extracted_text);
    }

    Ok(())
}

/// Remove a document.
pub fn cmd_rm(settings: &Settings, query: &str, keep_file: bool) -> anyhow::Result<()> {
    let mut registry = open_registry(settings)?;
    let id = resolve_id(&registry, query)?;

    match registry.remove(&id, !keep_file)? {
        Some(doc) => {
            println!(
                "{} Removed {} ({})",
                style("✓").green(),
                doc.id,
                doc.original_filename
            );
            if keep_file {
                println!("  Kept {}", doc.stored_path.display());
            }
        }
        None => anyhow::bail!("Document not found: {}", query),
    }
    Ok(())
}
