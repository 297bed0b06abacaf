//! Report command.

use console::style;

use super::helpers::open_registry;
use super::ReportFormat;
use crate::config::Settings;
use crate::reporting::Report;

/// Widest bar in the per-day table.
const BAR_WIDTH: u64 = 40;

/// Print counts per domain and per day.
pub fn cmd_report(settings: &Settings, format: ReportFormat) -> anyhow::Result<()> {
    let registry = open_registry(settings)?;
    let report = Report::from_registry(&registry);

    if format == ReportFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n{}", style("Documents by Domain").bold());
    println!("{}", "-".repeat(40));
    for count in &report.by_domain {
        println!("{:<20} {:>8}", count.domain, count.count);
    }
    println!("{:<20} {:>8}", style("Total").bold(), report.total);

    println!("\n{}", style("Documents by Day").bold());
    println!("{}", "-".repeat(40));
    if report.timeline.is_empty() {
        println!("  Nothing processed yet");
        return Ok(());
    }

    let max = report.max_daily().max(1);
    for bucket in &report.timeline {
        let width = (bucket.count * BAR_WIDTH).div_ceil(max) as usize;
        println!(
            "{}  {:>5}  {}",
            bucket.date,
            bucket.count,
            style("#".repeat(width)).cyan()
        );
    }

    Ok(())
}
