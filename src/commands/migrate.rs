use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::time::Instant;

use crate::commands::{describe_classes, prepare, print_failures, run};

/// Migrate .kt files to view binding, writing changed files back
///
/// Files are written only after they migrated completely, so a failure
/// leaves the file as it was.
pub fn execute(target: &str, config_path: Option<&str>, dry_run: bool) -> Result<()> {
    let start = Instant::now();

    let session = prepare(target, config_path)?;
    if session.sources.is_empty() {
        println!("{} No .kt files found in {}", "warning:".yellow().bold(), target);
        return Ok(());
    }

    let report = run(&session);

    for (path, outcome) in &report.changed {
        if dry_run {
            println!("   {} {} {}", "Would migrate".cyan().bold(), path.display(), describe_classes(outcome).as_str().dimmed());
            continue;
        }
        fs::write(path, &outcome.source).context(format!("Failed to write {}", path.display()))?;
        println!("   {} {} {}", "Migrated".green().bold(), path.display(), describe_classes(outcome).as_str().dimmed());
    }

    print_failures(&report.failures);

    let elapsed = start.elapsed();
    println!(
        "   {} {} of {} file(s) in {:.2}s",
        if dry_run { "Found".cyan().bold() } else { "Finished".green().bold() },
        report.changed.len(),
        report.scanned,
        elapsed.as_secs_f64()
    );

    if !report.failures.is_empty() {
        anyhow::bail!("Migration failed for {} file(s)", report.failures.len());
    }

    Ok(())
}
