use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::commands::{prepare, print_failures, run};

/// Report .kt files that still use synthetic view access
///
/// Nothing is written. Fails when any file would change or cannot be
/// migrated.
pub fn execute(target: &str, config_path: Option<&str>) -> Result<()> {
    let start = Instant::now();

    let session = prepare(target, config_path)?;
    if session.sources.is_empty() {
        println!("{} No .kt files found in {}", "warning:".yellow().bold(), target);
        return Ok(());
    }

    let report = run(&session);

    for (path, _) in &report.changed {
        println!("   {} {}", "Needs migration".yellow().bold(), path.display());
    }
    print_failures(&report.failures);

    let elapsed = start.elapsed();

    if !report.changed.is_empty() || !report.failures.is_empty() {
        anyhow::bail!(
            "{} file(s) need migration, {} failed",
            report.changed.len(),
            report.failures.len()
        );
    }

    println!(
        "   {} {} file(s) in {:.2}s",
        "Checked".green().bold(),
        report.scanned,
        elapsed.as_secs_f64()
    );

    Ok(())
}
