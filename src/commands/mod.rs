pub mod check;
pub mod migrate;

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config;
use crate::migrator::{MigrationOutcome, Migrator};
use crate::project;

/// Represents the type of target we're working with
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// A directory walked for .kt files
    Directory(PathBuf),
    /// A single .kt file
    SingleFile(PathBuf),
}

/// Detect whether the target is a directory or a single file
pub fn detect_target(target: &str) -> Target {
    let path = Path::new(target);

    if target.ends_with(".kt") || path.is_file() {
        return Target::SingleFile(path.to_path_buf());
    }

    Target::Directory(path.to_path_buf())
}

/// Sources of one run plus a migrator that knows all of their classes
pub struct Session {
    pub migrator: Migrator,
    pub sources: Vec<(PathBuf, String)>,
}

/// Load the configuration, discover the files and index their classes
pub fn prepare(target: &str, config_path: Option<&str>) -> Result<Session> {
    let target = detect_target(target);
    let target_path = match &target {
        Target::Directory(path) | Target::SingleFile(path) => path.clone(),
    };

    let config = config::resolve_config(config_path.map(Path::new), &target_path)?;
    let files = project::discover_files(&target_path)?;

    let mut migrator = Migrator::new(config);
    if let Target::SingleFile(file) = &target {
        index_source_root(&mut migrator, file)?;
    }
    let mut sources = Vec::with_capacity(files.len());
    for path in files {
        let source = fs::read_to_string(&path).context(format!("Failed to read {}", path.display()))?;
        // unparsable files are reported when they are migrated
        if let Err(e) = migrator.index_source(&source) {
            debug!(file = %path.display(), error = %e, "not indexed");
        }
        sources.push((path, source));
    }

    Ok(Session { migrator, sources })
}

/// Index the classes around a single file so project base classes resolve
fn index_source_root(migrator: &mut Migrator, file: &Path) -> Result<()> {
    let source = fs::read_to_string(file).context(format!("Failed to read {}", file.display()))?;
    let root = project::source_root(file, &source);
    let neighbours = project::discover_files(&root)?;
    debug!(root = %root.display(), files = neighbours.len(), "indexing source root");

    for path in neighbours {
        let indexed = fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|source| migrator.index_source(&source).map_err(anyhow::Error::from));
        if let Err(e) = indexed {
            debug!(file = %path.display(), error = %e, "not indexed");
        }
    }
    Ok(())
}

/// What happened to the files of one run
#[derive(Debug, Default)]
pub struct RunReport {
    pub scanned: usize,
    pub changed: Vec<(PathBuf, MigrationOutcome)>,
    pub failures: Vec<(PathBuf, String)>,
}

/// Migrate every source of the session in memory
pub fn run(session: &Session) -> RunReport {
    let pb = ProgressBar::new(session.sources.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.dim} [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let mut report = RunReport::default();
    for (path, source) in &session.sources {
        pb.set_message(path.file_name().and_then(|s| s.to_str()).unwrap_or_default().to_string());
        report.scanned += 1;

        match session.migrator.migrate_source(source, &path.display().to_string()) {
            Ok(outcome) if outcome.changed => report.changed.push((path.clone(), outcome)),
            Ok(_) => {}
            Err(e) => report.failures.push((path.clone(), e.to_string())),
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    report
}

/// Print files that could not be migrated
pub fn print_failures(failures: &[(PathBuf, String)]) {
    if failures.is_empty() {
        return;
    }
    eprintln!("{} {} file(s) could not be migrated:\n", "error:".red().bold(), failures.len());
    for (file, error) in failures {
        eprintln!("  {} {}", file.display().to_string().yellow(), error);
    }
}

/// `MainActivity (activity), HomeFragment (fragment)`
pub fn describe_classes(outcome: &MigrationOutcome) -> String {
    outcome
        .classes
        .iter()
        .filter(|c| c.migrated)
        .map(|c| format!("{} ({})", c.name, c.role.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}
