use anyhow::{Context, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories that never hold sources worth migrating
const SKIPPED_DIRS: &[&str] = &[".git", ".gradle", ".idea", "build"];

/// Discover the Kotlin sources under `target`
///
/// A file target is returned as is. A directory is walked recursively,
/// honouring the `.gitignore` at its root. Results are sorted.
pub fn discover_files(target: &Path) -> Result<Vec<PathBuf>> {
    if !target.exists() {
        anyhow::bail!("Path not found: {}", target.display());
    }

    if target.is_file() {
        if !is_kotlin_file(target) {
            anyhow::bail!("File must have .kt extension: {}", target.display());
        }
        return Ok(vec![target.to_path_buf()]);
    }

    let gitignore = load_gitignore(target);
    let mut files = Vec::new();

    let walker = WalkDir::new(target)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let is_dir = entry.file_type().is_dir();
            let skipped = is_dir
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| SKIPPED_DIRS.contains(&name));
            !skipped && !gitignore.matched(entry.path(), is_dir).is_ignore()
        });

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", target.display()))?;
        let path = entry.path();
        if entry.file_type().is_file() && is_kotlin_file(path) {
            files.push(path.to_path_buf());
        }
    }

    // Sort for consistent output
    files.sort();
    Ok(files)
}

/// Directory a file's package path is rooted in
///
/// `src/main/java/com/example/home/HomeFragment.kt` declaring
/// `package com.example.home` gives `src/main/java`. When the directories do
/// not mirror the package, the file's own directory is used.
pub fn source_root(file: &Path, source: &str) -> PathBuf {
    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let Some(package) = source
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("package "))
    else {
        return dir;
    };

    let mut root = dir.as_path();
    for segment in package.trim().trim_end_matches(';').split('.').rev() {
        if root.file_name().and_then(|name| name.to_str()) != Some(segment.trim()) {
            return dir;
        }
        match root.parent() {
            Some(parent) => root = parent,
            None => return dir,
        }
    }
    if root.as_os_str().is_empty() {
        return PathBuf::from(".");
    }
    root.to_path_buf()
}

fn is_kotlin_file(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("kt")
}

/// Load gitignore from the directory if it exists
fn load_gitignore(dir: &Path) -> Gitignore {
    let gitignore_path = dir.join(".gitignore");
    let mut builder = GitignoreBuilder::new(dir);

    if gitignore_path.exists() {
        let _ = builder.add(&gitignore_path);
    }

    builder.build().unwrap_or_else(|_| Gitignore::empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "class A\n").unwrap();
    }

    #[test]
    fn test_source_root_follows_package() {
        let file = Path::new("app/src/main/java/com/example/home/HomeFragment.kt");
        assert_eq!(
            source_root(file, "package com.example.home\n\nclass HomeFragment"),
            PathBuf::from("app/src/main/java")
        );
        assert_eq!(
            source_root(file, "package com.other.home\n"),
            PathBuf::from("app/src/main/java/com/example/home")
        );
        assert_eq!(source_root(file, "class HomeFragment\n"), PathBuf::from("app/src/main/java/com/example/home"));
        assert_eq!(source_root(Path::new("Main.kt"), "class Main\n"), PathBuf::from("."));
    }

    #[test]
    fn test_discovers_kotlin_files_sorted() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "app/src/main/java/b/B.kt");
        touch(temp.path(), "app/src/main/java/a/A.kt");
        touch(temp.path(), "app/src/main/res/layout/activity_main.xml");
        touch(temp.path(), "app/build/generated/C.kt");

        let files = discover_files(temp.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(temp.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["app/src/main/java/a/A.kt", "app/src/main/java/b/B.kt"]);
    }

    #[test]
    fn test_respects_gitignore() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".gitignore"), "generated/\nLegacy.kt\n").unwrap();
        touch(temp.path(), "src/Main.kt");
        touch(temp.path(), "src/Legacy.kt");
        touch(temp.path(), "generated/Gen.kt");

        let files = discover_files(temp.path()).unwrap();
        assert_eq!(files, vec![temp.path().join("src/Main.kt")]);
    }

    #[test]
    fn test_single_file_target() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Main.kt");
        touch(temp.path(), "notes.txt");

        assert_eq!(discover_files(&temp.path().join("Main.kt")).unwrap(), vec![temp.path().join("Main.kt")]);
        assert!(discover_files(&temp.path().join("notes.txt")).is_err());
        assert!(discover_files(&temp.path().join("Missing.kt")).is_err());
    }
}
