pub mod bindings;
pub mod call_site;
pub mod classifier;
pub mod defaults;
pub mod dispatcher;
pub mod error;
pub mod inflater;
pub mod inserter;
pub mod lifecycle;
pub mod naming;
pub mod parser;
pub mod tree;

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::config::Config;
use bindings::{ConventionResolver, LayoutResolver};
use classifier::{ClassHierarchy, Classifier, Role};
use dispatcher::{CustomCaseHandler, MigrationContext, SkipCustomCases};
pub use error::{MigrationError, Result};

/// Result of migrating one source file
#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    pub source: String,
    pub changed: bool,
    pub classes: Vec<ClassReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassReport {
    pub name: String,
    pub role: Role,
    pub special_case: bool,
    pub migrated: bool,
}

/// Migrates Kotlin sources from synthetic view access to view binding
///
/// The configuration is fixed at construction. Classes of other files can be
/// registered with [`Migrator::index_source`] so that project base classes
/// (`BaseFragment : Fragment()`) are recognized across files.
pub struct Migrator {
    config: Config,
    resolver: Box<dyn LayoutResolver>,
    custom_cases: Box<dyn CustomCaseHandler>,
    hierarchy: ClassHierarchy,
}

impl Migrator {
    pub fn new(config: Config) -> Self {
        let resolver = ConventionResolver::from_config(&config.bindings);
        Migrator {
            config,
            resolver: Box::new(resolver),
            custom_cases: Box::new(SkipCustomCases),
            hierarchy: ClassHierarchy::new(),
        }
    }

    pub fn with_resolver(mut self, resolver: Box<dyn LayoutResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_custom_case_handler(mut self, handler: Box<dyn CustomCaseHandler>) -> Self {
        self.custom_cases = handler;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register the classes declared in `source`
    pub fn index_source(&mut self, source: &str) -> Result<()> {
        let tree = parser::parse_file(source)?;
        self.hierarchy.add_tree(&tree);
        Ok(())
    }

    pub fn migrate_file(&self, path: &Path) -> Result<MigrationOutcome> {
        let source = fs::read_to_string(path).map_err(|source| MigrationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.migrate_source(&source, &path.display().to_string())
    }

    /// Migrate every top-level class of one file
    ///
    /// Files without synthetic imports, or without a class that needs
    /// migrating, come back unchanged.
    pub fn migrate_source(&self, source: &str, label: &str) -> Result<MigrationOutcome> {
        let mut tree = parser::parse_file(source)?;
        let unchanged = |classes: Vec<ClassReport>| MigrationOutcome {
            source: source.to_string(),
            changed: false,
            classes,
        };

        let imports = bindings::synthetic_imports(&tree, &self.config.markers.synthetic_import);
        if imports.is_empty() {
            debug!(file = label, "no synthetic imports");
            return Ok(unchanged(Vec::new()));
        }
        let names = bindings::discover_bindings(&imports, self.resolver.as_ref());

        let mut hierarchy = self.hierarchy.clone();
        hierarchy.add_tree(&tree);
        let classifier = Classifier::new(&self.config.roles, &hierarchy);

        let ctx = MigrationContext {
            config: &self.config,
            resolver: self.resolver.as_ref(),
            custom_cases: self.custom_cases.as_ref(),
        };

        let mut classes = Vec::new();
        for class in tree.classes() {
            let classification = classifier.classify(&tree, class);
            let name = tree.name(class).unwrap_or_default().to_string();
            let migrated = dispatcher::process(&ctx, &mut tree, class, classification, &names)?;
            if migrated {
                info!(file = label, class = %name, role = classification.role.as_str(), "migrated");
            }
            classes.push(ClassReport {
                name,
                role: classification.role,
                special_case: classification.special_case,
                migrated,
            });
        }

        if !classes.iter().any(|c| c.migrated) {
            return Ok(unchanged(classes));
        }

        if self.config.bindings.rewrite_imports {
            let package = self
                .config
                .bindings
                .package
                .clone()
                .or_else(|| bindings::file_package(&tree).map(|p| format!("{}.databinding", p)));
            bindings::rewrite_imports(&mut tree, &imports, &names, package.as_deref());
        }

        let rendered = tree.render();
        Ok(MigrationOutcome {
            changed: rendered != source,
            source: rendered,
            classes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIVITY: &str = r#"package com.example.app

import android.os.Bundle
import kotlinx.android.synthetic.main.activity_main.*

class MainActivity : BaseActivity() {
    override fun onCreate(savedInstanceState: Bundle?) {
        super.onCreate(savedInstanceState)
        setContentView(R.layout.activity_main)
    }
}
"#;

    #[test]
    fn test_base_classes_from_other_files() {
        let migrator = Migrator::new(Config::default());
        let outcome = migrator.migrate_source(ACTIVITY, "MainActivity.kt").unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.classes[0].role, Role::Unhandled);

        let mut migrator = Migrator::new(Config::default());
        migrator
            .index_source("abstract class BaseActivity : AppCompatActivity()\n")
            .unwrap();
        let outcome = migrator.migrate_source(ACTIVITY, "MainActivity.kt").unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.classes[0].role, Role::ScreenContainer);
        assert!(outcome.source.contains("import com.example.app.databinding.ActivityMainBinding\n"));
        assert!(!outcome.source.contains("kotlinx.android.synthetic"));
    }

    #[test]
    fn test_file_without_synthetic_imports_is_untouched() {
        let source = "class MainActivity : AppCompatActivity() {\n}\n";
        let outcome = Migrator::new(Config::default()).migrate_source(source, "a.kt").unwrap();
        assert!(!outcome.changed);
        assert!(outcome.classes.is_empty());
        assert_eq!(outcome.source, source);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = Migrator::new(Config::default())
            .migrate_source("class A {\n", "a.kt")
            .unwrap_err();
        assert!(matches!(err, MigrationError::Parse { .. }));
    }

    #[test]
    fn test_imports_kept_when_disabled() {
        let mut config = Config::default();
        config.bindings.rewrite_imports = false;
        let mut migrator = Migrator::new(config);
        migrator.index_source("open class BaseActivity : Activity()\n").unwrap();

        let outcome = migrator.migrate_source(ACTIVITY, "a.kt").unwrap();
        assert!(outcome.changed);
        assert!(outcome.source.contains("import kotlinx.android.synthetic.main.activity_main.*\n"));
        assert!(outcome.source.contains("setContentView(binding.root)"));
    }

    #[test]
    fn test_migrate_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Migrator::new(Config::default())
            .migrate_file(&dir.path().join("Missing.kt"))
            .unwrap_err();
        assert!(matches!(err, MigrationError::Io { .. }));
    }
}
