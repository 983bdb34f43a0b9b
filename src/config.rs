use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::migrator::defaults;

/// File name looked up next to the migration target
pub const CONFIG_FILE: &str = "viewbinding.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub roles: RolesConfig,
    #[serde(default)]
    pub markers: MarkersConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,
    #[serde(default)]
    pub bindings: BindingsConfig,
}

/// Base classes that decide which migration a class gets
#[derive(Debug, Clone, Deserialize)]
pub struct RolesConfig {
    #[serde(default = "default_activities")]
    pub activities: Vec<String>,
    #[serde(default = "default_fragments")]
    pub fragments: Vec<String>,
    #[serde(default = "default_views")]
    pub views: Vec<String>,
    /// Base classes whose subclasses need hand-written handling
    #[serde(default)]
    pub special_cases: Vec<String>,
}

impl Default for RolesConfig {
    fn default() -> Self {
        Self {
            activities: default_activities(),
            fragments: default_fragments(),
            views: default_views(),
            special_cases: Vec::new(),
        }
    }
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn default_activities() -> Vec<String> {
    to_strings(defaults::ACTIVITY_FAMILY)
}

fn default_fragments() -> Vec<String> {
    to_strings(defaults::FRAGMENT_FAMILY)
}

fn default_views() -> Vec<String> {
    to_strings(defaults::VIEW_FAMILY)
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkersConfig {
    #[serde(default = "default_content_view")]
    pub content_view: String,
    #[serde(default = "default_content_view_callee")]
    pub content_view_callee: String,
    #[serde(default = "default_layout_inflater")]
    pub layout_inflater: String,
    #[serde(default = "default_view_inflater")]
    pub view_inflater: String,
    #[serde(default = "default_layout_resource")]
    pub layout_resource: String,
    #[serde(default = "default_synthetic_import")]
    pub synthetic_import: String,
}

impl Default for MarkersConfig {
    fn default() -> Self {
        Self {
            content_view: default_content_view(),
            content_view_callee: default_content_view_callee(),
            layout_inflater: default_layout_inflater(),
            view_inflater: default_view_inflater(),
            layout_resource: default_layout_resource(),
            synthetic_import: default_synthetic_import(),
        }
    }
}

fn default_content_view() -> String {
    defaults::SET_CONTENT_VIEW_PREFIX.to_string()
}

fn default_content_view_callee() -> String {
    defaults::SET_CONTENT_VIEW_CALLEE.to_string()
}

fn default_layout_inflater() -> String {
    defaults::LAYOUT_INFLATER_PREFIX.to_string()
}

fn default_view_inflater() -> String {
    defaults::VIEW_INFLATER_PREFIX.to_string()
}

fn default_layout_resource() -> String {
    defaults::LAYOUT_RESOURCE_PREFIX.to_string()
}

fn default_synthetic_import() -> String {
    defaults::SYNTHETIC_IMPORT_PREFIX.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesConfig {
    #[serde(default = "default_on_create_view")]
    pub on_create_view: String,
    #[serde(default = "default_on_destroy_view")]
    pub on_destroy_view: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            on_create_view: default_on_create_view(),
            on_destroy_view: default_on_destroy_view(),
        }
    }
}

fn default_on_create_view() -> String {
    defaults::ON_CREATE_VIEW_TEMPLATE.to_string()
}

fn default_on_destroy_view() -> String {
    defaults::ON_DESTROY_VIEW_TEMPLATE.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct BindingsConfig {
    /// Package of the generated binding classes. Derived from the file's
    /// package (`<package>.databinding`) when absent
    pub package: Option<String>,
    #[serde(default = "default_binding_suffix")]
    pub suffix: String,
    /// Layout name -> binding class name, for layouts that do not follow
    /// the generator's naming convention
    #[serde(default)]
    pub layouts: BTreeMap<String, String>,
    #[serde(default = "default_rewrite_imports")]
    pub rewrite_imports: bool,
}

impl Default for BindingsConfig {
    fn default() -> Self {
        Self {
            package: None,
            suffix: default_binding_suffix(),
            layouts: BTreeMap::new(),
            rewrite_imports: default_rewrite_imports(),
        }
    }
}

fn default_binding_suffix() -> String {
    defaults::BINDING_SUFFIX.to_string()
}

fn default_rewrite_imports() -> bool {
    true
}

/// Load and parse a viewbinding.toml configuration file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::anyhow!("could not find `{}`", path.display())
        } else {
            anyhow::anyhow!("failed to read `{}`: {}", path.display(), e)
        }
    })?;

    parse_config(&content).map_err(|e| anyhow::anyhow!("failed to parse `{}`: {}", path.display(), e))
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Explicit `--config` path, else viewbinding.toml next to the target, else defaults
pub fn resolve_config(explicit: Option<&Path>, target: &Path) -> Result<Config> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    match find_config(target) {
        Some(path) => load_config(&path),
        None => Ok(Config::default()),
    }
}

fn find_config(target: &Path) -> Option<PathBuf> {
    let dir = if target.is_dir() { target } else { target.parent()? };
    let candidate = dir.join(CONFIG_FILE);
    candidate.exists().then_some(candidate)
}

fn validate(config: &Config) -> Result<()> {
    if let Some(package) = &config.bindings.package {
        validate_package_name(package)?;
    }

    let markers = &config.markers;
    for (name, value) in [
        ("content_view", &markers.content_view),
        ("content_view_callee", &markers.content_view_callee),
        ("layout_inflater", &markers.layout_inflater),
        ("view_inflater", &markers.view_inflater),
        ("layout_resource", &markers.layout_resource),
        ("synthetic_import", &markers.synthetic_import),
    ] {
        if value.trim().is_empty() {
            anyhow::bail!("Marker '{}' must not be empty", name);
        }
    }

    for binding in config.bindings.layouts.values() {
        if binding.is_empty() || !binding.chars().all(|c| c.is_alphanumeric() || c == '_') {
            anyhow::bail!("Invalid binding class name '{}' in [bindings.layouts]", binding);
        }
    }

    Ok(())
}

/// Validate the binding package name format
fn validate_package_name(package: &str) -> Result<()> {
    let parts: Vec<&str> = package.split('.').collect();
    if parts.len() < 2 {
        anyhow::bail!(
            "Invalid binding package '{}'. Must have at least two parts (e.g., 'com.example')",
            package
        );
    }

    for (i, part) in parts.iter().enumerate() {
        let Some(first_char) = part.chars().next() else {
            anyhow::bail!("Invalid binding package '{}'. Part {} is empty", package, i + 1);
        };

        if !first_char.is_ascii_lowercase() {
            anyhow::bail!(
                "Invalid binding package '{}'. Part '{}' must start with a lowercase letter",
                package,
                part
            );
        }

        for ch in part.chars() {
            if !ch.is_ascii_lowercase() && !ch.is_ascii_digit() && ch != '_' {
                anyhow::bail!(
                    "Invalid binding package '{}'. Part '{}' contains invalid character '{}'",
                    package,
                    part,
                    ch
                );
            }
        }
    }

    Ok(())
}
