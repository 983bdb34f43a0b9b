use std::collections::BTreeMap;

use tracing::debug;

use crate::config::BindingsConfig;
use crate::migrator::naming::layout_to_binding_name;
use crate::migrator::tree::{NodeId, NodeKind, SyntaxTree};

/// Maps a layout resource name to the binding class generated for it
pub trait LayoutResolver {
    fn binding_for_layout(&self, layout: &str) -> String;

    /// Binding that replaces `setContentView(R.layout.<layout>)`
    fn main_binding_for_activity(&self, layout: &str) -> String {
        self.binding_for_layout(layout)
    }

    /// Binding that replaces the layout returned from `onCreateView`
    fn main_binding_for_fragment(&self, layout: &str) -> String {
        self.binding_for_layout(layout)
    }
}

/// The binding generator's naming convention plus per-layout overrides
#[derive(Debug, Clone)]
pub struct ConventionResolver {
    suffix: String,
    overrides: BTreeMap<String, String>,
}

impl ConventionResolver {
    pub fn new(suffix: impl Into<String>) -> Self {
        ConventionResolver {
            suffix: suffix.into(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &BindingsConfig) -> Self {
        ConventionResolver {
            suffix: config.suffix.clone(),
            overrides: config.layouts.clone(),
        }
    }
}

impl LayoutResolver for ConventionResolver {
    fn binding_for_layout(&self, layout: &str) -> String {
        match self.overrides.get(layout) {
            Some(binding) => binding.clone(),
            None => layout_to_binding_name(layout, &self.suffix),
        }
    }
}

/// `import kotlinx.android.synthetic.main.<layout>...` found in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticImport {
    pub import: NodeId,
    pub layout: String,
}

pub fn synthetic_imports(tree: &SyntaxTree, prefix: &str) -> Vec<SyntheticImport> {
    tree.children_of_kind(tree.root(), NodeKind::Import)
        .into_iter()
        .filter_map(|import| {
            let path = tree.name(import)?;
            let rest = path.strip_prefix(prefix)?;
            let layout = rest.split('.').next().unwrap_or_default();
            if layout.is_empty() || layout == "*" {
                return None;
            }
            Some(SyntheticImport {
                import,
                layout: layout.to_string(),
            })
        })
        .collect()
}

/// Binding names in import order, without duplicates
///
/// `activity_main.*` and `activity_main.view.*` name the same binding.
pub fn discover_bindings(imports: &[SyntheticImport], resolver: &dyn LayoutResolver) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(imports.len());
    for import in imports {
        let name = resolver.binding_for_layout(&import.layout);
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Package named by the file's `package` directive
pub fn file_package(tree: &SyntaxTree) -> Option<String> {
    tree.children(tree.root()).iter().find_map(|&child| {
        if tree.kind(child) != NodeKind::Other {
            return None;
        }
        let text = tree.leaf_text(child).trim_start();
        let rest = text.strip_prefix("package")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let package = rest.trim().trim_end_matches(';').trim();
        (!package.is_empty()).then(|| package.to_string())
    })
}

/// Replace the synthetic imports with imports of the binding classes
///
/// Binding imports take the place of the first synthetic import. Bindings
/// that are already imported are not imported twice. Without a package only
/// the synthetic imports are removed.
pub fn rewrite_imports(tree: &mut SyntaxTree, imports: &[SyntheticImport], names: &[String], package: Option<&str>) {
    let Some(first) = imports.first() else {
        return;
    };

    let existing: Vec<String> = tree
        .children_of_kind(tree.root(), NodeKind::Import)
        .into_iter()
        .filter_map(|import| tree.name(import).map(str::to_string))
        .collect();

    let mut replaced_first = false;
    if let Some(package) = package {
        let mut last: Option<NodeId> = None;
        for name in names {
            let path = format!("{}.{}", package, name);
            if existing.contains(&path) {
                continue;
            }
            let import = tree.alloc(NodeKind::Import, &format!("import {}", path));
            tree.node_mut(import).name = Some(path);

            match last {
                None => {
                    tree.replace(first.import, import);
                    replaced_first = true;
                }
                Some(previous) => {
                    tree.insert_after_with_break(previous, import, "\n");
                }
            }
            last = Some(import);
        }
    } else {
        debug!("no binding package known, binding imports not added");
    }

    for synthetic in imports {
        if synthetic.import == first.import && replaced_first {
            continue;
        }
        tree.remove_with_trivia(synthetic.import);
    }
}
