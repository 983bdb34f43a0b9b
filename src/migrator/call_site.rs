use tracing::debug;

use crate::config::MarkersConfig;
use crate::migrator::bindings::LayoutResolver;
use crate::migrator::defaults::{ON_CREATE, ON_CREATE_VIEW};
use crate::migrator::error::Result;
use crate::migrator::naming::{to_activity_content_view_format, to_fragment_on_create_view_format};
use crate::migrator::parser::parse_expression;
use crate::migrator::tree::{NodeId, NodeKind, SyntaxTree};

/// Layout identifier following `prefix`, e.g. `activity_main` in
/// `setContentView(R.layout.activity_main)`
pub fn layout_name<'t>(text: &'t str, prefix: &str) -> Option<&'t str> {
    let start = text.find(prefix)? + prefix.len();
    let rest = &text[start..];
    let len = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    (len > 0).then(|| &rest[..len])
}

/// Dotted identifier chain in front of the first call, `["View", "inflate"]`
/// for `View.inflate(context, R.layout.x, this)`
///
/// Returns `None` when the statement does not start with a call.
pub fn callee_chain(text: &str) -> Option<Vec<&str>> {
    let open = text.find('(')?;
    let callee = text[..open].trim_end();
    if callee.is_empty() {
        return None;
    }

    let segments: Vec<&str> = callee.split('.').map(str::trim).collect();
    let valid = segments.iter().all(|segment| {
        let mut chars = segment.chars();
        match chars.next() {
            Some(first) => (first.is_alphabetic() || first == '_') && chars.all(|c| c.is_alphanumeric() || c == '_'),
            None => false,
        }
    });
    valid.then_some(segments)
}

/// `setContentView(R.layout.x)` or `this.setContentView(R.layout.x)`
fn is_content_view_call(text: &str, markers: &MarkersConfig) -> bool {
    let structural = match callee_chain(text) {
        Some(chain) => match chain.as_slice() {
            [callee] | ["this", callee] => {
                *callee == markers.content_view_callee && text.contains(&markers.layout_resource)
            }
            _ => false,
        },
        None => false,
    };
    structural || text.contains(&markers.content_view)
}

/// Replace `setContentView(R.layout.x)` in `onCreate` with the binding's root
///
/// Returns whether a call site was rewritten.
pub fn replace_content_view(
    tree: &mut SyntaxTree,
    body: NodeId,
    markers: &MarkersConfig,
    resolver: &dyn LayoutResolver,
    multi: bool,
) -> Result<bool> {
    let Some(block) = tree.find_function(body, ON_CREATE).and_then(|f| tree.block(f)) else {
        debug!("no onCreate block, content view left as is");
        return Ok(false);
    };

    let site = tree
        .statements(block)
        .into_iter()
        .find(|&s| tree.kind(s) == NodeKind::Statement && is_content_view_call(tree.leaf_text(s), markers));
    let Some(site) = site else {
        debug!("no setContentView call in onCreate");
        return Ok(false);
    };

    let Some(layout) = layout_name(tree.leaf_text(site), &markers.layout_resource).map(str::to_string) else {
        debug!(call = tree.leaf_text(site), "setContentView without a layout resource");
        return Ok(false);
    };

    let binding = resolver.main_binding_for_activity(&layout);
    let replacement = parse_expression(tree, &to_activity_content_view_format(&binding, multi))?;
    tree.replace(site, replacement);
    Ok(true)
}

/// Replace the last `return` of `onCreateView` with the binding's root
///
/// Earlier returns stay untouched. `fallback` is used when the returned
/// expression names no layout resource.
pub fn replace_fragment_return(
    tree: &mut SyntaxTree,
    body: NodeId,
    markers: &MarkersConfig,
    resolver: &dyn LayoutResolver,
    multi: bool,
    fallback: Option<&str>,
) -> Result<bool> {
    let Some(block) = tree.find_function(body, ON_CREATE_VIEW).and_then(|f| tree.block(f)) else {
        debug!("no onCreateView block, return left as is");
        return Ok(false);
    };

    let last_return = tree
        .statements(block)
        .into_iter()
        .rev()
        .find(|&s| tree.kind(s) == NodeKind::Return);
    let Some(site) = last_return else {
        debug!("onCreateView has no return");
        return Ok(false);
    };

    let binding = match layout_name(tree.leaf_text(site), &markers.layout_resource) {
        Some(layout) => resolver.main_binding_for_fragment(layout),
        None => match fallback {
            Some(binding) => binding.to_string(),
            None => {
                debug!(expression = tree.leaf_text(site), "return without a layout resource");
                return Ok(false);
            }
        },
    };

    let replacement = parse_expression(tree, &to_fragment_on_create_view_format(&binding, multi))?;
    tree.replace(site, replacement);
    Ok(true)
}
