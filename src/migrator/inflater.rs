use tracing::debug;

use crate::config::MarkersConfig;
use crate::migrator::call_site::callee_chain;
use crate::migrator::tree::{NodeId, SyntaxTree};

/// Does the statement construct the layout by hand?
///
/// Matches a call chain starting with `LayoutInflater` or `View.inflate`,
/// and falls back to a plain text search for either marker.
fn is_inflater_call(text: &str, markers: &MarkersConfig) -> bool {
    let chain_starts_with = |marker: &str| match callee_chain(text) {
        Some(chain) => {
            let prefix: Vec<&str> = marker.split('.').collect();
            chain.len() >= prefix.len() && chain[..prefix.len()] == prefix[..]
        }
        None => false,
    };

    chain_starts_with(&markers.layout_inflater)
        || chain_starts_with(&markers.view_inflater)
        || text.contains(&markers.layout_inflater)
        || text.contains(&markers.view_inflater)
}

/// Delete hand-written inflation from the class's `init` blocks
///
/// Only the first inflater statement of each block is removed. When that
/// statement is the whole block the block itself is deleted and no further
/// blocks are looked at. Returns the number of nodes removed.
pub fn purge_view_inflaters(tree: &mut SyntaxTree, body: NodeId, markers: &MarkersConfig) -> usize {
    let mut removed = 0;

    for initializer in tree.initializers(body) {
        let Some(block) = tree.block(initializer) else {
            continue;
        };
        let statements = tree.statements(block);
        let Some(&inflater) = statements
            .iter()
            .find(|&&s| is_inflater_call(tree.leaf_text(s), markers))
        else {
            continue;
        };

        if statements.len() == 1 {
            debug!("removing init block that only inflated the layout");
            tree.remove_with_trivia(initializer);
            return removed + 1;
        }

        debug!(statement = tree.leaf_text(inflater), "removing layout inflation");
        tree.remove_with_trivia(inflater);
        removed += 1;
    }

    removed
}
