use tracing::debug;

use crate::migrator::error::{MigrationError, Result};
use crate::migrator::parser::{parse_expression, parse_function};
use crate::migrator::tree::{NodeId, NodeKind, SyntaxTree};

/// A lifecycle method located in, or added to, a class body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleMethod {
    pub id: NodeId,
    /// True when the method was synthesized from its template
    pub created: bool,
}

/// Find the method called `name`, creating it from `template` if missing
///
/// A created method goes right before the closing brace of the class body
/// and is re-indented to match the other members.
pub fn ensure_method(tree: &mut SyntaxTree, body: NodeId, name: &str, template: &str) -> Result<LifecycleMethod> {
    if let Some(id) = tree.find_function(body, name) {
        return Ok(LifecycleMethod { id, created: false });
    }

    let indent = tree.member_indent(body);
    let text = template.lines().collect::<Vec<_>>().join(&format!("\n{}", indent));
    let function = parse_function(tree, &text)?;
    if tree.name(function) != Some(name) {
        return Err(MigrationError::SyntheticParse {
            kind: "function",
            class: String::new(),
            text,
        });
    }

    match tree.rbrace(body) {
        Some(rbrace) => insert_before_closing_brace(tree, body, rbrace, function, &indent),
        None => tree.append_child(body, function),
    }

    debug!(method = name, "created missing lifecycle method");
    Ok(LifecycleMethod { id: function, created: true })
}

/// Put `function` immediately before `rbrace`, one blank line below whatever
/// precedes it
///
/// Comments sitting above the closing brace stay above the new method.
fn insert_before_closing_brace(tree: &mut SyntaxTree, body: NodeId, rbrace: NodeId, function: NodeId, indent: &str) {
    let trailing = tree
        .prev_sibling(rbrace)
        .filter(|&prev| tree.kind(prev) == NodeKind::Trivia);
    let after_lbrace = tree
        .prev_sibling(trailing.unwrap_or(rbrace))
        .is_some_and(|prev| tree.kind(prev) == NodeKind::LBrace);
    let owner_indent = tree
        .parent(body)
        .map(|owner| tree.indent_of(owner))
        .unwrap_or_default();

    let text = trailing.map(|t| tree.leaf_text(t).to_string()).unwrap_or_default();
    let (kept, tail) = match text.rfind('\n') {
        Some(pos) => (&text[..pos], text[pos..].to_string()),
        None => (text.as_str(), format!("\n{}", owner_indent)),
    };
    let (lead, tail) = if !kept.trim().is_empty() {
        (format!("{}\n\n{}", kept.trim_end(), indent), tail)
    } else {
        let lead = if after_lbrace {
            format!("\n{}", indent)
        } else {
            format!("\n\n{}", indent)
        };
        // blank lines above the brace stay below the new method
        let tail = if text.contains('\n') { text.clone() } else { tail };
        (lead, tail)
    };

    match trailing {
        Some(t) => tree.set_leaf_text(t, &lead),
        None => {
            let t = tree.alloc(NodeKind::Trivia, &lead);
            tree.insert_before(rbrace, t);
        }
    }
    tree.insert_before(rbrace, function);
    let t = tree.alloc(NodeKind::Trivia, &tail);
    tree.insert_before(rbrace, t);
}

/// Insert `statement` as the first statement of `method`'s block
///
/// Returns `None` when the method has an expression body.
pub fn inject_after_open_brace(tree: &mut SyntaxTree, method: NodeId, statement: &str) -> Result<Option<NodeId>> {
    let Some(block) = tree.block(method) else {
        debug!(method = ?tree.name(method), "expression body, nothing to inject into");
        return Ok(None);
    };
    let Some(lbrace) = tree.lbrace(block) else {
        return Ok(None);
    };

    let indent = tree.member_indent(block);
    let node = parse_expression(tree, statement)?;

    // a line comment after `{` stays on the brace line
    let anchor = match tree.next_sibling(lbrace) {
        Some(trivia) if tree.kind(trivia) == NodeKind::Trivia => {
            let text = tree.leaf_text(trivia).to_string();
            let line_end = text.find('\n').unwrap_or(text.len());
            if text[..line_end].trim_start().starts_with("//") {
                if line_end < text.len() {
                    tree.set_leaf_text(trivia, &text[..line_end]);
                    let rest = tree.alloc(NodeKind::Trivia, &text[line_end..]);
                    tree.insert_after(trivia, rest);
                }
                trivia
            } else {
                lbrace
            }
        }
        _ => lbrace,
    };

    tree.insert_after_with_break(anchor, node, &format!("\n{}", indent));
    tree.ensure_line_break_after(block, node);
    Ok(Some(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrator::defaults::ON_DESTROY_VIEW_TEMPLATE;
    use crate::migrator::parser::parse_file;

    const FRAGMENT: &str = r#"class HomeFragment : Fragment() {

    override fun onCreateView(inflater: LayoutInflater, container: ViewGroup?, savedInstanceState: Bundle?): View? {
        return inflater.inflate(R.layout.fragment_home, container, false)
    }
}
"#;

    #[test]
    fn test_creates_missing_method_before_closing_brace() {
        let mut tree = parse_file(FRAGMENT).unwrap();
        let body = tree.class_body(tree.classes()[0]).unwrap();

        let method = ensure_method(&mut tree, body, "onDestroyView", ON_DESTROY_VIEW_TEMPLATE).unwrap();
        assert!(method.created);
        assert_eq!(tree.find_function(body, "onDestroyView"), Some(method.id));

        let again = ensure_method(&mut tree, body, "onDestroyView", ON_DESTROY_VIEW_TEMPLATE).unwrap();
        assert_eq!(again, LifecycleMethod { id: method.id, created: false });

        assert!(tree.render().ends_with(
            "    }\n\n    override fun onDestroyView() {\n        super.onDestroyView()\n    }\n}\n"
        ));
    }

    #[test]
    fn test_created_method_goes_below_trailing_comment() {
        let source = "class HomeFragment : Fragment() {\n    fun a() {}\n\n    // keep at the end\n}\n";
        let mut tree = parse_file(source).unwrap();
        let body = tree.class_body(tree.classes()[0]).unwrap();

        ensure_method(&mut tree, body, "onDestroyView", ON_DESTROY_VIEW_TEMPLATE).unwrap();

        assert_eq!(
            tree.render(),
            "class HomeFragment : Fragment() {\n    fun a() {}\n\n    // keep at the end\n\n    override fun onDestroyView() {\n        super.onDestroyView()\n    }\n}\n"
        );
    }

    #[test]
    fn test_created_method_in_empty_body() {
        let mut tree = parse_file("class HomeFragment : Fragment() {\n}\n").unwrap();
        let body = tree.class_body(tree.classes()[0]).unwrap();

        ensure_method(&mut tree, body, "onDestroyView", ON_DESTROY_VIEW_TEMPLATE).unwrap();

        assert_eq!(
            tree.render(),
            "class HomeFragment : Fragment() {\n    override fun onDestroyView() {\n        super.onDestroyView()\n    }\n}\n"
        );
    }

    #[test]
    fn test_rejects_template_with_wrong_name() {
        let mut tree = parse_file(FRAGMENT).unwrap();
        let body = tree.class_body(tree.classes()[0]).unwrap();
        let result = ensure_method(&mut tree, body, "onDestroyView", "fun somethingElse() {\n}");
        assert!(result.is_err());
        assert_eq!(tree.render(), FRAGMENT);
    }

    #[test]
    fn test_injects_as_first_statement() {
        let mut tree = parse_file(FRAGMENT).unwrap();
        let body = tree.class_body(tree.classes()[0]).unwrap();
        let method = tree.find_function(body, "onCreateView").unwrap();

        let node = inject_after_open_brace(&mut tree, method, "_binding = FragmentHomeBinding.inflate(inflater, container, false)")
            .unwrap()
            .unwrap();

        let block = tree.block(method).unwrap();
        assert_eq!(tree.statements(block)[0], node);
        assert!(tree.render().contains(
            "View? {\n        _binding = FragmentHomeBinding.inflate(inflater, container, false)\n        return inflater"
        ));
    }

    #[test]
    fn test_inject_keeps_comment_on_brace_line() {
        let source = "class A : Fragment() {\n    override fun onDestroyView() { // release views\n        super.onDestroyView()\n    }\n}\n";
        let mut tree = parse_file(source).unwrap();
        let body = tree.class_body(tree.classes()[0]).unwrap();
        let method = tree.find_function(body, "onDestroyView").unwrap();

        let node = inject_after_open_brace(&mut tree, method, "_binding = null").unwrap().unwrap();

        assert_eq!(tree.statements(tree.block(method).unwrap())[0], node);
        assert_eq!(
            tree.render(),
            "class A : Fragment() {\n    override fun onDestroyView() { // release views\n        _binding = null\n        super.onDestroyView()\n    }\n}\n"
        );
    }

    #[test]
    fn test_inject_into_single_line_block() {
        let mut tree = parse_file("class A : View(ctx) {\n    fun a() { b() }\n}\n").unwrap();
        let body = tree.class_body(tree.classes()[0]).unwrap();
        let method = tree.find_function(body, "a").unwrap();

        inject_after_open_brace(&mut tree, method, "c()").unwrap();

        assert_eq!(tree.render(), "class A : View(ctx) {\n    fun a() {\n        c()\n        b() }\n}\n");
    }

    #[test]
    fn test_expression_body_is_skipped() {
        let mut tree = parse_file("class A : View(ctx) {\n    fun a() = Unit\n}\n").unwrap();
        let body = tree.class_body(tree.classes()[0]).unwrap();
        let method = tree.find_function(body, "a").unwrap();
        assert_eq!(inject_after_open_brace(&mut tree, method, "c()").unwrap(), None);
    }
}
