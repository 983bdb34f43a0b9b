use crate::migrator::tree::{NodeId, SyntaxTree};

/// Places synthesized declarations in a class body
///
/// The first batch lands right after the companion object, or at the top of
/// the body when there is none. The inserter remembers the last declaration it
/// placed, so later batches follow earlier ones and the declarations keep the
/// order in which their bindings were discovered.
pub struct Inserter {
    body: NodeId,
    last: Option<NodeId>,
}

impl Inserter {
    pub fn new(body: NodeId) -> Self {
        Inserter { body, last: None }
    }

    /// Insert `declarations` in order and return their ids
    pub fn insert_after_companion(&mut self, tree: &mut SyntaxTree, declarations: &[NodeId]) -> Vec<NodeId> {
        let indent = tree.member_indent(self.body);
        let mut inserted = Vec::with_capacity(declarations.len());

        for &declaration in declarations {
            let (anchor, separator) = match self.last {
                Some(last) => (last, format!("\n{}", indent)),
                None => match tree.companion(self.body) {
                    Some(companion) => (companion, format!("\n\n{}", indent)),
                    None => match tree.lbrace(self.body) {
                        Some(lbrace) => (lbrace, format!("\n{}", indent)),
                        None => return inserted,
                    },
                },
            };

            tree.insert_after_with_break(anchor, declaration, &separator);
            self.last = Some(declaration);
            inserted.push(declaration);
        }

        if let Some(last) = self.last {
            tree.ensure_line_break_after(self.body, last);
        }
        inserted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrator::parser::{parse_file, parse_property};

    fn body_of(tree: &SyntaxTree) -> NodeId {
        tree.class_body(tree.classes()[0]).unwrap()
    }

    #[test]
    fn test_inserts_at_top_without_companion() {
        let mut tree = parse_file("class A : Base() {\n\n    fun run() {\n    }\n}\n").unwrap();
        let body = body_of(&tree);
        let property = parse_property(&mut tree, "private val binding = 1").unwrap();

        Inserter::new(body).insert_after_companion(&mut tree, &[property]);

        assert_eq!(
            tree.render(),
            "class A : Base() {\n    private val binding = 1\n\n    fun run() {\n    }\n}\n"
        );
    }

    #[test]
    fn test_inserts_after_companion_in_order() {
        let source = "class A : Base() {\n    companion object {\n        const val X = 1\n    }\n\n    fun run() = Unit\n}\n";
        let mut tree = parse_file(source).unwrap();
        let body = body_of(&tree);
        let first = parse_property(&mut tree, "private var _a: A? = null").unwrap();
        let second = parse_property(&mut tree, "private val a: A get() = _a!!").unwrap();
        let third = parse_property(&mut tree, "private val b = 2").unwrap();

        let mut inserter = Inserter::new(body);
        inserter.insert_after_companion(&mut tree, &[first, second]);
        inserter.insert_after_companion(&mut tree, &[third]);

        assert_eq!(
            tree.render(),
            "class A : Base() {\n    companion object {\n        const val X = 1\n    }\n\n    private var _a: A? = null\n    private val a: A get() = _a!!\n    private val b = 2\n\n    fun run() = Unit\n}\n"
        );
    }

    #[test]
    fn test_inserts_into_empty_body() {
        let mut tree = parse_file("class A : Base() {}\n").unwrap();
        let body = body_of(&tree);
        let property = parse_property(&mut tree, "private val binding = 1").unwrap();

        Inserter::new(body).insert_after_companion(&mut tree, &[property]);

        assert_eq!(tree.render(), "class A : Base() {\n    private val binding = 1\n}\n");
    }
}
