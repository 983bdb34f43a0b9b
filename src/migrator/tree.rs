/// Lossless syntax tree for Kotlin source files
///
/// Nodes live in an arena and are addressed by `NodeId`. Ids stay valid for
/// the lifetime of the tree, including after the node has been detached, so
/// callers can hold on to a node they just created instead of looking it up
/// again by name. Rendering concatenates leaf text depth-first; an unmodified
/// tree renders to exactly the text it was parsed from.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Import,
    Class,
    /// Text of a declaration up to its opening brace
    Header,
    ClassBody,
    Companion,
    Object,
    Property,
    Function,
    Initializer,
    Block,
    Statement,
    Return,
    LBrace,
    RBrace,
    /// Whitespace and comments between declarations or statements
    Trivia,
    Other,
}

impl NodeKind {
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            NodeKind::Class
                | NodeKind::Companion
                | NodeKind::Object
                | NodeKind::Property
                | NodeKind::Function
                | NodeKind::Initializer
                | NodeKind::Other
        )
    }

    pub fn is_statement(self) -> bool {
        matches!(self, NodeKind::Statement | NodeKind::Return)
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub name: Option<String>,
    /// Direct supertypes, simple names only (classes, companions, objects)
    pub supertypes: Vec<String>,
    text: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn new() -> Self {
        let mut tree = SyntaxTree {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.alloc(NodeKind::File, "");
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Allocate a detached node
    pub fn alloc(&mut self, kind: NodeKind, text: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            name: None,
            supertypes: Vec::new(),
            text: text.to_string(),
            children: Vec::new(),
            parent: None,
        });
        id
    }

    pub fn alloc_named(&mut self, kind: NodeKind, name: Option<String>) -> NodeId {
        let id = self.alloc(kind, "");
        self.nodes[id.0].name = name;
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.0].kind
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].name.as_deref()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Raw text of a leaf node (empty for composite nodes)
    pub fn leaf_text(&self, id: NodeId) -> &str {
        &self.nodes[id.0].text
    }

    pub fn set_leaf_text(&mut self, id: NodeId, text: &str) {
        self.nodes[id.0].text = text.to_string();
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn index_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self.children(parent).iter().position(|&c| c == id)?;
        Some((parent, index))
    }

    fn insert_at(&mut self, parent: NodeId, index: usize, new: NodeId) {
        self.nodes[new.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(index, new);
    }

    /// Insert `new` as the next sibling of `anchor`
    pub fn insert_after(&mut self, anchor: NodeId, new: NodeId) -> bool {
        match self.index_in_parent(anchor) {
            Some((parent, index)) => {
                self.insert_at(parent, index + 1, new);
                true
            }
            None => false,
        }
    }

    /// Insert `new` as the previous sibling of `anchor`
    pub fn insert_before(&mut self, anchor: NodeId, new: NodeId) -> bool {
        match self.index_in_parent(anchor) {
            Some((parent, index)) => {
                self.insert_at(parent, index, new);
                true
            }
            None => false,
        }
    }

    /// Put `new` where `old` was; `old` becomes detached
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> bool {
        match self.index_in_parent(old) {
            Some((parent, index)) => {
                self.nodes[parent.0].children[index] = new;
                self.nodes[new.0].parent = Some(parent);
                self.nodes[old.0].parent = None;
                true
            }
            None => false,
        }
    }

    pub fn detach(&mut self, id: NodeId) -> bool {
        match self.index_in_parent(id) {
            Some((parent, index)) => {
                self.nodes[parent.0].children.remove(index);
                self.nodes[id.0].parent = None;
                true
            }
            None => false,
        }
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.index_in_parent(id)?;
        index.checked_sub(1).map(|i| self.children(parent)[i])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Render a subtree back to source text
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.render_into(id, &mut out);
        out
    }

    fn render_into(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id.0];
        if node.children.is_empty() {
            out.push_str(&node.text);
        } else {
            for &child in &node.children {
                self.render_into(child, out);
            }
        }
    }

    pub fn render(&self) -> String {
        self.text(self.root)
    }

    pub fn find_child(&self, parent: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.kind(c) == kind)
    }

    pub fn children_of_kind(&self, parent: NodeId, kind: NodeKind) -> Vec<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .filter(|&c| self.kind(c) == kind)
            .collect()
    }

    // ------------------------------------------------------------------
    // Class-level queries
    // ------------------------------------------------------------------

    /// Classes declared at the top level of the file
    pub fn classes(&self) -> Vec<NodeId> {
        self.children_of_kind(self.root, NodeKind::Class)
    }

    pub fn class_body(&self, class: NodeId) -> Option<NodeId> {
        self.find_child(class, NodeKind::ClassBody)
    }

    /// Declarations of a class body in source order
    pub fn declarations(&self, body: NodeId) -> Vec<NodeId> {
        self.children(body)
            .iter()
            .copied()
            .filter(|&c| self.kind(c).is_declaration())
            .collect()
    }

    /// Body of `class`, adding an empty `{\n}` if the class has none
    pub fn ensure_class_body(&mut self, class: NodeId) -> NodeId {
        if let Some(body) = self.class_body(class) {
            return body;
        }

        let body = self.alloc(NodeKind::ClassBody, "");
        let lbrace = self.alloc(NodeKind::LBrace, "{");
        self.append_child(body, lbrace);
        let closing = format!("\n{}", self.indent_of(class));
        let trivia = self.alloc(NodeKind::Trivia, &closing);
        self.append_child(body, trivia);
        let rbrace = self.alloc(NodeKind::RBrace, "}");
        self.append_child(body, rbrace);

        let space = self.alloc(NodeKind::Trivia, " ");
        self.append_child(class, space);
        self.append_child(class, body);
        body
    }

    pub fn companion(&self, body: NodeId) -> Option<NodeId> {
        self.find_child(body, NodeKind::Companion)
    }

    pub fn find_function(&self, body: NodeId, name: &str) -> Option<NodeId> {
        self.children(body)
            .iter()
            .copied()
            .find(|&c| self.kind(c) == NodeKind::Function && self.name(c) == Some(name))
    }

    pub fn initializers(&self, body: NodeId) -> Vec<NodeId> {
        self.children_of_kind(body, NodeKind::Initializer)
    }

    /// Block of a function or initializer (None for expression bodies)
    pub fn block(&self, owner: NodeId) -> Option<NodeId> {
        self.find_child(owner, NodeKind::Block)
    }

    pub fn lbrace(&self, container: NodeId) -> Option<NodeId> {
        self.find_child(container, NodeKind::LBrace)
    }

    pub fn rbrace(&self, container: NodeId) -> Option<NodeId> {
        self.children(container)
            .iter()
            .rev()
            .copied()
            .find(|&c| self.kind(c) == NodeKind::RBrace)
    }

    /// Direct statements of a block, ignoring trivia and braces
    pub fn statements(&self, block: NodeId) -> Vec<NodeId> {
        self.children(block)
            .iter()
            .copied()
            .filter(|&c| self.kind(c).is_statement())
            .collect()
    }

    // ------------------------------------------------------------------
    // Layout helpers
    // ------------------------------------------------------------------

    /// Indentation of the line a node starts on
    pub fn indent_of(&self, id: NodeId) -> String {
        if let Some(prev) = self.prev_sibling(id) {
            if self.kind(prev) == NodeKind::Trivia {
                let text = self.leaf_text(prev);
                if let Some(pos) = text.rfind('\n') {
                    let tail = &text[pos + 1..];
                    if tail.chars().all(|c| c == ' ' || c == '\t') {
                        return tail.to_string();
                    }
                }
            }
        }
        match self.parent(id) {
            Some(parent) if parent != self.root => self.indent_of(parent),
            _ => String::new(),
        }
    }

    /// Indentation used for members of a class body or statements of a block
    pub fn member_indent(&self, container: NodeId) -> String {
        let members: Vec<NodeId> = self
            .children(container)
            .iter()
            .copied()
            .filter(|&c| {
                let kind = self.kind(c);
                kind.is_declaration() || kind.is_statement()
            })
            .collect();

        for member in members {
            if let Some(prev) = self.prev_sibling(member) {
                if self.kind(prev) == NodeKind::Trivia && self.leaf_text(prev).contains('\n') {
                    return self.indent_of(member);
                }
            }
        }

        let owner_indent = self
            .parent(container)
            .map(|owner| self.indent_of(owner))
            .unwrap_or_default();
        format!("{}    ", owner_indent)
    }

    /// Insert `(trivia, node)` after `anchor`, returning the trivia id
    pub fn insert_after_with_break(&mut self, anchor: NodeId, node: NodeId, separator: &str) -> NodeId {
        let trivia = self.alloc(NodeKind::Trivia, separator);
        self.insert_after(anchor, trivia);
        self.insert_after(trivia, node);
        trivia
    }

    /// Make sure the closing brace of `container` starts on its own line
    pub fn ensure_rbrace_on_own_line(&mut self, container: NodeId) {
        let Some(rbrace) = self.rbrace(container) else {
            return;
        };
        let owner_indent = self
            .parent(container)
            .map(|owner| self.indent_of(owner))
            .unwrap_or_default();
        let separator = format!("\n{}", owner_indent);

        match self.prev_sibling(rbrace) {
            Some(prev) if self.kind(prev) == NodeKind::Trivia => {
                if !self.leaf_text(prev).contains('\n') {
                    self.set_leaf_text(prev, &separator);
                }
            }
            Some(_) => {
                let trivia = self.alloc(NodeKind::Trivia, &separator);
                self.insert_before(rbrace, trivia);
            }
            None => {}
        }
    }

    /// Make sure whatever follows `node` inside `container` starts on a new line
    pub fn ensure_line_break_after(&mut self, container: NodeId, node: NodeId) {
        match self.next_sibling(node) {
            Some(next) if self.kind(next) == NodeKind::Trivia => {
                if self.leaf_text(next).contains('\n') {
                    return;
                }
                let before_rbrace = self
                    .next_sibling(next)
                    .map(|n| self.kind(n) == NodeKind::RBrace)
                    .unwrap_or(false);
                if before_rbrace {
                    self.ensure_rbrace_on_own_line(container);
                } else {
                    let indent = self.member_indent(container);
                    self.set_leaf_text(next, &format!("\n{}", indent));
                }
            }
            Some(next) if self.kind(next) == NodeKind::RBrace => self.ensure_rbrace_on_own_line(container),
            Some(next) => {
                let indent = self.member_indent(container);
                let trivia = self.alloc(NodeKind::Trivia, &format!("\n{}", indent));
                self.insert_before(next, trivia);
            }
            None => {}
        }
    }

    /// Detach a declaration or statement together with the whitespace that
    /// separated it from its neighbours
    ///
    /// Comments inside that whitespace are kept.
    pub fn remove_with_trivia(&mut self, id: NodeId) -> bool {
        let prev = self.prev_sibling(id);
        let next = self.next_sibling(id);
        let first_member = match prev {
            Some(p) if self.kind(p) == NodeKind::LBrace => true,
            Some(p) if self.kind(p) == NodeKind::Trivia => self
                .prev_sibling(p)
                .map(|pp| self.kind(pp) == NodeKind::LBrace)
                .unwrap_or(false),
            _ => false,
        };

        if !self.detach(id) {
            return false;
        }

        if first_member {
            // `{ <id> <trivia> <member>`: the separator before the next member goes
            if let Some(next) = next.filter(|&n| self.kind(n) == NodeKind::Trivia) {
                let followed_by_member = self
                    .next_sibling(next)
                    .map(|n| self.kind(n) != NodeKind::RBrace)
                    .unwrap_or(false);
                if followed_by_member {
                    self.drop_trivia(next);
                    return true;
                }
            }
        }

        if let Some(prev) = prev.filter(|&p| self.kind(p) == NodeKind::Trivia) {
            self.drop_trivia(prev);
        }
        true
    }

    /// Remove whitespace-only trivia, or cut it back to its last comment
    fn drop_trivia(&mut self, trivia: NodeId) {
        let text = self.leaf_text(trivia).to_string();
        if text.trim().is_empty() {
            self.detach(trivia);
            return;
        }
        let keep = text.trim_end_matches(|c: char| c.is_whitespace());
        self.set_leaf_text(trivia, keep);
    }
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}
