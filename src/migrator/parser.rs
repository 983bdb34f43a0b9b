/// Structural parser for Kotlin source files
///
/// The parser only recovers the structure the migrator edits: imports,
/// classes and their bodies, companion objects, functions with block bodies,
/// `init` blocks and the direct statements of those blocks. Everything else is
/// kept as opaque leaf text. Whitespace and comments between items become
/// `Trivia` nodes so the tree renders back to the original source unchanged.

use crate::migrator::error::{MigrationError, Result};
use crate::migrator::tree::{NodeId, NodeKind, SyntaxTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    File,
    ClassBody,
    Block,
}

const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "internal", "override", "open", "abstract", "final",
    "lateinit", "const", "inline", "data", "sealed", "enum", "inner", "suspend", "tailrec",
    "operator", "infix", "external", "annotation", "companion", "actual", "expect", "value",
    "noinline", "crossinline", "vararg",
];

/// Operators that leave an expression unfinished at the end of a line
const TRAILING_CONTINUATIONS: &[&str] = &[
    "=", ",", "(", "[", ".", "?.", "+", "-", "*", "/", "%", "&&", "||", "->", "?:", ":",
];

/// Tokens that attach a line to the previous one
const LEADING_CONTINUATIONS: &[&str] = &[".", "?.", "?:", "&&", "||", ":", "=", "->"];

const CONTINUATION_KEYWORDS: &[&str] = &["else", "catch", "finally", "where", "by"];

pub struct Parser<'s> {
    input: &'s str,
}

/// Parse a whole Kotlin file
pub fn parse_file(source: &str) -> Result<SyntaxTree> {
    let mut tree = SyntaxTree::new();
    let root = tree.root();
    let parser = Parser::new(source);
    parser.parse_items(&mut tree, root, 0, source.len(), Level::File)?;
    Ok(tree)
}

/// Parse a single statement or expression into a detached node
pub fn parse_expression(tree: &mut SyntaxTree, text: &str) -> Result<NodeId> {
    parse_fragment(tree, text, Level::Block, "expression", |kind| kind.is_statement())
}

/// Parse a single property declaration into a detached node
pub fn parse_property(tree: &mut SyntaxTree, text: &str) -> Result<NodeId> {
    parse_fragment(tree, text, Level::ClassBody, "property", |kind| kind == NodeKind::Property)
}

/// Parse a single function declaration with a block body into a detached node
pub fn parse_function(tree: &mut SyntaxTree, text: &str) -> Result<NodeId> {
    let id = parse_fragment(tree, text, Level::ClassBody, "function", |kind| kind == NodeKind::Function)?;
    if tree.block(id).is_none() {
        return Err(synthetic_error("function", text));
    }
    Ok(id)
}

fn synthetic_error(kind: &'static str, text: &str) -> MigrationError {
    MigrationError::SyntheticParse {
        kind,
        class: String::new(),
        text: text.to_string(),
    }
}

fn parse_fragment(
    tree: &mut SyntaxTree,
    text: &str,
    level: Level,
    kind: &'static str,
    accept: impl Fn(NodeKind) -> bool,
) -> Result<NodeId> {
    let scratch = tree.alloc(NodeKind::Other, "");
    let parser = Parser::new(text);
    parser
        .parse_items(tree, scratch, 0, text.len(), level)
        .map_err(|_| synthetic_error(kind, text))?;

    let items: Vec<NodeId> = tree
        .children(scratch)
        .iter()
        .copied()
        .filter(|&c| tree.kind(c) != NodeKind::Trivia)
        .collect();

    match items.as_slice() {
        [single] if accept(tree.kind(*single)) => {
            let single = *single;
            tree.detach(single);
            Ok(single)
        }
        _ => Err(synthetic_error(kind, text)),
    }
}

impl<'s> Parser<'s> {
    pub fn new(input: &'s str) -> Self {
        Parser { input }
    }

    fn bytes(&self) -> &'s [u8] {
        self.input.as_bytes()
    }

    /// Convert byte position to (line, column) for error messages
    fn pos_to_line_col(&self, pos: usize) -> (usize, usize) {
        let mut line = 1;
        let mut col = 1;

        for (i, ch) in self.input.char_indices() {
            if i >= pos {
                break;
            }
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }

        (line, col)
    }

    fn error_at(&self, pos: usize, message: &str) -> MigrationError {
        let (line, column) = self.pos_to_line_col(pos);
        MigrationError::parse(message, line, column)
    }

    // ------------------------------------------------------------------
    // Item sequences
    // ------------------------------------------------------------------

    fn parse_items(
        &self,
        tree: &mut SyntaxTree,
        parent: NodeId,
        start: usize,
        end: usize,
        level: Level,
    ) -> Result<()> {
        let mut pos = start;

        loop {
            let item_start = self.skip_trivia(pos, end);
            if item_start > pos {
                let trivia = tree.alloc(NodeKind::Trivia, &self.input[pos..item_start]);
                tree.append_child(parent, trivia);
            }
            if item_start >= end {
                break;
            }

            let item_end = self.scan_item(item_start, end, level)?;
            if item_end <= item_start {
                return Err(self.error_at(item_start, "Unexpected character"));
            }

            let node = self.build_item(tree, item_start, item_end, level)?;
            tree.append_child(parent, node);
            pos = item_end;
        }

        Ok(())
    }

    /// Find where the item starting at `start` ends
    fn scan_item(&self, start: usize, end: usize, level: Level) -> Result<usize> {
        let bytes = self.bytes();
        let mut pos = start;
        let mut depth = 0usize;
        let mut last_significant = start;

        while pos < end {
            match bytes[pos] {
                b'"' => {
                    pos = self.skip_string(pos)?;
                    last_significant = pos;
                }
                b'\'' => {
                    pos = self.skip_char_literal(pos)?;
                    last_significant = pos;
                }
                b'`' => {
                    pos = self.skip_backticks(pos)?;
                    last_significant = pos;
                }
                b'/' if self.peek(pos + 1) == Some(b'/') || self.peek(pos + 1) == Some(b'*') => {
                    pos = self.skip_comment(pos);
                }
                b'(' | b'[' | b'{' => {
                    depth += 1;
                    pos += 1;
                    last_significant = pos;
                }
                b')' | b']' | b'}' => {
                    if depth == 0 {
                        return Err(self.error_at(pos, &format!("Unexpected '{}'", bytes[pos] as char)));
                    }
                    depth -= 1;
                    pos += 1;
                    last_significant = pos;
                }
                b';' if depth == 0 => return Ok(pos + 1),
                b'\n' if depth == 0 => {
                    if !self.continues(start, last_significant, pos, end, level) {
                        return Ok(last_significant);
                    }
                    pos += 1;
                }
                b' ' | b'\t' | b'\r' | b'\n' => pos += 1,
                _ => {
                    pos += 1;
                    last_significant = pos;
                }
            }
        }

        if depth > 0 {
            return Err(self.error_at(start, "Unclosed delimiter"));
        }
        Ok(last_significant)
    }

    /// Does the item continue past the newline at `newline`?
    fn continues(&self, start: usize, last_significant: usize, newline: usize, end: usize, level: Level) -> bool {
        let so_far = self.input[start..last_significant].trim_end();

        // postfix operators and star imports end a line even though they look open
        if ["++", "--", "!!", ".*"].iter().any(|suffix| so_far.ends_with(suffix)) {
            return false;
        }
        if TRAILING_CONTINUATIONS.iter().any(|op| so_far.ends_with(op)) {
            return true;
        }
        if only_annotations(so_far) {
            return true;
        }
        if opens_braceless_body(so_far) {
            return true;
        }

        let next = self.skip_trivia(newline, end);
        if next >= end {
            return false;
        }
        let rest = &self.input[next..end];

        if LEADING_CONTINUATIONS.iter().any(|op| rest.starts_with(op)) {
            return true;
        }
        if CONTINUATION_KEYWORDS.iter().any(|kw| starts_with_word(rest, kw)) {
            return true;
        }
        if starts_with_word(so_far, "do") && starts_with_word(rest, "while") {
            return true;
        }
        if rest.starts_with('{') && !so_far.ends_with('}') {
            let control_flow = ["if", "for", "while", "when", "try", "do"]
                .iter()
                .any(|kw| starts_with_word(so_far, kw));
            return level != Level::Block || control_flow;
        }
        false
    }

    fn build_item(&self, tree: &mut SyntaxTree, start: usize, end: usize, level: Level) -> Result<NodeId> {
        let text = &self.input[start..end];

        if level == Level::Block {
            let kind = if starts_with_word(text, "return") || text.starts_with("return@") {
                NodeKind::Return
            } else {
                NodeKind::Statement
            };
            return Ok(tree.alloc(kind, text));
        }

        let Some((keyword, keyword_end)) = declaration_keyword(text) else {
            return Ok(tree.alloc(NodeKind::Other, text));
        };
        let keyword_end = start + keyword_end;

        match keyword {
            "import" => {
                let id = tree.alloc(NodeKind::Import, text);
                let path = text["import".len()..].trim().trim_end_matches(';').trim();
                tree.node_mut(id).name = Some(path.to_string());
                Ok(id)
            }
            "class" | "interface" => self.build_class_like(tree, NodeKind::Class, start, end, keyword_end),
            "object" => {
                let kind = if has_modifier(text, "companion") {
                    NodeKind::Companion
                } else {
                    NodeKind::Object
                };
                self.build_class_like(tree, kind, start, end, keyword_end)
            }
            "fun" => {
                if starts_with_word(self.input[keyword_end..end].trim_start(), "interface") {
                    let interface_end = keyword_end
                        + self.input[keyword_end..end].find("interface").unwrap_or(0)
                        + "interface".len();
                    return self.build_class_like(tree, NodeKind::Class, start, end, interface_end);
                }
                self.build_function(tree, start, end, keyword_end)
            }
            "val" | "var" => {
                let id = tree.alloc(NodeKind::Property, text);
                tree.node_mut(id).name = read_identifier(&self.input[keyword_end..end]);
                Ok(id)
            }
            "init" => {
                let brace = self.skip_trivia(keyword_end, end);
                if self.peek(brace) != Some(b'{') {
                    return Ok(tree.alloc(NodeKind::Other, text));
                }
                let id = tree.alloc(NodeKind::Initializer, "");
                self.attach_header_and_body(tree, id, start, brace, end, NodeKind::Block, Level::Block)?;
                Ok(id)
            }
            _ => Ok(tree.alloc(NodeKind::Other, text)),
        }
    }

    fn build_class_like(
        &self,
        tree: &mut SyntaxTree,
        kind: NodeKind,
        start: usize,
        end: usize,
        keyword_end: usize,
    ) -> Result<NodeId> {
        let after_keyword = &self.input[keyword_end..end];
        let name = read_identifier(after_keyword);
        let brace = self.find_top_level(keyword_end, end, |b| b == b'{');

        let header_end = brace.unwrap_or(end);
        let supertypes = parse_supertypes(&self.input[keyword_end..header_end]);

        let id = tree.alloc_named(kind, name);
        tree.node_mut(id).supertypes = supertypes;

        match brace {
            Some(brace) => {
                self.attach_header_and_body(tree, id, start, brace, end, NodeKind::ClassBody, Level::ClassBody)?;
            }
            None => {
                let header = tree.alloc(NodeKind::Header, &self.input[start..end]);
                tree.append_child(id, header);
            }
        }
        Ok(id)
    }

    fn build_function(&self, tree: &mut SyntaxTree, start: usize, end: usize, keyword_end: usize) -> Result<NodeId> {
        let text = &self.input[start..end];
        let name = function_name(&self.input[keyword_end..end]);

        let body_start = self
            .find_top_level(keyword_end, end, |b| b == b'(')
            .and_then(|open| self.find_matching(open).ok())
            .map(|close| close + 1);

        let brace = body_start.and_then(|from| {
            let marker = self.find_top_level(from, end, |b| b == b'{' || b == b'=')?;
            (self.bytes()[marker] == b'{').then_some(marker)
        });

        match brace {
            Some(brace) => {
                let id = tree.alloc_named(NodeKind::Function, name);
                self.attach_header_and_body(tree, id, start, brace, end, NodeKind::Block, Level::Block)?;
                Ok(id)
            }
            None => {
                let id = tree.alloc(NodeKind::Function, text);
                tree.node_mut(id).name = name;
                Ok(id)
            }
        }
    }

    /// Attach `Header`, the braced container and any trailing text to `owner`
    #[allow(clippy::too_many_arguments)]
    fn attach_header_and_body(
        &self,
        tree: &mut SyntaxTree,
        owner: NodeId,
        start: usize,
        brace: usize,
        end: usize,
        container_kind: NodeKind,
        level: Level,
    ) -> Result<()> {
        let header = tree.alloc(NodeKind::Header, &self.input[start..brace]);
        tree.append_child(owner, header);

        let close = self.find_matching(brace)?;
        let container = tree.alloc(container_kind, "");
        let lbrace = tree.alloc(NodeKind::LBrace, "{");
        tree.append_child(container, lbrace);
        self.parse_items(tree, container, brace + 1, close, level)?;
        let rbrace = tree.alloc(NodeKind::RBrace, "}");
        tree.append_child(container, rbrace);
        tree.append_child(owner, container);

        if close + 1 < end {
            let tail = tree.alloc(NodeKind::Other, &self.input[close + 1..end]);
            tree.append_child(owner, tail);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Low-level scanning
    // ------------------------------------------------------------------

    fn peek(&self, pos: usize) -> Option<u8> {
        self.bytes().get(pos).copied()
    }

    /// Skip whitespace and comments
    fn skip_trivia(&self, mut pos: usize, end: usize) -> usize {
        let bytes = self.bytes();
        while pos < end {
            match bytes[pos] {
                b' ' | b'\t' | b'\r' | b'\n' => pos += 1,
                b'/' if self.peek(pos + 1) == Some(b'/') || self.peek(pos + 1) == Some(b'*') => {
                    pos = self.skip_comment(pos).min(end);
                }
                _ => break,
            }
        }
        pos
    }

    /// Skip a `//` comment (up to, not including, the newline) or a nested `/* */`
    fn skip_comment(&self, pos: usize) -> usize {
        let bytes = self.bytes();
        if self.peek(pos + 1) == Some(b'/') {
            let mut p = pos + 2;
            while p < bytes.len() && bytes[p] != b'\n' {
                p += 1;
            }
            return p;
        }

        let mut p = pos + 2;
        let mut depth = 1;
        while p < bytes.len() && depth > 0 {
            if bytes[p] == b'/' && self.peek(p + 1) == Some(b'*') {
                depth += 1;
                p += 2;
            } else if bytes[p] == b'*' && self.peek(p + 1) == Some(b'/') {
                depth -= 1;
                p += 2;
            } else {
                p += 1;
            }
        }
        p
    }

    /// Skip a string literal starting at `pos`, including `${...}` templates
    fn skip_string(&self, pos: usize) -> Result<usize> {
        let bytes = self.bytes();
        let raw = self.input[pos..].starts_with("\"\"\"");
        let mut p = if raw { pos + 3 } else { pos + 1 };

        while p < bytes.len() {
            match bytes[p] {
                b'\\' if !raw => p += 2,
                b'$' if self.peek(p + 1) == Some(b'{') => {
                    p = self.find_matching(p + 1)? + 1;
                }
                b'"' if raw => {
                    if self.input[p..].starts_with("\"\"\"") {
                        let mut close = p + 3;
                        while self.peek(close) == Some(b'"') {
                            close += 1;
                        }
                        return Ok(close);
                    }
                    p += 1;
                }
                b'"' => return Ok(p + 1),
                _ => p += 1,
            }
        }

        Err(self.error_at(pos, "Unterminated string literal"))
    }

    fn skip_char_literal(&self, pos: usize) -> Result<usize> {
        let bytes = self.bytes();
        let mut p = pos + 1;
        while p < bytes.len() {
            match bytes[p] {
                b'\\' => p += 2,
                b'\'' => return Ok(p + 1),
                b'\n' => break,
                _ => p += 1,
            }
        }
        Err(self.error_at(pos, "Unterminated character literal"))
    }

    fn skip_backticks(&self, pos: usize) -> Result<usize> {
        match self.input[pos + 1..].find('`') {
            Some(offset) => Ok(pos + 1 + offset + 1),
            None => Err(self.error_at(pos, "Unterminated backtick identifier")),
        }
    }

    /// Position of the bracket closing the one at `open`
    fn find_matching(&self, open: usize) -> Result<usize> {
        let bytes = self.bytes();
        let mut depth = 0usize;
        let mut p = open;

        while p < bytes.len() {
            match bytes[p] {
                b'"' => {
                    p = self.skip_string(p)?;
                    continue;
                }
                b'\'' => {
                    p = self.skip_char_literal(p)?;
                    continue;
                }
                b'`' => {
                    p = self.skip_backticks(p)?;
                    continue;
                }
                b'/' if self.peek(p + 1) == Some(b'/') || self.peek(p + 1) == Some(b'*') => {
                    p = self.skip_comment(p);
                    continue;
                }
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(p);
                    }
                }
                _ => {}
            }
            p += 1;
        }

        Err(self.error_at(open, &format!("Unclosed '{}'", bytes[open] as char)))
    }

    /// First byte in `[start, end)` outside strings, comments and `()`/`[]`
    /// nesting that satisfies `pred`
    fn find_top_level(&self, start: usize, end: usize, pred: impl Fn(u8) -> bool) -> Option<usize> {
        let bytes = self.bytes();
        let mut depth = 0usize;
        let mut p = start;

        while p < end {
            let b = bytes[p];
            if depth == 0 && pred(b) {
                return Some(p);
            }
            match b {
                b'"' => {
                    p = self.skip_string(p).ok()?;
                    continue;
                }
                b'\'' => {
                    p = self.skip_char_literal(p).ok()?;
                    continue;
                }
                b'`' => {
                    p = self.skip_backticks(p).ok()?;
                    continue;
                }
                b'/' if self.peek(p + 1) == Some(b'/') || self.peek(p + 1) == Some(b'*') => {
                    p = self.skip_comment(p);
                    continue;
                }
                b'(' | b'[' => depth += 1,
                b')' | b']' => depth = depth.saturating_sub(1),
                _ => {}
            }
            p += 1;
        }
        None
    }
}

// ----------------------------------------------------------------------
// Text helpers
// ----------------------------------------------------------------------

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn starts_with_word(text: &str, word: &str) -> bool {
    text.starts_with(word)
        && !text[word.len()..]
            .chars()
            .next()
            .map(is_identifier_char)
            .unwrap_or(false)
}

fn ends_with_word(text: &str, word: &str) -> bool {
    text.ends_with(word)
        && !text[..text.len() - word.len()]
            .chars()
            .next_back()
            .is_some_and(is_identifier_char)
}

/// Offset of the `(` matching a trailing `)`
fn trailing_group_start(text: &str) -> Option<usize> {
    if !text.ends_with(')') {
        return None;
    }
    let mut depth = 0usize;
    for (i, c) in text.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Does the text end with a control-flow header whose body starts on the next line?
///
/// Covers `if (..)`, `for (..)`, `while (..)`, `else` and `do`. The `while`
/// that closes a `do` loop ends the statement instead.
fn opens_braceless_body(text: &str) -> bool {
    if ends_with_word(text, "else") || ends_with_word(text, "do") {
        return true;
    }
    let Some(open) = trailing_group_start(text) else {
        return false;
    };
    let head = text[..open].trim_end();
    if ends_with_word(head, "while") {
        let closes_do = head[..head.len() - "while".len()].trim_end().ends_with('}')
            || starts_with_word(text.trim_start(), "do");
        return !closes_do;
    }
    ends_with_word(head, "if") || ends_with_word(head, "for")
}

/// Length of a leading annotation (`@Foo`, `@field:Foo`, `@Foo(...)`), if any
fn annotation_len(text: &str) -> Option<usize> {
    if !text.starts_with('@') {
        return None;
    }
    let mut len = 1;
    for c in text[1..].chars() {
        if is_identifier_char(c) || c == '.' || c == ':' {
            len += c.len_utf8();
        } else {
            break;
        }
    }
    if text[len..].starts_with('(') {
        let mut depth = 0;
        for (i, c) in text[len..].char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(len + i + 1);
                    }
                }
                _ => {}
            }
        }
        return Some(text.len());
    }
    Some(len)
}

fn only_annotations(text: &str) -> bool {
    let mut rest = text.trim_start();
    if rest.is_empty() {
        return false;
    }
    while !rest.is_empty() {
        match annotation_len(rest) {
            Some(len) => rest = rest[len..].trim_start(),
            None => return false,
        }
    }
    true
}

/// Find the declaration keyword after annotations and modifiers
///
/// Returns the keyword and the byte offset just past it.
fn declaration_keyword(text: &str) -> Option<(&'static str, usize)> {
    const KEYWORDS: &[&str] = &[
        "import", "package", "class", "interface", "object", "fun", "val", "var", "init",
        "constructor", "typealias",
    ];

    let mut offset = 0;
    loop {
        let rest = &text[offset..];
        let trimmed = rest.trim_start();
        offset += rest.len() - trimmed.len();

        if let Some(len) = annotation_len(trimmed) {
            offset += len;
            continue;
        }
        if let Some(keyword) = KEYWORDS.iter().find(|kw| starts_with_word(trimmed, kw)) {
            return Some((keyword, offset + keyword.len()));
        }
        if let Some(modifier) = MODIFIERS.iter().find(|m| starts_with_word(trimmed, m)) {
            offset += modifier.len();
            continue;
        }
        return None;
    }
}

fn has_modifier(text: &str, modifier: &str) -> bool {
    let Some((_, keyword_end)) = declaration_keyword(text) else {
        return false;
    };
    text[..keyword_end]
        .split(|c: char| !is_identifier_char(c))
        .any(|word| word == modifier)
}

fn read_identifier(text: &str) -> Option<String> {
    let trimmed = text.trim_start();
    if let Some(stripped) = trimmed.strip_prefix('`') {
        return stripped.find('`').map(|end| stripped[..end].to_string());
    }
    let ident: String = trimmed.chars().take_while(|&c| is_identifier_char(c)).collect();
    (!ident.is_empty()).then_some(ident)
}

/// Name of a function from the text following `fun`
///
/// Handles type parameters and extension receivers: `fun <T> List<T>.first()`.
fn function_name(after_fun: &str) -> Option<String> {
    let mut rest = after_fun.trim_start();
    if rest.starts_with('<') {
        let mut depth = 0;
        for (i, c) in rest.char_indices() {
            match c {
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        rest = rest[i + 1..].trim_start();
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    let signature = &rest[..rest.find('(').unwrap_or(rest.len())];
    let mut depth = 0;
    let mut last_dot = None;
    for (i, c) in signature.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            '.' if depth == 0 => last_dot = Some(i),
            _ => {}
        }
    }
    let name = match last_dot {
        Some(dot) => &signature[dot + 1..],
        None => signature,
    };
    read_identifier(name)
}

/// Simple names of the direct supertypes listed in a class header
///
/// `text` starts right after the `class`/`object` keyword.
pub fn parse_supertypes(text: &str) -> Vec<String> {
    let mut depth = 0i32;
    let mut colon = None;
    let mut prev = ' ';
    for (i, c) in text.char_indices() {
        let arrow = c == '>' && prev == '-';
        prev = c;
        match c {
            '(' | '<' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            '>' if !arrow => depth -= 1,
            ':' if depth == 0 => {
                colon = Some(i);
                break;
            }
            _ => {}
        }
    }
    let Some(colon) = colon else {
        return Vec::new();
    };

    let list = &text[colon + 1..];
    let list = match find_word(list, "where") {
        Some(pos) => &list[..pos],
        None => list,
    };

    let mut entries = Vec::new();
    let mut current = String::new();
    depth = 0;
    for c in list.chars() {
        match c {
            '(' | '<' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | '>' | ']' | '}' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => entries.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    entries.push(current);

    entries
        .iter()
        .filter_map(|entry| {
            let mut entry = entry.trim();
            while let Some(len) = annotation_len(entry) {
                entry = entry[len..].trim_start();
            }
            let qualified: String = entry
                .chars()
                .take_while(|&c| is_identifier_char(c) || c == '.')
                .collect();
            qualified
                .rsplit('.')
                .next()
                .filter(|name| !name.is_empty())
                .map(str::to_string)
        })
        .collect()
}

fn find_word(text: &str, word: &str) -> Option<usize> {
    text.match_indices(word).map(|(i, _)| i).find(|&i| {
        let before_ok = text[..i].chars().next_back().map(|c| !is_identifier_char(c)).unwrap_or(true);
        before_ok && starts_with_word(&text[i..], word)
    })
}
