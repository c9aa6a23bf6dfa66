//! Java front end: tree-sitter parsing, single-file name resolution and call snapshots.

mod decompose;
mod resolve;
mod snapshot;

pub use decompose::*;
pub use resolve::*;
pub use snapshot::*;

use std::collections::HashSet;

use tree_sitter::{Node, Parser, Tree};

use crate::ChainError;

// ─── Parsed file ─────────────────────────────────────────────────────

/// A parsed Java compilation unit plus everything resolved from it up front.
///
/// Immutable: every analysis borrows it, every rewrite produces a new source text
/// that has to be parsed again.
pub struct JavaFile {
    source: String,
    tree: Tree,
    imports: Imports,
    symbols: SymbolTable,
    identifiers: HashSet<String>,
}

impl JavaFile {
    /// Parse `source` with the tree-sitter Java grammar.
    pub fn parse(source: impl Into<String>) -> Result<Self, ChainError> {
        let source = source.into();
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_java::LANGUAGE.into())?;
        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| ChainError::Parse("tree-sitter returned no tree".to_string()))?;

        let bytes = source.as_bytes();
        let root = tree.root_node();
        let imports = Imports::collect(root, bytes);
        let symbols = SymbolTable::collect(root, bytes, &imports);
        let mut identifiers = HashSet::new();
        collect_identifiers(root, bytes, &mut identifiers);

        Ok(JavaFile { source, tree, imports, symbols, identifiers })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn imports(&self) -> &Imports {
        &self.imports
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Every identifier spelled anywhere in the file.
    pub fn identifiers(&self) -> &HashSet<String> {
        &self.identifiers
    }

    /// Whether tree-sitter had to recover from syntax errors.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Fingerprint of the source text, used to detect edits between planning and applying.
    #[must_use]
    pub fn revision(&self) -> u64 {
        crate::stable_hash(&[self.source.as_bytes()])
    }

    pub fn text(&self, node: Node) -> &str {
        node_text(node, self.source.as_bytes())
    }

    pub fn span_text(&self, span: Span) -> &str {
        self.source.get(span.start..span.end).unwrap_or("")
    }

    /// 1-based line number of a byte offset.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> usize {
        let end = offset.min(self.source.len());
        self.source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
    }

    /// Byte span covering the 1-based lines `first..=last`, without the final newline.
    pub fn line_span(&self, first: usize, last: usize) -> Option<Span> {
        if first == 0 || last < first {
            return None;
        }
        let mut starts = vec![0usize];
        starts.extend(self.source.match_indices('\n').map(|(i, _)| i + 1));
        let start = *starts.get(first - 1)?;
        let end = starts
            .get(last)
            .map(|next| next - 1)
            .unwrap_or(self.source.len());
        Some(Span::new(start, end.max(start)))
    }

    /// The innermost method call covering `offset`.
    pub fn call_at(&self, offset: usize) -> Option<Node<'_>> {
        let mut node = self.root().descendant_for_byte_range(offset, offset)?;
        loop {
            if is_call(node) {
                return Some(node);
            }
            node = node.parent()?;
        }
    }

    /// The method call occupying exactly `span`, if any.
    pub fn call_with_span(&self, span: Span) -> Option<Node<'_>> {
        let mut node = self.root().descendant_for_byte_range(span.start, span.end)?;
        loop {
            if is_call(node) && Span::of(node) == span {
                return Some(node);
            }
            if node.start_byte() < span.start || node.end_byte() > span.end {
                return None;
            }
            node = node.parent()?;
        }
    }

    /// Expression statements lying completely inside `span`, in source order.
    ///
    /// Only siblings of the first selected statement are returned, so a selection never
    /// mixes statements of different blocks.
    pub fn statements_in(&self, span: Span) -> Vec<Node<'_>> {
        let mut found = Vec::new();
        collect_statements(self.root(), span, &mut found);
        let Some(first_parent) = found.first().and_then(|s| s.parent()) else {
            return found;
        };
        found.retain(|s| s.parent() == Some(first_parent));
        found
    }

    /// Snapshot of the whole chain `node` belongs to, root-first.
    pub fn chain_of(&self, node: Node) -> CallChain {
        if !is_call(node) {
            return CallChain::default();
        }
        let root = root_call(node);
        let calls = decompose_from_first(root, true)
            .into_iter()
            .filter_map(|call| CallNode::snapshot(self, call))
            .collect();
        CallChain::new(calls)
    }

    /// Snapshot of the chain forming an expression statement, if the statement is a call.
    pub fn chain_of_statement(&self, statement: Node) -> Option<CallChain> {
        let expression = statement.named_child(0)?;
        if !is_call(expression) {
            return None;
        }
        Some(self.chain_of(expression))
    }
}

// ─── Node helpers ────────────────────────────────────────────────────

pub(crate) fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

pub(crate) fn find_child_by_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

/// Named children that are not comments.
pub(crate) fn code_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.kind().ends_with("comment"))
        .collect()
}

/// Nearest ancestor (or self) that is a statement or a local declaration.
pub fn enclosing_statement(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = Some(node);
    while let Some(n) = current {
        let kind = n.kind();
        if kind.ends_with("_statement") || kind == "local_variable_declaration" {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

fn collect_statements<'a>(node: Node<'a>, span: Span, found: &mut Vec<Node<'a>>) {
    if node.end_byte() <= span.start || node.start_byte() >= span.end {
        return;
    }
    if node.kind() == "expression_statement" && span.contains(Span::of(node)) {
        found.push(node);
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_statements(child, span, found);
    }
}

fn collect_identifiers(node: Node, source: &[u8], out: &mut HashSet<String>) {
    if node.kind() == "identifier" {
        out.insert(node_text(node, source).to_string());
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_identifiers(child, source, out);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "java_tests.rs"]
mod tests;
