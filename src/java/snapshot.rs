//! Owned snapshots of `method_invocation` nodes.
//!
//! A snapshot is taken once per request; only byte spans survive into edit planning.

use serde::Serialize;
use tree_sitter::Node;

use super::{JavaFile, MockitoType, Receiver, code_children, is_call, node_text};

// ─── Span ────────────────────────────────────────────────────────────

/// Half-open byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn of(node: Node) -> Self {
        Span::new(node.start_byte(), node.end_byte())
    }

    pub fn at(offset: usize) -> Self {
        Span::new(offset, offset)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ─── Qualifier and arguments ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QualifierKind {
    /// Another call of the same chain
    Call,
    /// A plain name or a field access (`mock`, `this.mock`, `Mockito`)
    Reference,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Qualifier {
    pub text: String,
    pub span: Span,
    pub kind: QualifierKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ArgKind {
    Call(Box<CallNode>),
    Reference,
    ClassLiteral { type_name: String },
    NewInstance { type_name: String, has_args: bool },
    Lambda,
    MethodReference,
    StringLiteral,
    BooleanLiteral { value: bool },
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Arg {
    pub text: String,
    pub span: Span,
    pub kind: ArgKind,
    /// Statically known Mockito type of the argument expression
    pub ty: Option<MockitoType>,
}

impl Arg {
    fn snapshot(file: &JavaFile, node: Node) -> Arg {
        let source = file.source().as_bytes();
        let kind = match node.kind() {
            "method_invocation" => match CallNode::snapshot(file, node) {
                Some(call) => ArgKind::Call(Box::new(call)),
                None => ArgKind::Other,
            },
            "identifier" | "field_access" => ArgKind::Reference,
            "class_literal" => ArgKind::ClassLiteral {
                type_name: class_literal_type(node_text(node, source)),
            },
            "object_creation_expression" => {
                let type_name = node
                    .child_by_field_name("type")
                    .map(|t| node_text(t, source).to_string())
                    .unwrap_or_default();
                let has_args = node
                    .child_by_field_name("arguments")
                    .is_some_and(|list| !code_children(list).is_empty());
                ArgKind::NewInstance { type_name, has_args }
            }
            "lambda_expression" => ArgKind::Lambda,
            "method_reference" => ArgKind::MethodReference,
            "string_literal" | "text_block" => ArgKind::StringLiteral,
            "true" => ArgKind::BooleanLiteral { value: true },
            "false" => ArgKind::BooleanLiteral { value: false },
            _ => ArgKind::Other,
        };
        Arg {
            text: node_text(node, source).to_string(),
            span: Span::of(node),
            kind,
            ty: file.expression_type(node),
        }
    }

    pub fn is_class_literal(&self) -> bool {
        matches!(self.kind, ArgKind::ClassLiteral { .. })
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.kind, ArgKind::Reference)
    }

    pub fn is_functional(&self) -> bool {
        matches!(self.kind, ArgKind::Lambda | ArgKind::MethodReference)
    }

    pub fn as_call(&self) -> Option<&CallNode> {
        match &self.kind {
            ArgKind::Call(call) => Some(call),
            _ => None,
        }
    }
}

/// `Foo.class` → `Foo`; `java.io.IOException .class` → `java.io.IOException`.
fn class_literal_type(text: &str) -> String {
    text.trim()
        .strip_suffix("class")
        .map(|t| t.trim_end().trim_end_matches('.').trim_end())
        .unwrap_or(text)
        .to_string()
}

// ─── Call node ───────────────────────────────────────────────────────

/// Owned snapshot of one `method_invocation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallNode {
    pub name: String,
    /// Whole invocation, qualifier included
    pub span: Span,
    pub name_span: Span,
    /// Argument list including the parentheses
    pub args_span: Span,
    pub args_text: String,
    pub args: Vec<Arg>,
    pub qualifier: Option<Qualifier>,
    /// Source text between the qualifier end and the name (`.`, `\n    .`, `.<T>`)
    pub link: String,
    pub receiver: Receiver,
}

impl CallNode {
    /// Snapshot `node`; `None` if it is not a call.
    pub fn snapshot(file: &JavaFile, node: Node) -> Option<CallNode> {
        if !is_call(node) {
            return None;
        }
        let source = file.source().as_bytes();
        let name_node = node.child_by_field_name("name")?;
        let args_node = node.child_by_field_name("arguments")?;
        let name = node_text(name_node, source).to_string();

        let qualifier = node.child_by_field_name("object").map(|object| Qualifier {
            text: node_text(object, source).to_string(),
            span: Span::of(object),
            kind: match object.kind() {
                "method_invocation" => QualifierKind::Call,
                "identifier" | "field_access" | "scoped_identifier" => QualifierKind::Reference,
                _ => QualifierKind::Other,
            },
        });
        let link = qualifier
            .as_ref()
            .map(|q| file.span_text(Span::new(q.span.end, name_node.start_byte())).to_string())
            .unwrap_or_default();

        let args = code_children(args_node)
            .into_iter()
            .map(|arg| Arg::snapshot(file, arg))
            .collect();

        Some(CallNode {
            receiver: file.receiver_of(node),
            name,
            span: Span::of(node),
            name_span: Span::of(name_node),
            args_span: Span::of(args_node),
            args_text: node_text(args_node, source).to_string(),
            args,
            qualifier,
            link,
        })
    }

    pub fn arg(&self, index: usize) -> Option<&Arg> {
        self.args.get(index)
    }

    /// Text of the call after its qualifier: `.call(1)` for `mock.call(1)`.
    pub fn tail_text(&self) -> String {
        format!("{}{}{}", self.link, self.name, self.args_text)
    }

    pub fn qualifier_text(&self) -> Option<&str> {
        self.qualifier.as_ref().map(|q| q.text.as_str())
    }
}

// ─── Chain ───────────────────────────────────────────────────────────

/// Root-first snapshot of one fluent chain: `calls[i].qualifier` is `calls[i - 1]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CallChain {
    calls: Vec<CallNode>,
}

impl CallChain {
    pub fn new(calls: Vec<CallNode>) -> Self {
        CallChain { calls }
    }

    pub fn calls(&self) -> &[CallNode] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CallNode> {
        self.calls.get(index)
    }

    pub fn first(&self) -> Option<&CallNode> {
        self.calls.first()
    }

    pub fn last(&self) -> Option<&CallNode> {
        self.calls.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CallNode> {
        self.calls.iter()
    }

    /// Span of the outermost call, which covers the whole chain.
    pub fn span(&self) -> Span {
        self.calls.last().map(|c| c.span).unwrap_or_default()
    }

    pub fn names(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.name.as_str()).collect()
    }
}

impl std::ops::Index<usize> for CallChain {
    type Output = CallNode;

    fn index(&self, index: usize) -> &CallNode {
        &self.calls[index]
    }
}

impl<'a> IntoIterator for &'a CallChain {
    type Item = &'a CallNode;
    type IntoIter = std::slice::Iter<'a, CallNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.calls.iter()
    }
}
