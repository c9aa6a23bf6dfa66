//! Chain decomposition over raw tree-sitter nodes.
//!
//! A chain link is a `method_invocation` whose `object` field is another
//! `method_invocation`. Walking follows only those links, so argument lists and
//! statements are natural boundaries.

use tree_sitter::Node;

use super::node_text;

pub fn is_call(node: Node) -> bool {
    node.kind() == "method_invocation"
}

/// The call that uses `node` as its qualifier.
pub fn subsequent_call(node: Node<'_>) -> Option<Node<'_>> {
    let parent = node.parent()?;
    if !is_call(parent) {
        return None;
    }
    (parent.child_by_field_name("object") == Some(node)).then_some(parent)
}

/// The call `node` is chained on, if its qualifier is a call.
pub fn previous_call(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("object").filter(|object| is_call(*object))
}

/// First call of the chain containing `node`.
pub fn root_call(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    while let Some(previous) = previous_call(current) {
        current = previous;
    }
    current
}

/// Last call of the chain containing `node`.
pub fn outermost_call(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    while let Some(next) = subsequent_call(current) {
        current = next;
    }
    current
}

/// Calls from `terminal` back to the chain root, nearest first.
pub fn decompose_from_last(terminal: Node<'_>) -> Vec<Node<'_>> {
    if !is_call(terminal) {
        return Vec::new();
    }
    let mut calls = vec![terminal];
    let mut current = terminal;
    while let Some(previous) = previous_call(current) {
        calls.push(previous);
        current = previous;
    }
    calls
}

/// Calls from `call` to the outermost call of its chain, root-first.
pub fn decompose_from_first(call: Node<'_>, include_self: bool) -> Vec<Node<'_>> {
    if !is_call(call) {
        return Vec::new();
    }
    let mut calls = Vec::new();
    if include_self {
        calls.push(call);
    }
    let mut current = call;
    while let Some(next) = subsequent_call(current) {
        calls.push(next);
        current = next;
    }
    calls
}

/// Nearest call named `name` among `from` and the calls it is chained on.
pub fn find_call_upward<'a>(from: Node<'a>, name: &str, source: &[u8]) -> Option<Node<'a>> {
    decompose_from_last(from)
        .into_iter()
        .find(|call| call_name(*call, source) == Some(name))
}

/// Nearest call named `name` among the calls chained after `from`.
pub fn find_call_downward<'a>(from: Node<'a>, name: &str, source: &[u8]) -> Option<Node<'a>> {
    decompose_from_first(from, false)
        .into_iter()
        .find(|call| call_name(*call, source) == Some(name))
}

fn call_name<'s>(call: Node, source: &'s [u8]) -> Option<&'s str> {
    call.child_by_field_name("name").map(|n| node_text(n, source))
}
