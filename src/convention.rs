//! Convention policy: which dialect family a project enforces.
//!
//! The policy is a plain value handed to every query that needs it; nothing caches it.

use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use crate::approach::{Family, INORDER_VERIFY, VerificationApproach};
use crate::java::{CallChain, CallNode, JavaFile, MockitoClass, Span, is_call};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Convention {
    /// `Mockito` and `InOrder` only
    Mockito,
    /// `BDDMockito` only
    BddMockito,
}

impl Convention {
    pub fn as_str(&self) -> &'static str {
        match self {
            Convention::Mockito => "mockito",
            Convention::BddMockito => "bddMockito",
        }
    }

    /// Classes a project following this convention must use.
    pub fn allowed_classes(&self) -> &'static str {
        match self {
            Convention::Mockito => "org.mockito.Mockito / org.mockito.InOrder",
            Convention::BddMockito => "org.mockito.BDDMockito",
        }
    }
}

impl std::fmt::Display for Convention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Convention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mockito" => Ok(Self::Mockito),
            "bddmockito" | "bdd" => Ok(Self::BddMockito),
            other => Err(format!("Unknown convention '{other}'. Expected: mockito, bddMockito")),
        }
    }
}

/// The enforced convention, or none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConventionPolicy {
    pub enforced: Option<Convention>,
}

impl ConventionPolicy {
    pub fn none() -> Self {
        ConventionPolicy { enforced: None }
    }

    pub fn enforcing(convention: Convention) -> Self {
        ConventionPolicy { enforced: Some(convention) }
    }

    pub fn is_mockito_enforced(&self) -> bool {
        self.enforced == Some(Convention::Mockito)
    }

    pub fn is_bdd_enforced(&self) -> bool {
        self.enforced == Some(Convention::BddMockito)
    }

    /// Mockito-family targets need BDD not enforced, and vice versa.
    pub fn allows(&self, family: Family) -> bool {
        match family {
            Family::Mockito => !self.is_bdd_enforced(),
            Family::Bdd => !self.is_mockito_enforced(),
            Family::Neutral => true,
        }
    }
}

// ─── Enforcement check ───────────────────────────────────────────────

/// A call that breaks the enforced convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub line: usize,
    pub column: usize,
    pub method: String,
    /// Span of the offending method name
    pub span: Span,
    pub message: String,
}

const MOCKITO_FLAGGED: &[&str] = &[
    "when",
    "doReturn",
    "doThrow",
    "doAnswer",
    "doCallRealMethod",
    "doNothing",
    "verify",
    "verifyNoMoreInteractions",
    "verifyNoInteractions",
    "verifyZeroInteractions",
];

/// Whether `call` is spelled in the dialect family `convention` forbids.
fn violates(call: &CallNode, convention: Convention) -> bool {
    match convention {
        Convention::Mockito => call.receiver.is_static(MockitoClass::BddMockito),
        Convention::BddMockito => {
            (call.receiver.is_static(MockitoClass::Mockito) && MOCKITO_FLAGGED.contains(&call.name.as_str()))
                || INORDER_VERIFY.is_verified_by(call)
        }
    }
}

/// Every call in `file` that breaks `convention`, in source order.
pub fn check(file: &JavaFile, convention: Convention) -> Vec<Violation> {
    let mut violations = Vec::new();
    visit_calls(file.root(), &mut |node| {
        let Some(call) = CallNode::snapshot(file, node) else {
            return;
        };
        if !violates(&call, convention) {
            return;
        }
        let line_start = file.source()[..call.name_span.start].rfind('\n').map_or(0, |i| i + 1);
        violations.push(Violation {
            line: file.line_of(call.name_span.start),
            column: call.name_span.start - line_start + 1,
            method: call.name.clone(),
            span: call.name_span,
            message: format!(
                "Stubbing and verification must be performed via {}",
                convention.allowed_classes()
            ),
        });
    });
    violations
}

/// Whether any call of `chain` breaks `convention`.
pub fn chain_violates(chain: &CallChain, convention: Convention) -> bool {
    chain.iter().any(|call| violates(call, convention))
}

fn visit_calls<'a>(node: Node<'a>, visit: &mut impl FnMut(Node<'a>)) {
    if is_call(node) {
        visit(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit_calls(child, visit);
    }
}
