//! Rewriting verification heads.
//!
//! Only the head of a verification chain changes (`Mockito.verify(mock)`,
//! `BDDMockito.then(mock).should()`, `inOrder.verify(mock)`, ...). The verified call
//! after it is kept byte for byte.

use serde::Serialize;

use super::{ChainSite, PlannedEdits, TextEdit, inorder};
use crate::Rejection;
use crate::approach::{Family, VerificationApproach, VerificationKind, VerificationParts};
use crate::java::{JavaFile, Span};

const MOCKITO: &str = "org.mockito.Mockito";
const BDD_MOCKITO: &str = "org.mockito.BDDMockito";
const IN_ORDER: &str = "org.mockito.InOrder";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VerificationTarget {
    MockitoVerify,
    BddThenShould,
    /// `then(mock).should(inOrder)` from a non-BDD source
    BddThenShouldInOrder,
    /// `then(mock).should()` → `then(mock).should(inOrder)`
    AddInOrderToBdd,
    InOrderVerify,
    InOrderVerifyMockedStatic,
    MockedStaticVerify,
}

impl VerificationTarget {
    pub const ALL: [VerificationTarget; 7] = [
        VerificationTarget::MockitoVerify,
        VerificationTarget::BddThenShould,
        VerificationTarget::BddThenShouldInOrder,
        VerificationTarget::AddInOrderToBdd,
        VerificationTarget::InOrderVerify,
        VerificationTarget::InOrderVerifyMockedStatic,
        VerificationTarget::MockedStaticVerify,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MockitoVerify => "mockito-verify",
            Self::BddThenShould => "bddmockito-then-should",
            Self::BddThenShouldInOrder => "bddmockito-then-should-inorder",
            Self::AddInOrderToBdd => "bddmockito-add-inorder",
            Self::InOrderVerify => "inorder-verify",
            Self::InOrderVerifyMockedStatic => "inorder-verify-mocked-static",
            Self::MockedStaticVerify => "mocked-static-verify",
        }
    }

    pub fn presentable(&self) -> &'static str {
        match self {
            Self::MockitoVerify => "Mockito.verify()",
            Self::BddThenShould => "BDDMockito.then().should()",
            Self::BddThenShouldInOrder => "BDDMockito.then().should(InOrder)",
            Self::AddInOrderToBdd => "BDDMockito.then().should(InOrder)",
            Self::InOrderVerify => "InOrder.verify()",
            Self::InOrderVerifyMockedStatic => "InOrder.verify(MockedStatic)",
            Self::MockedStaticVerify => "MockedStatic.verify()",
        }
    }

    /// Dialect the rewritten chain classifies as.
    pub fn kind(&self) -> VerificationKind {
        match self {
            Self::MockitoVerify => VerificationKind::MockitoVerify,
            Self::BddThenShould | Self::BddThenShouldInOrder | Self::AddInOrderToBdd => {
                VerificationKind::BddMockitoThenShould
            }
            Self::InOrderVerify => VerificationKind::InOrderVerify,
            Self::InOrderVerifyMockedStatic => VerificationKind::InOrderVerifyMockedStatic,
            Self::MockedStaticVerify => VerificationKind::MockedStaticVerify,
        }
    }

    pub fn family(&self) -> Family {
        self.kind().approach().family()
    }

    /// Whether the result verifies against an `InOrder`.
    pub fn uses_in_order(&self) -> bool {
        matches!(
            self,
            Self::BddThenShouldInOrder | Self::AddInOrderToBdd | Self::InOrderVerify | Self::InOrderVerifyMockedStatic
        )
    }
}

impl std::fmt::Display for VerificationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Targets offered for chains of `source`, in menu order.
pub fn verification_targets(source: VerificationKind) -> &'static [VerificationTarget] {
    use VerificationTarget::*;
    match source {
        VerificationKind::MockitoVerify => &[InOrderVerify, BddThenShould, BddThenShouldInOrder],
        VerificationKind::BddMockitoThenShould => &[MockitoVerify, InOrderVerify, AddInOrderToBdd],
        VerificationKind::InOrderVerify => &[MockitoVerify, BddThenShould, BddThenShouldInOrder],
        VerificationKind::InOrderVerifyMockedStatic => &[MockedStaticVerify],
        VerificationKind::MockedStaticVerify => &[InOrderVerifyMockedStatic],
    }
}

/// Head replacements for every site, plus the `InOrder` declaration the target needs.
pub fn plan_verification(
    file: &JavaFile,
    sites: &[ChainSite],
    from: &dyn VerificationApproach,
    target: VerificationTarget,
    in_order_base: &str,
) -> Result<PlannedEdits, Rejection> {
    if !verification_targets(from.kind()).contains(&target) {
        return Err(Rejection::NotATarget {
            source_approach: from.presentable().to_string(),
            target: target.presentable().to_string(),
        });
    }
    let invalid = |reason: &str| Rejection::Invalid {
        approach: from.presentable().to_string(),
        reason: reason.to_string(),
    };

    let mut all_parts = Vec::with_capacity(sites.len());
    for site in sites {
        let parts = from
            .parts(&site.chain)
            .ok_or_else(|| invalid("the verification head is not recognized"))?;
        all_parts.push(parts);
    }
    check_in_order_use(from.kind(), target, &all_parts, &invalid)?;

    // Mocked classes for `Mockito.inOrder(...)` when verifying a MockedStatic in order.
    let mut mocked_classes = Vec::new();
    if target == VerificationTarget::InOrderVerifyMockedStatic {
        for (site, parts) in sites.iter().zip(&all_parts) {
            let reference = parts.mocked_static.as_deref().unwrap_or_default();
            let class = file
                .mocked_class_of(reference, site.chain.span().start)
                .ok_or_else(|| Rejection::UnresolvedMockedStatic(reference.to_string()))?;
            mocked_classes.push(class.to_string());
        }
    }

    let mut planned = PlannedEdits::default();
    let needs_new_in_order = target.uses_in_order() && all_parts.iter().any(|p| p.in_order.is_none());
    let new_in_order = if needs_new_in_order {
        let name = inorder::fresh_name(file, in_order_base);
        let args = if mocked_classes.is_empty() {
            inorder::unique(all_parts.iter().filter_map(|p| p.mock.clone()))
        } else {
            inorder::unique(mocked_classes)
        };
        if let Some(first) = sites.first() {
            planned.edits.push(inorder::declare(file, first.statement_start, &name, &args));
        }
        planned.imports.extend([IN_ORDER, MOCKITO]);
        Some(name)
    } else {
        None
    };

    for (site, parts) in sites.iter().zip(&all_parts) {
        let in_order = parts.in_order.as_deref().or(new_in_order.as_deref());
        let head = render_head(target, parts, in_order).ok_or_else(|| invalid("incomplete verification head"))?;
        let head_end = site.chain[parts.head_len - 1].span.end;
        planned.edits.push(TextEdit::replace(Span::new(site.chain.span().start, head_end), head));
    }
    if target == VerificationTarget::MockitoVerify {
        planned.imports.push(MOCKITO);
    } else if target.family() == Family::Bdd {
        planned.imports.push(BDD_MOCKITO);
    }
    Ok(planned)
}

/// Ordering constraints between the source chains and the target.
///
/// Unordered targets drop the `InOrder`, the same way for every ordered source.
fn check_in_order_use(
    source: VerificationKind,
    target: VerificationTarget,
    parts: &[VerificationParts],
    invalid: &dyn Fn(&str) -> Rejection,
) -> Result<(), Rejection> {
    if source != VerificationKind::BddMockitoThenShould {
        return Ok(());
    }
    let ordered = parts.iter().filter(|p| p.in_order.is_some()).count();
    match target {
        VerificationTarget::AddInOrderToBdd if ordered > 0 => Err(invalid("should() already takes an InOrder")),
        VerificationTarget::InOrderVerify => {
            let first = parts.first().and_then(|p| p.in_order.as_deref());
            if parts.iter().all(|p| p.in_order.as_deref() == first) {
                Ok(())
            } else {
                Err(Rejection::MixedInOrder)
            }
        }
        _ => Ok(()),
    }
}

fn render_head(target: VerificationTarget, parts: &VerificationParts, in_order: Option<&str>) -> Option<String> {
    let mode = parts.mode.as_deref();
    let with_mode = |first: &str| match mode {
        Some(mode) => format!("{first}, {mode}"),
        None => first.to_string(),
    };
    let head = match target {
        VerificationTarget::MockitoVerify => format!("Mockito.verify({})", with_mode(parts.mock.as_deref()?)),
        VerificationTarget::BddThenShould => {
            format!("BDDMockito.then({}).should({})", parts.mock.as_deref()?, mode.unwrap_or_default())
        }
        VerificationTarget::BddThenShouldInOrder | VerificationTarget::AddInOrderToBdd => {
            format!("BDDMockito.then({}).should({})", parts.mock.as_deref()?, with_mode(in_order?))
        }
        VerificationTarget::InOrderVerify => format!("{}.verify({})", in_order?, with_mode(parts.mock.as_deref()?)),
        VerificationTarget::InOrderVerifyMockedStatic => format!(
            "{}.verify({}, {})",
            in_order?,
            parts.mocked_static.as_deref()?,
            with_mode(parts.verification.as_deref()?)
        ),
        VerificationTarget::MockedStaticVerify => {
            format!("{}.verify({})", parts.mocked_static.as_deref()?, with_mode(parts.verification.as_deref()?))
        }
    };
    Some(head)
}
