//! The five verification dialects.

use serde::Serialize;

use super::Family;
use crate::java::{Arg, CallChain, CallNode, MockitoClass, MockitoType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VerificationKind {
    MockitoVerify,
    BddMockitoThenShould,
    InOrderVerify,
    InOrderVerifyMockedStatic,
    MockedStaticVerify,
}

impl VerificationKind {
    pub const ALL: [VerificationKind; 5] = [
        VerificationKind::MockitoVerify,
        VerificationKind::BddMockitoThenShould,
        VerificationKind::InOrderVerify,
        VerificationKind::InOrderVerifyMockedStatic,
        VerificationKind::MockedStaticVerify,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MockitoVerify => "mockito-verify",
            Self::BddMockitoThenShould => "bddmockito-then-should",
            Self::InOrderVerify => "inorder-verify",
            Self::InOrderVerifyMockedStatic => "inorder-verify-mocked-static",
            Self::MockedStaticVerify => "mocked-static-verify",
        }
    }

    pub fn approach(&self) -> &'static dyn VerificationApproach {
        match self {
            Self::MockitoVerify => &MOCKITO_VERIFY,
            Self::BddMockitoThenShould => &BDDMOCKITO_THEN_SHOULD,
            Self::InOrderVerify => &INORDER_VERIFY,
            Self::InOrderVerifyMockedStatic => &INORDER_VERIFY_MOCKED_STATIC,
            Self::MockedStaticVerify => &MOCKED_STATIC_VERIFY,
        }
    }
}

impl std::fmt::Display for VerificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pieces of a verification head, spelled as in the source.
///
/// `Mockito.verify(mock, times(2))` → mock `mock`, mode `times(2)`.
/// `inOrder.verify(util, () -> Util.load())` → in-order `inOrder`,
/// mocked static `util`, verification `() -> Util.load()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationParts {
    /// Number of leading chain calls forming the head
    pub head_len: usize,
    pub mock: Option<String>,
    pub mode: Option<String>,
    pub in_order: Option<String>,
    pub mocked_static: Option<String>,
    pub verification: Option<String>,
}

/// One verification dialect grammar.
pub trait VerificationApproach: Sync {
    fn kind(&self) -> VerificationKind;
    fn presentable(&self) -> &'static str;
    fn family(&self) -> Family;

    /// Whether `call` is this dialect's entry call.
    fn is_verified_by(&self, call: &CallNode) -> bool;
    /// Whether the verification runs against an `InOrder`.
    fn is_in_order_specific(&self, chain: &CallChain) -> bool;
    fn verified_call<'c>(&self, chain: &'c CallChain) -> Option<&'c CallNode>;
    /// Head pieces; `None` if the chain does not match.
    fn parts(&self, chain: &CallChain) -> Option<VerificationParts>;

    fn matches(&self, chain: &CallChain) -> bool {
        chain.first().is_some_and(|call| self.is_verified_by(call))
    }

    fn invalid_reason(&self, _chain: &CallChain) -> Option<&'static str> {
        None
    }

    fn is_valid(&self, chain: &CallChain) -> bool {
        self.matches(chain) && self.invalid_reason(chain).is_none()
    }

    fn verified_mock<'c>(&self, chain: &'c CallChain) -> Option<&'c Arg> {
        chain.first()?.arg(0)
    }
}

impl std::fmt::Debug for dyn VerificationApproach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.presentable())
    }
}

fn arg_text(call: &CallNode, index: usize) -> Option<String> {
    call.arg(index).map(|a| a.text.clone())
}

// ─── Mockito.verify(mock[, mode]) ────────────────────────────────────

pub struct MockitoVerify;

impl VerificationApproach for MockitoVerify {
    fn kind(&self) -> VerificationKind {
        VerificationKind::MockitoVerify
    }

    fn presentable(&self) -> &'static str {
        "Mockito.verify()"
    }

    fn family(&self) -> Family {
        Family::Mockito
    }

    fn is_verified_by(&self, call: &CallNode) -> bool {
        call.name == "verify"
            && call.receiver.is_static(MockitoClass::Mockito)
            && (1..=2).contains(&call.args.len())
    }

    fn invalid_reason(&self, chain: &CallChain) -> Option<&'static str> {
        (chain.len() < 2).then_some("nothing is verified after verify()")
    }

    fn is_in_order_specific(&self, _chain: &CallChain) -> bool {
        false
    }

    fn verified_call<'c>(&self, chain: &'c CallChain) -> Option<&'c CallNode> {
        chain.get(1)
    }

    fn parts(&self, chain: &CallChain) -> Option<VerificationParts> {
        let verify = chain.first().filter(|c| self.is_verified_by(c))?;
        Some(VerificationParts {
            head_len: 1,
            mock: arg_text(verify, 0),
            mode: arg_text(verify, 1),
            ..VerificationParts::default()
        })
    }
}

// ─── BDDMockito.then(mock).should([inOrder][, mode]) ─────────────────

pub struct BddThenShould;

impl BddThenShould {
    fn is_should(call: &CallNode) -> bool {
        call.name == "should" && call.receiver.is_instance(MockitoType::Then) && call.args.len() <= 2
    }
}

impl VerificationApproach for BddThenShould {
    fn kind(&self) -> VerificationKind {
        VerificationKind::BddMockitoThenShould
    }

    fn presentable(&self) -> &'static str {
        "BDDMockito.then().should()"
    }

    fn family(&self) -> Family {
        Family::Bdd
    }

    fn is_verified_by(&self, call: &CallNode) -> bool {
        call.name == "then" && call.receiver.is_static(MockitoClass::BddMockito) && call.args.len() == 1
    }

    fn matches(&self, chain: &CallChain) -> bool {
        chain.len() >= 2 && self.is_verified_by(&chain[0]) && Self::is_should(&chain[1])
    }

    fn invalid_reason(&self, chain: &CallChain) -> Option<&'static str> {
        (chain.len() < 3).then_some("nothing is verified after should()")
    }

    fn is_in_order_specific(&self, chain: &CallChain) -> bool {
        chain.get(1).is_some_and(|should| {
            should.args.len() == 2 || should.arg(0).is_some_and(|a| a.ty == Some(MockitoType::InOrder))
        })
    }

    fn verified_call<'c>(&self, chain: &'c CallChain) -> Option<&'c CallNode> {
        chain.get(2)
    }

    fn parts(&self, chain: &CallChain) -> Option<VerificationParts> {
        if !self.matches(chain) {
            return None;
        }
        let should = &chain[1];
        let (in_order, mode) = if self.is_in_order_specific(chain) {
            (arg_text(should, 0), arg_text(should, 1))
        } else {
            (None, arg_text(should, 0))
        };
        Some(VerificationParts {
            head_len: 2,
            mock: arg_text(&chain[0], 0),
            mode,
            in_order,
            ..VerificationParts::default()
        })
    }
}

// ─── inOrder.verify(mock[, mode]) ────────────────────────────────────

pub struct InOrderVerify;

impl VerificationApproach for InOrderVerify {
    fn kind(&self) -> VerificationKind {
        VerificationKind::InOrderVerify
    }

    fn presentable(&self) -> &'static str {
        "InOrder.verify()"
    }

    fn family(&self) -> Family {
        Family::Mockito
    }

    fn is_verified_by(&self, call: &CallNode) -> bool {
        call.name == "verify"
            && call.receiver.is_instance(MockitoType::InOrder)
            && (1..=2).contains(&call.args.len())
            && call.args[0].ty != Some(MockitoType::MockedStatic)
            && !call.arg(1).is_some_and(Arg::is_functional)
    }

    fn invalid_reason(&self, chain: &CallChain) -> Option<&'static str> {
        (chain.len() < 2).then_some("nothing is verified after verify()")
    }

    fn is_in_order_specific(&self, _chain: &CallChain) -> bool {
        true
    }

    fn verified_call<'c>(&self, chain: &'c CallChain) -> Option<&'c CallNode> {
        chain.get(1)
    }

    fn parts(&self, chain: &CallChain) -> Option<VerificationParts> {
        let verify = chain.first().filter(|c| self.is_verified_by(c))?;
        Some(VerificationParts {
            head_len: 1,
            mock: arg_text(verify, 0),
            mode: arg_text(verify, 1),
            in_order: verify.qualifier_text().map(str::to_string),
            ..VerificationParts::default()
        })
    }
}

// ─── inOrder.verify(mockedStatic, verification[, mode]) ──────────────

pub struct InOrderVerifyMockedStatic;

impl VerificationApproach for InOrderVerifyMockedStatic {
    fn kind(&self) -> VerificationKind {
        VerificationKind::InOrderVerifyMockedStatic
    }

    fn presentable(&self) -> &'static str {
        "InOrder.verify(MockedStatic)"
    }

    fn family(&self) -> Family {
        Family::Neutral
    }

    fn is_verified_by(&self, call: &CallNode) -> bool {
        if call.name != "verify" || !call.receiver.is_instance(MockitoType::InOrder) {
            return false;
        }
        match call.args.len() {
            2 => call.args[0].ty == Some(MockitoType::MockedStatic) || call.args[1].is_functional(),
            3 => true,
            _ => false,
        }
    }

    fn is_in_order_specific(&self, _chain: &CallChain) -> bool {
        true
    }

    fn verified_call<'c>(&self, _chain: &'c CallChain) -> Option<&'c CallNode> {
        None
    }

    fn parts(&self, chain: &CallChain) -> Option<VerificationParts> {
        let verify = chain.first().filter(|c| self.is_verified_by(c))?;
        Some(VerificationParts {
            head_len: 1,
            mocked_static: arg_text(verify, 0),
            verification: arg_text(verify, 1),
            mode: arg_text(verify, 2),
            in_order: verify.qualifier_text().map(str::to_string),
            ..VerificationParts::default()
        })
    }
}

// ─── mockedStatic.verify(verification[, mode]) ───────────────────────

pub struct MockedStaticVerify;

impl VerificationApproach for MockedStaticVerify {
    fn kind(&self) -> VerificationKind {
        VerificationKind::MockedStaticVerify
    }

    fn presentable(&self) -> &'static str {
        "MockedStatic.verify()"
    }

    fn family(&self) -> Family {
        Family::Neutral
    }

    fn is_verified_by(&self, call: &CallNode) -> bool {
        call.name == "verify"
            && call.receiver.is_instance(MockitoType::MockedStatic)
            && (1..=2).contains(&call.args.len())
    }

    fn is_in_order_specific(&self, _chain: &CallChain) -> bool {
        false
    }

    fn verified_call<'c>(&self, _chain: &'c CallChain) -> Option<&'c CallNode> {
        None
    }

    fn parts(&self, chain: &CallChain) -> Option<VerificationParts> {
        let verify = chain.first().filter(|c| self.is_verified_by(c))?;
        Some(VerificationParts {
            head_len: 1,
            mocked_static: verify.qualifier_text().map(str::to_string),
            verification: arg_text(verify, 0),
            mode: arg_text(verify, 1),
            ..VerificationParts::default()
        })
    }
}

// ─── Registry values ─────────────────────────────────────────────────

pub static MOCKITO_VERIFY: MockitoVerify = MockitoVerify;
pub static BDDMOCKITO_THEN_SHOULD: BddThenShould = BddThenShould;
pub static INORDER_VERIFY: InOrderVerify = InOrderVerify;
pub static INORDER_VERIFY_MOCKED_STATIC: InOrderVerifyMockedStatic = InOrderVerifyMockedStatic;
pub static MOCKED_STATIC_VERIFY: MockedStaticVerify = MockedStaticVerify;

pub static VERIFICATION_APPROACHES: [&dyn VerificationApproach; 5] = [
    &MOCKITO_VERIFY,
    &BDDMOCKITO_THEN_SHOULD,
    &INORDER_VERIFY,
    &INORDER_VERIFY_MOCKED_STATIC,
    &MOCKED_STATIC_VERIFY,
];
