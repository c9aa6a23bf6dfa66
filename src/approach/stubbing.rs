//! The four stubbing dialects.

use std::ops::Range;

use serde::Serialize;

use super::{ExceptionStubber, Family, StubType};
use crate::java::{CallChain, CallNode, MockitoClass, MockitoType};

// ─── Setters ─────────────────────────────────────────────────────────

/// Semantic family of a stubbing action, shared by every dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Setter {
    Return,
    Throw,
    Answer,
    /// `then(answer)` / `will(answer)`
    AnswerAlias,
    CallRealMethod,
    Nothing,
}

impl Setter {
    pub const ALL: [Setter; 6] = [
        Setter::Return,
        Setter::Throw,
        Setter::Answer,
        Setter::AnswerAlias,
        Setter::CallRealMethod,
        Setter::Nothing,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Method name per setter family, `None` where the dialect has no such method.
pub type SetterTable = [Option<&'static str>; 6];

// ─── Kinds ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StubbingKind {
    MockitoWhen,
    MockitoDoX,
    BddMockitoGiven,
    BddMockitoWillX,
}

impl StubbingKind {
    pub const ALL: [StubbingKind; 4] = [
        StubbingKind::MockitoWhen,
        StubbingKind::MockitoDoX,
        StubbingKind::BddMockitoGiven,
        StubbingKind::BddMockitoWillX,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MockitoWhen => "mockito-when",
            Self::MockitoDoX => "mockito-do-x",
            Self::BddMockitoGiven => "bddmockito-given",
            Self::BddMockitoWillX => "bddmockito-will-x",
        }
    }

    pub fn approach(&self) -> &'static dyn StubbingApproach {
        match self {
            Self::MockitoWhen => &MOCKITO_WHEN,
            Self::MockitoDoX => &MOCKITO_DO_X,
            Self::BddMockitoGiven => &BDDMOCKITO_GIVEN,
            Self::BddMockitoWillX => &BDDMOCKITO_WILL_X,
        }
    }
}

impl std::fmt::Display for StubbingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StubbingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StubbingKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown stubbing approach '{s}'"))
    }
}

// ─── Approach trait ──────────────────────────────────────────────────

/// One stubbing dialect grammar.
pub trait StubbingApproach: Sync {
    fn kind(&self) -> StubbingKind;
    fn stub_type(&self) -> StubType;
    fn entry_class(&self) -> MockitoClass;
    /// `when` or `given`
    fn entry_name(&self) -> &'static str;
    fn presentable(&self) -> &'static str;
    fn setter_name(&self, setter: Setter) -> Option<&'static str>;
    fn exception_stubber(&self) -> &ExceptionStubber;

    /// Whether `call` is this dialect's entry point.
    fn is_stubbed_by(&self, call: &CallNode) -> bool;
    /// Whether `call` is one of this dialect's setters.
    fn is_any_of_stubs(&self, call: &CallNode) -> bool;
    /// Whether `chain` starts the way this dialect starts.
    fn matches(&self, chain: &CallChain) -> bool;
    /// Why a matched chain is ill-formed, if it is.
    fn invalid_reason(&self, chain: &CallChain) -> Option<&'static str>;
    fn stubbed_call<'c>(&self, chain: &'c CallChain) -> Option<&'c CallNode>;
    fn stubbed_mock<'c>(&self, chain: &'c CallChain) -> Option<&'c str>;
    /// Chain indices holding setter calls.
    fn setter_range(&self, chain: &CallChain) -> Range<usize>;

    fn is_valid(&self, chain: &CallChain) -> bool {
        self.matches(chain) && self.invalid_reason(chain).is_none()
    }

    fn setter_of(&self, name: &str) -> Option<Setter> {
        Setter::ALL.into_iter().find(|s| self.setter_name(*s) == Some(name))
    }

    fn family(&self) -> Family {
        match self.entry_class() {
            MockitoClass::Mockito => Family::Mockito,
            MockitoClass::BddMockito => Family::Bdd,
        }
    }
}

impl std::fmt::Debug for dyn StubbingApproach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.presentable())
    }
}

// ─── Action after the mock: when(mock.call()).thenX() ────────────────

/// Dialects whose entry call wraps the stubbed call: `when`/`given`.
pub struct StubbingFirst {
    kind: StubbingKind,
    class: MockitoClass,
    entry: &'static str,
    stubbing_type: MockitoType,
    presentable: &'static str,
    setters: SetterTable,
    exception: ExceptionStubber,
}

impl StubbingApproach for StubbingFirst {
    fn kind(&self) -> StubbingKind {
        self.kind
    }

    fn stub_type(&self) -> StubType {
        StubType::Stubbing
    }

    fn entry_class(&self) -> MockitoClass {
        self.class
    }

    fn entry_name(&self) -> &'static str {
        self.entry
    }

    fn presentable(&self) -> &'static str {
        self.presentable
    }

    fn setter_name(&self, setter: Setter) -> Option<&'static str> {
        self.setters[setter.index()]
    }

    fn exception_stubber(&self) -> &ExceptionStubber {
        &self.exception
    }

    fn is_stubbed_by(&self, call: &CallNode) -> bool {
        call.name == self.entry
            && call.receiver.is_static(self.class)
            && call.args.len() == 1
            && call.args[0].as_call().is_some()
    }

    fn is_any_of_stubs(&self, call: &CallNode) -> bool {
        call.receiver.is_instance(self.stubbing_type) && self.setter_of(&call.name).is_some()
    }

    fn matches(&self, chain: &CallChain) -> bool {
        chain.first().is_some_and(|call| self.is_stubbed_by(call))
    }

    fn invalid_reason(&self, chain: &CallChain) -> Option<&'static str> {
        (chain.len() < 2).then_some("nothing is chained after the entry call")
    }

    fn stubbed_call<'c>(&self, chain: &'c CallChain) -> Option<&'c CallNode> {
        chain.first()?.arg(0)?.as_call()
    }

    fn stubbed_mock<'c>(&self, chain: &'c CallChain) -> Option<&'c str> {
        self.stubbed_call(chain)?.qualifier_text()
    }

    fn setter_range(&self, chain: &CallChain) -> Range<usize> {
        1.min(chain.len())..chain.len()
    }
}

// ─── Action before the mock: doX().when(mock).call() ─────────────────

/// Dialects that start with the action and name the mock in a trailing `when`/`given`.
pub struct StubberFirst {
    kind: StubbingKind,
    class: MockitoClass,
    entry: &'static str,
    stubber_type: MockitoType,
    presentable: &'static str,
    setters: SetterTable,
    exception: ExceptionStubber,
}

impl StubberFirst {
    fn entry_index(&self, chain: &CallChain) -> Option<usize> {
        chain.iter().position(|call| self.is_stubbed_by(call))
    }
}

impl StubbingApproach for StubberFirst {
    fn kind(&self) -> StubbingKind {
        self.kind
    }

    fn stub_type(&self) -> StubType {
        StubType::Stubber
    }

    fn entry_class(&self) -> MockitoClass {
        self.class
    }

    fn entry_name(&self) -> &'static str {
        self.entry
    }

    fn presentable(&self) -> &'static str {
        self.presentable
    }

    fn setter_name(&self, setter: Setter) -> Option<&'static str> {
        self.setters[setter.index()]
    }

    fn exception_stubber(&self) -> &ExceptionStubber {
        &self.exception
    }

    fn is_stubbed_by(&self, call: &CallNode) -> bool {
        call.name == self.entry && call.receiver.is_instance(self.stubber_type) && call.args.len() == 1
    }

    fn is_any_of_stubs(&self, call: &CallNode) -> bool {
        self.setter_of(&call.name).is_some()
            && (call.receiver.is_static(self.class) || call.receiver.is_instance(self.stubber_type))
    }

    fn matches(&self, chain: &CallChain) -> bool {
        chain
            .first()
            .is_some_and(|call| call.receiver.is_static(self.class) && self.setter_of(&call.name).is_some())
    }

    fn invalid_reason(&self, chain: &CallChain) -> Option<&'static str> {
        if chain.len() < 3 {
            return Some("expected a setter, the entry call and the stubbed call");
        }
        let entry = &chain[chain.len() - 2];
        if !self.is_stubbed_by(entry) {
            return Some("the second-to-last call is not the entry call");
        }
        if !entry.args[0].is_reference() {
            return Some("the entry call argument is not a mock reference");
        }
        None
    }

    fn stubbed_call<'c>(&self, chain: &'c CallChain) -> Option<&'c CallNode> {
        chain.get(self.entry_index(chain)? + 1)
    }

    fn stubbed_mock<'c>(&self, chain: &'c CallChain) -> Option<&'c str> {
        let entry = &chain[self.entry_index(chain)?];
        Some(entry.arg(0)?.text.as_str())
    }

    fn setter_range(&self, chain: &CallChain) -> Range<usize> {
        0..self.entry_index(chain).unwrap_or(chain.len())
    }
}

// ─── Registry values ─────────────────────────────────────────────────

pub static MOCKITO_WHEN: StubbingFirst = StubbingFirst {
    kind: StubbingKind::MockitoWhen,
    class: MockitoClass::Mockito,
    entry: "when",
    stubbing_type: MockitoType::OngoingStubbing,
    presentable: "Mockito.when()",
    setters: [
        Some("thenReturn"),
        Some("thenThrow"),
        Some("thenAnswer"),
        Some("then"),
        Some("thenCallRealMethod"),
        None,
    ],
    exception: ExceptionStubber::new("thenThrow", MockitoType::OngoingStubbing, None),
};

pub static MOCKITO_DO_X: StubberFirst = StubberFirst {
    kind: StubbingKind::MockitoDoX,
    class: MockitoClass::Mockito,
    entry: "when",
    stubber_type: MockitoType::Stubber,
    presentable: "Mockito.doX()",
    setters: [
        Some("doReturn"),
        Some("doThrow"),
        Some("doAnswer"),
        None,
        Some("doCallRealMethod"),
        Some("doNothing"),
    ],
    exception: ExceptionStubber::new("doThrow", MockitoType::Stubber, Some(MockitoClass::Mockito)),
};

pub static BDDMOCKITO_GIVEN: StubbingFirst = StubbingFirst {
    kind: StubbingKind::BddMockitoGiven,
    class: MockitoClass::BddMockito,
    entry: "given",
    stubbing_type: MockitoType::BddOngoingStubbing,
    presentable: "BDDMockito.given()",
    setters: [
        Some("willReturn"),
        Some("willThrow"),
        Some("willAnswer"),
        Some("will"),
        Some("willCallRealMethod"),
        None,
    ],
    exception: ExceptionStubber::new("willThrow", MockitoType::BddOngoingStubbing, None),
};

pub static BDDMOCKITO_WILL_X: StubberFirst = StubberFirst {
    kind: StubbingKind::BddMockitoWillX,
    class: MockitoClass::BddMockito,
    entry: "given",
    stubber_type: MockitoType::BddStubber,
    presentable: "BDDMockito.willX()",
    setters: [
        Some("willReturn"),
        Some("willThrow"),
        Some("willAnswer"),
        Some("will"),
        Some("willCallRealMethod"),
        Some("willDoNothing"),
    ],
    exception: ExceptionStubber::new("willThrow", MockitoType::BddStubber, Some(MockitoClass::BddMockito)),
};

/// Fixed registry order, also the order targets are offered in.
pub static STUBBING_APPROACHES: [&dyn StubbingApproach; 4] =
    [&MOCKITO_WHEN, &MOCKITO_DO_X, &BDDMOCKITO_GIVEN, &BDDMOCKITO_WILL_X];

/// `mocked.when(() -> Util.load())...`: stubbing through a `MockedStatic`.
///
/// Not a conversion source; its setters are `OngoingStubbing` calls, so run analysis
/// treats it as a [`MOCKITO_WHEN`] chain.
pub fn is_mocked_static_stubbing(chain: &CallChain) -> bool {
    chain.first().is_some_and(|call| {
        call.name == "when"
            && call.receiver.is_instance(MockitoType::MockedStatic)
            && call.args.len() == 1
            && call.args[0].is_functional()
    })
}
