//! Dialect grammar registry: the closed set of stubbing and verification approaches.
//!
//! Each dialect is one `static` implementing [`StubbingApproach`] or
//! [`VerificationApproach`]. Classification walks the fixed registries in order and
//! takes the first dialect whose entry point matches.

mod exception;
mod stubbing;
mod verification;

pub use exception::*;
pub use stubbing::*;
pub use verification::*;

use serde::Serialize;

use crate::java::CallChain;

/// Dialect family, as seen by convention enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Family {
    Mockito,
    Bdd,
    /// Mocked-static forms exist only in one spelling
    Neutral,
}

/// Where the stubbing action sits relative to the mock reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StubType {
    /// `when(mock.call()).thenReturn(x)`: action after the mock
    Stubbing,
    /// `doReturn(x).when(mock).call()`: action before the mock
    Stubber,
}

/// Result of classifying a chain.
#[derive(Clone, Copy)]
pub enum Classification {
    Stubbing(&'static dyn StubbingApproach),
    Verification(&'static dyn VerificationApproach),
}

impl Classification {
    pub fn presentable(&self) -> &'static str {
        match self {
            Classification::Stubbing(a) => a.presentable(),
            Classification::Verification(a) => a.presentable(),
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Classification::Stubbing(a) => a.kind().as_str(),
            Classification::Verification(a) => a.kind().as_str(),
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Classification::Stubbing(a) => a.family(),
            Classification::Verification(a) => a.family(),
        }
    }

    pub fn invalid_reason(&self, chain: &CallChain) -> Option<&'static str> {
        match self {
            Classification::Stubbing(a) => a.invalid_reason(chain),
            Classification::Verification(a) => a.invalid_reason(chain),
        }
    }

    pub fn is_valid(&self, chain: &CallChain) -> bool {
        self.invalid_reason(chain).is_none()
    }
}

impl PartialEq for Classification {
    fn eq(&self, other: &Self) -> bool {
        self.kind_str() == other.kind_str()
    }
}

impl std::fmt::Debug for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind_str())
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.presentable())
    }
}

/// The dialect `chain` belongs to, if any.
pub fn classify(chain: &CallChain) -> Option<Classification> {
    if let Some(approach) = STUBBING_APPROACHES.iter().find(|a| a.matches(chain)) {
        return Some(Classification::Stubbing(*approach));
    }
    VERIFICATION_APPROACHES
        .iter()
        .find(|a| a.matches(chain))
        .map(|a| Classification::Verification(*a))
}

/// Every dialect whose entry point matches `chain`. At most one for any input.
pub fn matching_approaches(chain: &CallChain) -> Vec<&'static str> {
    let stubbing = STUBBING_APPROACHES
        .iter()
        .filter(|a| a.matches(chain))
        .map(|a| a.kind().as_str());
    let verification = VERIFICATION_APPROACHES
        .iter()
        .filter(|a| a.matches(chain))
        .map(|a| a.kind().as_str());
    stubbing.chain(verification).collect()
}

#[cfg(test)]
#[path = "approach_tests.rs"]
mod tests;
