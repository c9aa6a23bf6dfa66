//! Chain rewriting: selection, eligibility, planning and atomic application.
//!
//! Rewrites run in two phases. The read-only phase classifies the selected chains,
//! validates them against the requested target and the convention policy, and
//! produces a [`RewritePlan`] of byte-span edits. Nothing is written until
//! [`Document::apply`] accepts the whole plan.
//!
//! ```text
//! Classified → ValidatedSingle | ValidatedBulk | Rejected → Rewritten | Failed
//! ```

mod creation;
mod edit;
mod imports;
mod inorder;
mod merge;
mod stubbing;
mod verification;

pub use creation::{plan_creation_to_field, plan_expand_creation, plan_field_to_creation};
pub use edit::*;
pub use imports::plan_imports;
pub use inorder::fresh_name;
pub use merge::{plan_merge, plan_throw_arguments};
pub use stubbing::{plan_stubbing, stubbing_targets};
pub use verification::{VerificationTarget, plan_verification, verification_targets};

use serde::Serialize;
use tracing::{debug, info};
use tree_sitter::Node;

use crate::approach::{
    Classification, Family, MOCKITO_WHEN, StubbingApproach, StubbingKind, TypeConversion, classify,
    is_mocked_static_stubbing, return_runs, throw_runs,
};
use crate::config::DEFAULT_IN_ORDER_VARIABLE;
use crate::convention::ConventionPolicy;
use crate::java::{CallChain, JavaFile, Span, enclosing_statement, is_call, outermost_call};
use crate::{ChainError, Rejection};

// ─── Selection and targets ───────────────────────────────────────────

/// What the user pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// A byte offset inside one chain
    Caret(usize),
    /// Every expression statement inside the span
    Range(Span),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "dialect", content = "target", rename_all = "camelCase")]
pub enum Target {
    Stubbing(StubbingKind),
    Verification(VerificationTarget),
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Stubbing(kind) => kind.as_str(),
            Target::Verification(target) => target.as_str(),
        }
    }

    pub fn presentable(&self) -> &'static str {
        match self {
            Target::Stubbing(kind) => kind.approach().presentable(),
            Target::Verification(target) => target.presentable(),
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Target::Stubbing(kind) => kind.approach().family(),
            Target::Verification(target) => target.family(),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        if let Some(kind) = StubbingKind::ALL.into_iter().find(|k| k.as_str() == wanted) {
            return Ok(Target::Stubbing(kind));
        }
        VerificationTarget::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .map(Target::Verification)
            .ok_or_else(|| format!("Unknown conversion target '{s}'"))
    }
}

/// Where a conversion stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConversionState {
    Classified,
    ValidatedSingle,
    ValidatedBulk,
    Rejected,
    Rewritten,
    Failed,
}

impl std::fmt::Display for ConversionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

// ─── Selected chains ─────────────────────────────────────────────────

/// One classified chain and where its statement starts.
#[derive(Debug, Clone)]
pub struct ChainSite {
    pub chain: CallChain,
    pub statement_start: usize,
}

/// Chains picked by a selection, all of the same dialect.
#[derive(Debug, Clone)]
pub struct SelectedChains {
    pub classification: Classification,
    /// Source order
    pub sites: Vec<ChainSite>,
    pub bulk: bool,
}

/// Edits of one conversion before import handling.
#[derive(Debug, Default)]
pub struct PlannedEdits {
    pub edits: Vec<TextEdit>,
    pub imports: Vec<&'static str>,
}

// ─── Rewriter ────────────────────────────────────────────────────────

/// Read-only planner over one parsed file.
pub struct ChainRewriter<'f> {
    file: &'f JavaFile,
    policy: ConventionPolicy,
    in_order_base: String,
}

impl<'f> ChainRewriter<'f> {
    pub fn new(file: &'f JavaFile, policy: ConventionPolicy) -> Self {
        ChainRewriter { file, policy, in_order_base: DEFAULT_IN_ORDER_VARIABLE.to_string() }
    }

    /// Base name for introduced `InOrder` locals.
    pub fn with_in_order_base(mut self, base: impl Into<String>) -> Self {
        self.in_order_base = base.into();
        self
    }

    pub fn file(&self) -> &JavaFile {
        self.file
    }

    /// Classify the chains under `selection`.
    pub fn select(&self, selection: Selection) -> Result<SelectedChains, Rejection> {
        match selection {
            Selection::Caret(offset) => self.select_at(offset),
            Selection::Range(span) => self.select_range(span),
        }
    }

    /// Innermost chain around `offset` that classifies, walking out through arguments.
    fn select_at(&self, offset: usize) -> Result<SelectedChains, Rejection> {
        let mut node = self.file.call_at(offset);
        while let Some(call) = node {
            let chain = self.file.chain_of(call);
            if let Some(classification) = classify(&chain) {
                let outermost = outermost_call(call);
                let statement_start = enclosing_statement(outermost)
                    .map(|s| s.start_byte())
                    .unwrap_or(chain.span().start);
                return Ok(SelectedChains {
                    classification,
                    sites: vec![ChainSite { chain, statement_start }],
                    bulk: false,
                });
            }
            node = outermost_call(call).parent().and_then(enclosing_call);
        }
        Err(Rejection::NotClassified)
    }

    fn select_range(&self, span: Span) -> Result<SelectedChains, Rejection> {
        let statements = self.file.statements_in(span);
        if statements.is_empty() {
            return Err(Rejection::EmptySelection);
        }
        let mut classification: Option<Classification> = None;
        let mut sites = Vec::with_capacity(statements.len());
        for statement in statements {
            let chain = self.file.chain_of_statement(statement).ok_or(Rejection::NotClassified)?;
            let found = classify(&chain).ok_or(Rejection::NotClassified)?;
            match classification {
                Some(first) if first != found => {
                    return Err(Rejection::MixedApproaches {
                        first: first.presentable().to_string(),
                        other: found.presentable().to_string(),
                    });
                }
                Some(_) => {}
                None => classification = Some(found),
            }
            sites.push(ChainSite { chain, statement_start: statement.start_byte() });
        }
        let classification = classification.ok_or(Rejection::EmptySelection)?;
        Ok(SelectedChains { classification, sites, bulk: true })
    }

    /// Every selected chain must be well-formed for its dialect.
    pub fn validate(&self, selected: &SelectedChains) -> Result<(), Rejection> {
        for site in &selected.sites {
            if let Some(reason) = selected.classification.invalid_reason(&site.chain) {
                return Err(Rejection::Invalid {
                    approach: selected.classification.presentable().to_string(),
                    reason: reason.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Targets of the classified dialect, before eligibility checks.
    pub fn candidate_targets(classification: Classification) -> Vec<Target> {
        match classification {
            Classification::Stubbing(approach) => {
                stubbing_targets(approach.kind()).into_iter().map(Target::Stubbing).collect()
            }
            Classification::Verification(approach) => verification_targets(approach.kind())
                .iter()
                .copied()
                .map(Target::Verification)
                .collect(),
        }
    }

    /// Targets that would plan successfully for `selection`, in menu order.
    pub fn available_targets(&self, selection: Selection) -> Vec<Target> {
        let Ok(selected) = self.select(selection) else {
            return Vec::new();
        };
        if self.validate(&selected).is_err() {
            return Vec::new();
        }
        Self::candidate_targets(selected.classification)
            .into_iter()
            .filter(|target| self.plan_selected(&selected, *target).is_ok())
            .collect()
    }

    pub fn is_available(&self, selection: Selection, target: Target) -> bool {
        self.plan(selection, target).is_ok()
    }

    /// Read-only phase of a conversion.
    pub fn plan(&self, selection: Selection, target: Target) -> Result<RewritePlan, ChainError> {
        let selected = self.select(selection)?;
        self.validate(&selected)?;
        self.plan_selected(&selected, target)
    }

    fn plan_selected(&self, selected: &SelectedChains, target: Target) -> Result<RewritePlan, ChainError> {
        if !self.policy.allows(target.family()) {
            return Err(Rejection::TargetNotAllowed { target: target.presentable().to_string() }.into());
        }
        let not_a_target = || Rejection::NotATarget {
            source_approach: selected.classification.presentable().to_string(),
            target: target.presentable().to_string(),
        };
        let mut planned = match (selected.classification, target) {
            (Classification::Stubbing(from), Target::Stubbing(kind)) => {
                let to = kind.approach();
                let mut planned = PlannedEdits::default();
                for site in &selected.sites {
                    planned.edits.push(plan_stubbing(&site.chain, from, to)?);
                }
                planned.imports.push(to.entry_class().fqn());
                planned
            }
            (Classification::Verification(from), Target::Verification(to)) => {
                plan_verification(self.file, &selected.sites, from, to, &self.in_order_base)?
            }
            _ => return Err(not_a_target().into()),
        };
        planned.edits.extend(plan_imports(self.file, &planned.imports));
        let summary = format!(
            "{} → {} ({} chain{})",
            selected.classification.presentable(),
            target.presentable(),
            selected.sites.len(),
            if selected.sites.len() == 1 { "" } else { "s" }
        );
        RewritePlan::new(self.file.revision(), planned.edits, summary)
    }

    /// Fold every consecutive throw and return run of the selected stubbing chains.
    ///
    /// `conversion` applies to throw runs that offer it; other runs take their first option.
    /// Chains stubbed through a `MockedStatic` merge with the `Mockito.when()` grammar.
    pub fn plan_merge(&self, selection: Selection, conversion: Option<TypeConversion>) -> Result<RewritePlan, ChainError> {
        let (approach, sites): (&dyn StubbingApproach, Vec<ChainSite>) = match self.select(selection) {
            Ok(SelectedChains { classification: Classification::Stubbing(approach), sites, .. }) => (approach, sites),
            Ok(_) => return Err(Rejection::NotClassified.into()),
            Err(rejection) => match self.select_mocked_static(selection) {
                Some(sites) => (&MOCKITO_WHEN, sites),
                None => return Err(rejection.into()),
            },
        };
        let mut edits = Vec::new();
        for site in &sites {
            let runs = throw_runs(&site.chain, approach).into_iter().chain(return_runs(&site.chain, approach));
            for run in runs {
                let options = run.conversions();
                let chosen = conversion
                    .filter(|c| options.contains(c))
                    .or_else(|| options.first().copied())
                    .unwrap_or(TypeConversion::NoConversion);
                edits.push(plan_merge(&site.chain, &run, chosen)?);
            }
        }
        if edits.is_empty() {
            return Err(Rejection::NothingToMerge.into());
        }
        let summary = format!("merged {} run{}", edits.len(), if edits.len() == 1 { "" } else { "s" });
        RewritePlan::new(self.file.revision(), edits, summary)
    }

    fn select_mocked_static(&self, selection: Selection) -> Option<Vec<ChainSite>> {
        let site = |chain: CallChain, statement_start: usize| ChainSite { chain, statement_start };
        match selection {
            Selection::Caret(offset) => {
                let mut node = self.file.call_at(offset);
                while let Some(call) = node {
                    let chain = self.file.chain_of(call);
                    if is_mocked_static_stubbing(&chain) {
                        let start = chain.span().start;
                        return Some(vec![site(chain, start)]);
                    }
                    node = outermost_call(call).parent().and_then(enclosing_call);
                }
                None
            }
            Selection::Range(span) => {
                let statements = self.file.statements_in(span);
                let mut sites = Vec::with_capacity(statements.len());
                for statement in statements {
                    let chain = self.file.chain_of_statement(statement).filter(is_mocked_static_stubbing)?;
                    sites.push(site(chain, statement.start_byte()));
                }
                (!sites.is_empty()).then_some(sites)
            }
        }
    }

    /// Toggle class/instance spelling in every eligible throw call of the selection.
    ///
    /// Ineligible calls are skipped; the plan fails only when no call is eligible.
    pub fn plan_throw_arguments(&self, selection: Selection) -> Result<RewritePlan, ChainError> {
        let selected = self.select(selection)?;
        let Classification::Stubbing(approach) = selected.classification else {
            return Err(Rejection::NotClassified.into());
        };
        let stubber = approach.exception_stubber();
        let mut edits = Vec::new();
        let mut skipped: Option<Rejection> = None;
        for site in &selected.sites {
            for index in approach.setter_range(&site.chain) {
                let call = &site.chain[index];
                if !stubber.is_applicable_to(call) {
                    continue;
                }
                match plan_throw_arguments(call, approach) {
                    Ok(call_edits) => edits.extend(call_edits),
                    Err(rejection) => {
                        debug!(call = %call.name, reason = %rejection, "Skipping throw call");
                        skipped.get_or_insert(rejection);
                    }
                }
            }
        }
        if edits.is_empty() {
            let rejection = skipped.unwrap_or_else(|| Rejection::ArgumentsNotConvertible(stubber.method.to_string()));
            return Err(rejection.into());
        }
        RewritePlan::new(self.file.revision(), edits, format!("converted {} throw arguments", approach.presentable()))
    }
}

/// `node` itself or its nearest ancestor that is a call.
fn enclosing_call(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = Some(node);
    while let Some(n) = current {
        if is_call(n) {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

// ─── Pipeline ────────────────────────────────────────────────────────

/// Outcome of [`convert`].
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub state: ConversionState,
    pub source: Option<&'static str>,
    pub target: Target,
    pub chains: usize,
    pub summary: String,
    /// Why the conversion stopped, for `Rejected` and `Failed`
    pub reason: Option<String>,
}

impl ConversionReport {
    fn stopped(state: ConversionState, target: Target, source: Option<&'static str>, reason: String) -> Self {
        ConversionReport { state, source, target, chains: 0, summary: String::new(), reason: Some(reason) }
    }

    pub fn is_rewritten(&self) -> bool {
        self.state == ConversionState::Rewritten
    }
}

/// Full conversion of `document`: parse, classify, validate, plan and apply.
///
/// Rejections come back as a report; only parsing errors are `Err`. The document is
/// either fully rewritten or left untouched.
pub fn convert(
    document: &mut Document,
    selection: Selection,
    target: Target,
    policy: ConventionPolicy,
    in_order_base: &str,
) -> Result<ConversionReport, ChainError> {
    let file = JavaFile::parse(document.text())?;
    let rewriter = ChainRewriter::new(&file, policy).with_in_order_base(in_order_base);

    let selected = match rewriter.select(selection) {
        Ok(selected) => selected,
        Err(rejection) => {
            debug!(state = %ConversionState::Rejected, reason = %rejection, "Selection not classified");
            return Ok(ConversionReport::stopped(ConversionState::Rejected, target, None, rejection.to_string()));
        }
    };
    let source = Some(selected.classification.kind_str());
    debug!(state = %ConversionState::Classified, approach = %selected.classification, chains = selected.sites.len(), "Classified selection");

    if let Err(rejection) = rewriter.validate(&selected) {
        debug!(state = %ConversionState::Rejected, reason = %rejection, "Validation failed");
        return Ok(ConversionReport::stopped(ConversionState::Rejected, target, source, rejection.to_string()));
    }
    let validated = if selected.bulk { ConversionState::ValidatedBulk } else { ConversionState::ValidatedSingle };
    debug!(state = %validated, target = %target, "Selection validated");

    let plan = match rewriter.plan_selected(&selected, target) {
        Ok(plan) => plan,
        Err(ChainError::Unavailable(rejection)) => {
            debug!(state = %ConversionState::Rejected, reason = %rejection, "Target unavailable");
            return Ok(ConversionReport::stopped(ConversionState::Rejected, target, source, rejection.to_string()));
        }
        Err(e) => {
            return Ok(ConversionReport::stopped(ConversionState::Failed, target, source, e.to_string()));
        }
    };

    if let Err(e) = document.apply(&plan) {
        debug!(state = %ConversionState::Failed, error = %e, "Apply failed");
        return Ok(ConversionReport::stopped(ConversionState::Failed, target, source, e.to_string()));
    }
    info!(approach = %selected.classification, target = %target, edits = plan.edits.len(), "Converted chain");
    Ok(ConversionReport {
        state: ConversionState::Rewritten,
        source,
        target,
        chains: selected.sites.len(),
        summary: plan.summary,
        reason: None,
    })
}

#[cfg(test)]
#[path = "rewrite_tests.rs"]
mod tests;
