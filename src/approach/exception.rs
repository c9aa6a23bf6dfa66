//! Exception stubbers and runs of consecutive stubbing calls.
//!
//! A run is a maximal sequence of adjacent calls of one method inside a chain's
//! setter range. Every call after the first can be folded into the first one.

use serde::Serialize;

use super::{Setter, StubbingApproach};
use crate::java::{Arg, ArgKind, CallChain, CallNode, MockitoClass, MockitoType};

// ─── Exception stubber ───────────────────────────────────────────────

/// The throw method of a dialect and where it may be called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExceptionStubber {
    pub method: &'static str,
    /// Instance calls on this type (`OngoingStubbing.thenThrow`)
    pub instance_type: MockitoType,
    /// Static calls on this class (`Mockito.doThrow`), for dialects that start with one
    pub static_class: Option<MockitoClass>,
}

impl ExceptionStubber {
    pub const fn new(
        method: &'static str,
        instance_type: MockitoType,
        static_class: Option<MockitoClass>,
    ) -> Self {
        ExceptionStubber { method, instance_type, static_class }
    }

    pub fn is_applicable_to(&self, call: &CallNode) -> bool {
        call.name == self.method
            && !call.args.is_empty()
            && (call.receiver.is_instance(self.instance_type)
                || self.static_class.is_some_and(|class| call.receiver.is_static(class)))
    }

    /// `thenThrow(A.class, B.class)`: the `Class<? extends Throwable>` overload.
    pub fn is_call_to_classes(&self, call: &CallNode) -> bool {
        self.is_applicable_to(call) && call.args.iter().all(Arg::is_class_literal)
    }

    /// `thenThrow(new A(), ex)`: the `Throwable...` overload.
    pub fn is_call_to_throwables(&self, call: &CallNode) -> bool {
        self.is_applicable_to(call) && !call.args.iter().any(Arg::is_class_literal)
    }
}

// ─── Run analysis ────────────────────────────────────────────────────

/// How the arguments of a throw run are spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamCombination {
    Classes,
    Throwables,
    Mixed,
    /// Mixed, and some throwable is built with constructor arguments
    MixedWithThrowablesPreferred,
}

impl ParamCombination {
    /// Merge options offered for a run with this combination.
    pub fn conversions(&self) -> &'static [TypeConversion] {
        match self {
            ParamCombination::Classes | ParamCombination::Throwables => &[TypeConversion::NoConversion],
            ParamCombination::MixedWithThrowablesPreferred => &[TypeConversion::ToThrowables],
            ParamCombination::Mixed => &[TypeConversion::ToClasses, TypeConversion::ToThrowables],
        }
    }
}

/// Argument rewrite applied while merging a throw run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeConversion {
    NoConversion,
    /// `new X()` → `X.class`
    ToClasses,
    /// `X.class` → `new X()`
    ToThrowables,
}

impl TypeConversion {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeConversion::NoConversion => "none",
            TypeConversion::ToClasses => "classes",
            TypeConversion::ToThrowables => "throwables",
        }
    }

    /// Text of `arg` after conversion.
    pub fn convert(&self, arg: &Arg) -> String {
        match (self, &arg.kind) {
            (TypeConversion::ToClasses, ArgKind::NewInstance { type_name, .. }) => {
                format!("{type_name}.class")
            }
            (TypeConversion::ToThrowables, ArgKind::ClassLiteral { type_name }) => {
                format!("new {type_name}()")
            }
            _ => arg.text.clone(),
        }
    }
}

impl std::fmt::Display for TypeConversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TypeConversion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::NoConversion),
            "classes" => Ok(Self::ToClasses),
            "throwables" => Ok(Self::ToThrowables),
            other => Err(format!("Unknown type conversion '{other}'. Expected: none, classes, throwables")),
        }
    }
}

/// A run of consecutive calls to one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsecutiveRun {
    pub method: String,
    /// Chain indices, ascending and adjacent
    pub indices: Vec<usize>,
    /// Argument spelling, for throw runs only
    pub combination: Option<ParamCombination>,
}

impl ConsecutiveRun {
    /// Calls that can be folded into the first one of the run.
    pub fn mergeable(&self) -> &[usize] {
        &self.indices[1..]
    }

    pub fn conversions(&self) -> &'static [TypeConversion] {
        self.combination
            .map(|c| c.conversions())
            .unwrap_or(&[TypeConversion::NoConversion])
    }
}

/// Runs of `thenThrow`/`doThrow`/`willThrow` calls with at least one argument.
pub fn throw_runs(chain: &CallChain, approach: &dyn StubbingApproach) -> Vec<ConsecutiveRun> {
    let stubber = approach.exception_stubber();
    let mut runs = find_runs(chain, approach, |call| stubber.is_applicable_to(call));
    for run in &mut runs {
        let calls: Vec<&CallNode> = run.indices.iter().map(|&i| &chain[i]).collect();
        run.combination = Some(combination_of(stubber, &calls));
    }
    runs
}

/// Runs of `thenReturn`/`doReturn`/`willReturn` calls.
pub fn return_runs(chain: &CallChain, approach: &dyn StubbingApproach) -> Vec<ConsecutiveRun> {
    let Some(method) = approach.setter_name(Setter::Return) else {
        return Vec::new();
    };
    find_runs(chain, approach, |call| {
        call.name == method && !call.args.is_empty() && approach.is_any_of_stubs(call)
    })
}

/// Every chain index flagged as mergeable into its predecessor.
pub fn mergeable_calls(chain: &CallChain, approach: &dyn StubbingApproach) -> Vec<usize> {
    let mut indices: Vec<usize> = throw_runs(chain, approach)
        .iter()
        .chain(return_runs(chain, approach).iter())
        .flat_map(|run| run.mergeable().to_vec())
        .collect();
    indices.sort_unstable();
    indices
}

fn find_runs(
    chain: &CallChain,
    approach: &dyn StubbingApproach,
    is_member: impl Fn(&CallNode) -> bool,
) -> Vec<ConsecutiveRun> {
    let mut runs = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    for index in approach.setter_range(chain) {
        if is_member(&chain[index]) {
            current.push(index);
            continue;
        }
        flush_run(chain, &mut current, &mut runs);
    }
    flush_run(chain, &mut current, &mut runs);
    runs
}

fn flush_run(chain: &CallChain, current: &mut Vec<usize>, runs: &mut Vec<ConsecutiveRun>) {
    if current.len() > 1 {
        runs.push(ConsecutiveRun {
            method: chain[current[0]].name.clone(),
            indices: std::mem::take(current),
            combination: None,
        });
    }
    current.clear();
}

fn combination_of(stubber: &ExceptionStubber, calls: &[&CallNode]) -> ParamCombination {
    let has_classes = calls.iter().any(|c| stubber.is_call_to_classes(c));
    let throwables: Vec<&&CallNode> = calls.iter().filter(|c| stubber.is_call_to_throwables(c)).collect();
    match (has_classes, throwables.is_empty()) {
        (true, true) => ParamCombination::Classes,
        (false, _) => ParamCombination::Throwables,
        (true, false) => {
            let non_default_ctor = throwables.iter().flat_map(|c| c.args.iter()).any(|arg| {
                matches!(arg.kind, ArgKind::NewInstance { has_args: true, .. })
            });
            if non_default_ctor {
                ParamCombination::MixedWithThrowablesPreferred
            } else {
                ParamCombination::Mixed
            }
        }
    }
}

/// Conversion the class/instance argument toggle would apply to one throw call.
///
/// All class literals become instances; all default-constructed instances become
/// class literals. Anything else is left alone.
pub fn throw_argument_conversion(call: &CallNode, approach: &dyn StubbingApproach) -> Option<TypeConversion> {
    if !approach.exception_stubber().is_applicable_to(call) {
        return None;
    }
    if call.args.iter().all(Arg::is_class_literal) {
        return Some(TypeConversion::ToThrowables);
    }
    let all_default_instances = call
        .args
        .iter()
        .all(|arg| matches!(arg.kind, ArgKind::NewInstance { has_args: false, .. }));
    all_default_instances.then_some(TypeConversion::ToClasses)
}
