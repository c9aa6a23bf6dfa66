//! Folding consecutive stubbing calls and toggling throw argument spelling.

use super::TextEdit;
use crate::Rejection;
use crate::approach::{ConsecutiveRun, StubbingApproach, TypeConversion, throw_argument_conversion};
use crate::java::{CallChain, CallNode, Span};

/// `thenThrow(A.class).thenThrow(B.class)` → `thenThrow(A.class, B.class)`.
///
/// Replaces the first call's name through the end of the last call of the run.
pub fn plan_merge(chain: &CallChain, run: &ConsecutiveRun, conversion: TypeConversion) -> Result<TextEdit, Rejection> {
    let (Some(&first), Some(&last)) = (run.indices.first(), run.indices.last()) else {
        return Err(Rejection::NothingToMerge);
    };
    if run.indices.len() < 2 {
        return Err(Rejection::NothingToMerge);
    }
    if !run.conversions().contains(&conversion) {
        return Err(Rejection::ArgumentsNotConvertible(run.method.clone()));
    }
    let args: Vec<String> = run
        .indices
        .iter()
        .flat_map(|&i| chain[i].args.iter())
        .map(|arg| conversion.convert(arg))
        .collect();
    let first = &chain[first];
    Ok(TextEdit::replace(
        Span::new(first.name_span.start, chain[last].span.end),
        format!("{}({})", first.name, args.join(", ")),
    ))
}

/// Class literals to instances or default instances to class literals, in one throw call.
pub fn plan_throw_arguments(call: &CallNode, approach: &dyn StubbingApproach) -> Result<Vec<TextEdit>, Rejection> {
    let conversion = throw_argument_conversion(call, approach)
        .ok_or_else(|| Rejection::ArgumentsNotConvertible(call.name.clone()))?;
    Ok(call
        .args
        .iter()
        .map(|arg| TextEdit::replace(arg.span, conversion.convert(arg)))
        .collect())
}
