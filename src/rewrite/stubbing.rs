//! Rewriting a stubbing chain into another stubbing dialect.
//!
//! The chain is re-rendered as a whole: entry call, setters in source order with
//! their arguments untouched, then the stubbed call. Formatting inside setter links
//! survives; the entry call is always spelled with its qualified class.

use super::TextEdit;
use crate::Rejection;
use crate::approach::{StubType, StubbingApproach, StubbingKind};
use crate::java::{CallChain, CallNode, QualifierKind};

/// Every stubbing dialect other than `source`, in registry order.
pub fn stubbing_targets(source: StubbingKind) -> Vec<StubbingKind> {
    StubbingKind::ALL.into_iter().filter(|kind| *kind != source).collect()
}

/// Replacement of the whole chain `from` → `to`.
pub fn plan_stubbing(
    chain: &CallChain,
    from: &dyn StubbingApproach,
    to: &dyn StubbingApproach,
) -> Result<TextEdit, Rejection> {
    if from.kind() == to.kind() {
        return Err(Rejection::NotATarget {
            source_approach: from.presentable().to_string(),
            target: to.presentable().to_string(),
        });
    }
    let invalid = |reason: &str| Rejection::Invalid {
        approach: from.presentable().to_string(),
        reason: reason.to_string(),
    };
    if let Some(reason) = from.invalid_reason(chain) {
        return Err(invalid(reason));
    }

    let mut setters: Vec<(String, &str, &CallNode)> = Vec::new();
    for index in from.setter_range(chain) {
        let call = &chain[index];
        let setter = from
            .setter_of(&call.name)
            .filter(|_| from.is_any_of_stubs(call))
            .ok_or_else(|| invalid(&format!("'{}' is not a stubbing call", call.name)))?;
        let name = to.setter_name(setter).ok_or_else(|| Rejection::UnsupportedSetter {
            method: call.name.clone(),
            target: to.presentable().to_string(),
        })?;
        setters.push((link_of(call), name, call));
    }
    if setters.is_empty() {
        return Err(invalid("no stubbing action"));
    }

    let stubbed = from
        .stubbed_call(chain)
        .ok_or_else(|| invalid("no stubbed call"))?;
    let mock = from
        .stubbed_mock(chain)
        .ok_or_else(|| invalid("the stubbed call has no mock qualifier"))?;
    let reference_mock = stubbed.qualifier.as_ref().is_some_and(|q| q.kind == QualifierKind::Reference);
    if from.stub_type() == StubType::Stubbing && to.stub_type() == StubType::Stubber && !reference_mock {
        return Err(invalid("the stubbed call is not made on a mock reference"));
    }

    let class = to.entry_class().simple_name();
    let entry = to.entry_name();
    let tail = stubbed.tail_text();
    let mut text = String::new();
    match to.stub_type() {
        StubType::Stubbing => {
            text.push_str(&format!("{class}.{entry}({mock}{tail})"));
            for (link, name, call) in &setters {
                text.push_str(&format!("{link}{name}{}", call.args_text));
            }
        }
        StubType::Stubber => {
            text.push_str(class);
            // The first setter stays on the line of the entry class.
            for (index, (link, name, call)) in setters.iter().enumerate() {
                let link = if index == 0 { "." } else { link.as_str() };
                text.push_str(&format!("{link}{name}{}", call.args_text));
            }
            text.push_str(&format!(".{entry}({mock}){tail}"));
        }
    }
    Ok(TextEdit::replace(chain.span(), text))
}

/// Separator before a setter: kept when chained on another call, `.` otherwise.
fn link_of(call: &CallNode) -> String {
    match &call.qualifier {
        Some(q) if q.kind == QualifierKind::Call => call.link.clone(),
        _ => ".".to_string(),
    }
}
