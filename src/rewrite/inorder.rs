//! Introducing `InOrder` locals.

use super::TextEdit;
use crate::java::JavaFile;

/// `base`, or `base2`, `base3`, ... whichever is not yet spelled in the file.
pub fn fresh_name(file: &JavaFile, base: &str) -> String {
    let taken = file.identifiers();
    if !taken.contains(base) {
        return base.to_string();
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{base}{suffix}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Order-preserving de-duplication.
pub fn unique(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// `InOrder name = Mockito.inOrder(args);` right before the statement at `statement_start`.
///
/// On its own line with the statement's indentation, unless code precedes the
/// statement on that line.
pub fn declare(file: &JavaFile, statement_start: usize, name: &str, args: &[String]) -> TextEdit {
    let source = file.source();
    let line_start = source[..statement_start].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &source[line_start..statement_start];
    let declaration = format!("InOrder {name} = Mockito.inOrder({});", args.join(", "));
    if prefix.trim().is_empty() {
        TextEdit::insert(line_start, format!("{prefix}{declaration}\n"))
    } else {
        TextEdit::insert(statement_start, format!("{declaration} "))
    }
}
