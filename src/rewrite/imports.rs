//! Import insertion for the types a rewrite introduces.

use super::TextEdit;
use crate::java::JavaFile;

/// One insertion adding every `fqns` entry the file cannot already refer to by simple name.
pub fn plan_imports(file: &JavaFile, fqns: &[&str]) -> Option<TextEdit> {
    let mut missing: Vec<&str> = Vec::new();
    for &fqn in fqns {
        if !file.imports().is_importable(fqn) && !missing.contains(&fqn) {
            missing.push(fqn);
        }
    }
    if missing.is_empty() {
        return None;
    }
    let lines: Vec<String> = missing.iter().map(|fqn| format!("import {fqn};")).collect();
    let imports = file.imports();
    let edit = if let Some(end) = imports.last_import_end {
        TextEdit::insert(end, format!("\n{}", lines.join("\n")))
    } else if let Some(end) = imports.package_end {
        TextEdit::insert(end, format!("\n\n{}", lines.join("\n")))
    } else {
        TextEdit::insert(0, format!("{}\n\n", lines.join("\n")))
    };
    Some(edit)
}
