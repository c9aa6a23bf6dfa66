//! Text edits, rewrite plans and the document they are applied to.

use serde::Serialize;

use crate::ChainError;
use crate::java::Span;

/// Replace `span` with `replacement`; an empty span is an insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub span: Span,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(span: Span, replacement: impl Into<String>) -> Self {
        TextEdit { span, replacement: replacement.into() }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        TextEdit { span: Span::at(at), replacement: text.into() }
    }
}

/// Edits planned against one revision of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewritePlan {
    /// Fingerprint of the text the plan was computed from
    pub revision: u64,
    /// Sorted by position, non-overlapping
    pub edits: Vec<TextEdit>,
    pub summary: String,
}

impl RewritePlan {
    /// Sort `edits` and check that no two of them touch the same bytes.
    ///
    /// Insertions at the same offset keep their relative order.
    pub fn new(revision: u64, mut edits: Vec<TextEdit>, summary: impl Into<String>) -> Result<Self, ChainError> {
        edits.sort_by_key(|e| (e.span.start, e.span.end));
        for pair in edits.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.span.end > b.span.start || (!a.span.is_empty() && a.span.start == b.span.start) {
                return Err(ChainError::OverlappingEdits { first: a.span.start, second: b.span.start });
            }
        }
        Ok(RewritePlan { revision, edits, summary: summary.into() })
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Text `source` would have after the plan is applied.
    pub fn preview(&self, source: &str) -> Result<String, ChainError> {
        apply_edits(source, &self.edits)
    }
}

/// Apply sorted, non-overlapping edits to a copy of `source`.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> Result<String, ChainError> {
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in edits {
        let Span { start, end } = edit.span;
        if start < cursor {
            return Err(ChainError::OverlappingEdits { first: cursor, second: start });
        }
        if end < start || end > source.len() || !source.is_char_boundary(start) || !source.is_char_boundary(end) {
            return Err(ChainError::EditOutOfBounds { start, end, len: source.len() });
        }
        out.push_str(&source[cursor..start]);
        out.push_str(&edit.replacement);
        cursor = end;
    }
    out.push_str(&source[cursor..]);
    Ok(out)
}

/// Mutable source text with a revision fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Document { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        crate::stable_hash(&[self.text.as_bytes()])
    }

    /// Apply every edit of `plan` or none of them.
    pub fn apply(&mut self, plan: &RewritePlan) -> Result<(), ChainError> {
        let found = self.revision();
        if found != plan.revision {
            return Err(ChainError::StaleDocument { expected: plan.revision, found });
        }
        let rewritten = apply_edits(&self.text, &plan.edits)?;
        self.text = rewritten;
        Ok(())
    }
}
