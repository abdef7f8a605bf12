use mjl_source::Span;
use serde::Serialize;

/// Lexical classification of a region of source text.
///
/// The scanner partitions the whole document into spans of these kinds;
/// spans are contiguous, non-overlapping, and together cover the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpanKind {
    Text,
    StringLiteral,
    Tag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassifiedSpan {
    pub span: Span,
    pub kind: SpanKind,
}

impl ClassifiedSpan {
    #[must_use]
    pub fn new(kind: SpanKind, start: usize, end: usize) -> Self {
        Self {
            span: Span::from_bounds(start, end),
            kind,
        }
    }
}

/// The directive kind of a template tag, selected by the character
/// immediately following the opening delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TagKind {
    /// `{{#name}}`
    Open,
    /// `{{^name}}`
    Inverted,
    /// `{{/name}}`
    Close,
    /// `{{name}}`
    Variable,
    /// `{{&name}}` or `{{{name}}}`
    VariableUnescaped,
    /// `{{!comment}}`
    Comment,
    /// `{{>partial}}`
    Partial,
}

/// A scanned template tag.
///
/// `name` is empty for malformed tags; emptiness is reported as a defect by
/// the scanner but the token is still emitted so section matching can
/// proceed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagToken {
    pub name: String,
    pub kind: TagKind,
    pub span: Span,
}

impl TagToken {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TagKind, span: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            span,
        }
    }

    /// Whether this token opens a section block.
    #[must_use]
    pub fn opens_section(&self) -> bool {
        matches!(self.kind, TagKind::Open | TagKind::Inverted)
    }
}
