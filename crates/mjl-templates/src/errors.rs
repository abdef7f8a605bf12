use mjl_source::Severity;
use mjl_source::Span;
use serde::Serialize;
use thiserror::Error;

/// Defects raised directly by the tag scanner.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
pub enum TagError {
    #[error("Unclosed tag: missing closing '}}}}'")]
    UnclosedTag { span: Span },

    #[error("Malformed brace run")]
    MalformedBraces { span: Span },

    #[error("Tag start inside an unclosed tag")]
    NestedTag { span: Span },

    #[error("Empty tag")]
    EmptyTag { span: Span },

    #[error("Section sigil with no following name")]
    MissingSectionName { span: Span },

    #[error("Invalid tag name: '{name}'")]
    InvalidTagName { name: String, span: Span },
}

impl TagError {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            TagError::UnclosedTag { span }
            | TagError::MalformedBraces { span }
            | TagError::NestedTag { span }
            | TagError::EmptyTag { span }
            | TagError::MissingSectionName { span }
            | TagError::InvalidTagName { span, .. } => *span,
        }
    }

    /// Stable machine-readable identifier for this defect class.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            TagError::UnclosedTag { .. } => "T100",
            TagError::MalformedBraces { .. } => "T101",
            TagError::NestedTag { .. } => "T102",
            TagError::EmptyTag { .. } => "T103",
            TagError::MissingSectionName { .. } => "T104",
            TagError::InvalidTagName { .. } => "T105",
        }
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

/// Defects raised by the section stack validator.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
pub enum SectionError {
    #[error("Unclosed section: '{name}'")]
    UnclosedSection { name: String, span: Span },

    #[error("Unexpected closing section '{name}': no matching opening section")]
    UnexpectedCloser { name: String, span: Span },

    #[error("Mismatched section: expected close for '{expected}', found close for '{found}'")]
    MismatchedSection {
        expected: String,
        found: String,
        span: Span,
    },

    /// Companion to [`SectionError::MismatchedSection`], pointing at the
    /// opener the closer should have matched.
    #[error("Section '{name}' opened here")]
    SectionOpenedHere { name: String, span: Span },

    #[error("Section nesting deeper than {limit} levels")]
    DepthExceeded { limit: usize, span: Span },

    #[error("Section '{name}' reopened inside itself")]
    SameNameReentry { name: String, span: Span },
}

impl SectionError {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            SectionError::UnclosedSection { span, .. }
            | SectionError::UnexpectedCloser { span, .. }
            | SectionError::MismatchedSection { span, .. }
            | SectionError::SectionOpenedHere { span, .. }
            | SectionError::DepthExceeded { span, .. }
            | SectionError::SameNameReentry { span, .. } => *span,
        }
    }

    /// Stable machine-readable identifier for this defect class.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            SectionError::UnclosedSection { .. } => "S100",
            SectionError::UnexpectedCloser { .. } => "S101",
            SectionError::MismatchedSection { .. } => "S102",
            SectionError::SectionOpenedHere { .. } => "S103",
            SectionError::DepthExceeded { .. } => "S104",
            SectionError::SameNameReentry { .. } => "S105",
        }
    }

    /// Deeply nested documents are discouraged, not invalid; same-name
    /// re-entrancy is a heuristic. Everything else is a genuine defect.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            SectionError::UnclosedSection { .. }
            | SectionError::UnexpectedCloser { .. }
            | SectionError::MismatchedSection { .. } => Severity::Error,
            SectionError::SectionOpenedHere { .. } => Severity::Info,
            SectionError::DepthExceeded { .. } => Severity::Warning,
            SectionError::SameNameReentry { .. } => Severity::Hint,
        }
    }
}
