use mjl_source::Severity;
use mjl_source::Span;
use serde::Serialize;
use thiserror::Error;

/// Defects in the data-interchange layer's literal syntax.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
pub enum StructureError {
    #[error("Unclosed '{bracket}'")]
    UnclosedBracket { bracket: char, span: Span },

    #[error("Unexpected closing '{bracket}'")]
    UnexpectedCloser { bracket: char, span: Span },

    #[error("Trailing separator before closing bracket")]
    TrailingSeparator { span: Span },

    #[error("Key '{key}' must be wrapped in double quotes")]
    UnquotedKey { key: String, span: Span },

    #[error("String literals must use double quotes")]
    SingleQuotedString { span: Span },

    #[error("Numeric literal with leading zero")]
    LeadingZero { span: Span },

    #[error("Invalid escape sequence")]
    InvalidEscape { span: Span },

    #[error("Control character inside string literal")]
    ControlCharacter { span: Span },

    #[error("Unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("Invalid literal document: {message}")]
    ParseFailure { message: String, span: Span },
}

impl StructureError {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            StructureError::UnclosedBracket { span, .. }
            | StructureError::UnexpectedCloser { span, .. }
            | StructureError::TrailingSeparator { span }
            | StructureError::UnquotedKey { span, .. }
            | StructureError::SingleQuotedString { span }
            | StructureError::LeadingZero { span }
            | StructureError::InvalidEscape { span }
            | StructureError::ControlCharacter { span }
            | StructureError::UnterminatedString { span }
            | StructureError::ParseFailure { span, .. } => *span,
        }
    }

    /// Stable machine-readable identifier for this defect class.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            StructureError::UnclosedBracket { .. } => "L100",
            StructureError::UnexpectedCloser { .. } => "L101",
            StructureError::TrailingSeparator { .. } => "L102",
            StructureError::UnquotedKey { .. } => "L103",
            StructureError::SingleQuotedString { .. } => "L104",
            StructureError::LeadingZero { .. } => "L105",
            StructureError::InvalidEscape { .. } => "L106",
            StructureError::ControlCharacter { .. } => "L107",
            StructureError::UnterminatedString { .. } => "L108",
            StructureError::ParseFailure { .. } => "L109",
        }
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}
