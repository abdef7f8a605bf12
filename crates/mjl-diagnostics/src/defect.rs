use mjl_source::LineIndex;
use mjl_source::Severity;
use mjl_source::Span;
use mjl_structure::StructureError;
use mjl_templates::SectionError;
use mjl_templates::TagError;
use serde::Serialize;

/// Which validation pass produced a defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Pass {
    TagSyntax,
    SectionStructure,
    LiteralStructure,
    Engine,
}

/// A fully resolved defect, positioned for presentation.
///
/// Lines are 1-based and columns 0-based byte offsets within the line. The
/// span-to-position conversion happens exactly once, here at construction;
/// downstream consumers never touch the line index again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Defect {
    pub code: &'static str,
    pub message: String,
    pub severity: Severity,
    pub line: u32,
    pub column: u32,
    pub length: u32,
    pub pass: Pass,
}

impl Defect {
    fn at_span(
        code: &'static str,
        message: String,
        severity: Severity,
        span: Span,
        line_index: &LineIndex,
        pass: Pass,
    ) -> Self {
        let position = line_index.to_line_col(span.start_offset());
        Self {
            code,
            message,
            severity,
            line: position.line() + 1,
            column: position.column(),
            length: span.length().max(1),
            pass,
        }
    }

    #[must_use]
    pub fn from_tag_error(error: &TagError, line_index: &LineIndex) -> Self {
        Self::at_span(
            error.code(),
            error.to_string(),
            error.severity(),
            error.span(),
            line_index,
            Pass::TagSyntax,
        )
    }

    #[must_use]
    pub fn from_section_error(error: &SectionError, line_index: &LineIndex) -> Self {
        Self::at_span(
            error.code(),
            error.to_string(),
            error.severity(),
            error.span(),
            line_index,
            Pass::SectionStructure,
        )
    }

    #[must_use]
    pub fn from_structure_error(error: &StructureError, line_index: &LineIndex) -> Self {
        Self::at_span(
            error.code(),
            error.to_string(),
            error.severity(),
            error.span(),
            line_index,
            Pass::LiteralStructure,
        )
    }

    /// A validation pass failed internally. The document is reported as
    /// unverifiable rather than clean.
    #[must_use]
    pub fn internal_fault(pass: &str, detail: &str) -> Self {
        Self {
            code: "E100",
            message: format!("Internal fault in {pass} pass ({detail}); results are incomplete"),
            severity: Severity::Error,
            line: 1,
            column: 0,
            length: 1,
            pass: Pass::Engine,
        }
    }

    /// The document exceeds the configured size ceiling and was not scanned.
    #[must_use]
    pub fn too_large(actual: usize, limit: usize) -> Self {
        Self {
            code: "E101",
            message: format!("Document is {actual} bytes, over the {limit} byte limit; skipped"),
            severity: Severity::Warning,
            line: 1,
            column: 0,
            length: 1,
            pass: Pass::Engine,
        }
    }
}
