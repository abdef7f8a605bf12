use mjl_source::LineCol;
use mjl_source::LineIndex;
use mjl_source::Span;

use crate::errors::StructureError;

/// Run the text through a strict literal parser and surface the first
/// failure, anchored at the parser's reported position.
///
/// This is a deeper check than the balancer: it catches errors the
/// punctuation scan cannot see, like a missing colon between key and value.
/// The parser reports 1-based line and column; when it cannot attribute a
/// position (both zero) the defect degrades to the start of the text.
#[must_use]
pub fn parse_literal(text: &str, line_index: &LineIndex) -> Option<StructureError> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(_) => None,
        Err(err) => {
            let line = err.line().saturating_sub(1);
            let column = err.column().saturating_sub(1);
            let offset = line_index.offset(LineCol::new(
                u32::try_from(line).unwrap_or(u32::MAX),
                u32::try_from(column).unwrap_or(u32::MAX),
            ));
            Some(StructureError::ParseFailure {
                message: err.to_string(),
                span: Span::from_parts(offset.offset() as usize, 1),
            })
        }
    }
}
