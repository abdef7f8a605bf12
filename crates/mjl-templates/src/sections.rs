use mjl_source::LineIndex;
use mjl_source::Span;

use crate::errors::SectionError;
use crate::tokens::TagKind;
use crate::tokens::TagToken;

/// Nesting beyond this depth is reported (as a warning) but still matched.
pub const MAX_SECTION_DEPTH: usize = 10;

struct SectionFrame {
    name: String,
    span: Span,
    line: u32,
}

/// Match opening and closing section tags with a stack.
///
/// Matching is always against the top of the stack (last opened, first
/// closed) regardless of name. That tie-break governs which message an
/// ambiguous nesting bug produces: a same-named mismatch two levels deep
/// reports against the immediate parent, never an outer same-named frame.
///
/// The line index only serves the same-name re-entrancy heuristic; no text
/// rescanning happens here.
#[must_use]
pub fn validate_sections(tokens: &[TagToken], line_index: &LineIndex) -> Vec<SectionError> {
    let mut stack: Vec<SectionFrame> = Vec::new();
    let mut errors = Vec::new();

    for token in tokens {
        match token.kind {
            TagKind::Open | TagKind::Inverted => {
                if stack.len() >= MAX_SECTION_DEPTH {
                    errors.push(SectionError::DepthExceeded {
                        limit: MAX_SECTION_DEPTH,
                        span: token.span,
                    });
                }

                let line = line_index.to_line_col(token.span.start_offset()).line();
                // Re-opening a name already on the stack is usually a typo'd
                // closer, except when both openers share a line: that is the
                // inline-alternatives idiom and stays quiet.
                if stack
                    .iter()
                    .any(|frame| frame.name == token.name && frame.line != line)
                {
                    errors.push(SectionError::SameNameReentry {
                        name: token.name.clone(),
                        span: token.span,
                    });
                }

                stack.push(SectionFrame {
                    name: token.name.clone(),
                    span: token.span,
                    line,
                });
            }
            TagKind::Close => match stack.pop() {
                None => {
                    errors.push(SectionError::UnexpectedCloser {
                        name: token.name.clone(),
                        span: token.span,
                    });
                }
                Some(frame) => {
                    if frame.name != token.name {
                        errors.push(SectionError::MismatchedSection {
                            expected: frame.name.clone(),
                            found: token.name.clone(),
                            span: token.span,
                        });
                        errors.push(SectionError::SectionOpenedHere {
                            name: frame.name,
                            span: frame.span,
                        });
                    }
                }
            },
            _ => {}
        }
    }

    // Remaining frames are unclosed blocks, reported outermost first.
    for frame in stack {
        errors.push(SectionError::UnclosedSection {
            name: frame.name,
            span: frame.span,
        });
    }

    errors
}
