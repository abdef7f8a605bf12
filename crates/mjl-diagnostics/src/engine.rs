use std::panic::catch_unwind;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use mjl_source::LineIndex;
use mjl_source::Span;
use mjl_structure::check_structure;
use mjl_structure::parse_literal;
use mjl_templates::validate_sections;
use mjl_templates::TagScanner;

use crate::aggregate::aggregate;
use crate::aggregate::SeverityPolicy;
use crate::defect::Defect;

/// Options for a single validation run.
///
/// Validation is a pure function of text and options; nothing is read from
/// ambient state. `max_length` of `None` disables the size ceiling.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    pub policy: SeverityPolicy,
    pub max_length: Option<usize>,
}

/// Run every validation pass over `text` and aggregate the results.
///
/// Passes run in a fixed order: tag scan, section stack, structural
/// balance, then (for pure data documents whose punctuation checked out)
/// a full literal parse. Each pass is shielded: a panic inside one
/// becomes an internal-fault defect instead of tearing down the caller,
/// and the document is reported as unverifiable rather than clean.
#[must_use]
pub fn validate(text: &str, options: &ValidateOptions) -> Vec<Defect> {
    if let Some(limit) = options.max_length {
        if text.len() > limit {
            // Oversized documents skip scanning entirely. The notice must
            // reach the caller even under a warnings-off policy, so it
            // bypasses aggregation.
            return vec![Defect::too_large(text.len(), limit)];
        }
    }

    let line_index = LineIndex::from_text(text);
    let mut lists: Vec<Vec<Defect>> = Vec::new();

    match shielded("tag scan", || TagScanner::new(text).scan()) {
        Ok(scan) => {
            lists.push(
                scan.errors
                    .iter()
                    .map(|error| Defect::from_tag_error(error, &line_index))
                    .collect(),
            );

            match shielded("section validation", || {
                validate_sections(&scan.tokens, &line_index)
            }) {
                Ok(errors) => lists.push(
                    errors
                        .iter()
                        .map(|error| Defect::from_section_error(error, &line_index))
                        .collect(),
                ),
                Err(fault) => lists.push(vec![fault]),
            }

            let tag_spans: Vec<Span> = scan.tag_spans().collect();
            match shielded("structural balance", || check_structure(text, &tag_spans)) {
                Ok(errors) => {
                    let punctuation_clean = errors.is_empty();
                    lists.push(
                        errors
                            .iter()
                            .map(|error| Defect::from_structure_error(error, &line_index))
                            .collect(),
                    );

                    // The deep literal parse only makes sense for a pure
                    // data document: no template directives, punctuation
                    // already clean, and actual content present. Anything
                    // else would double-report or flag valid templates.
                    if punctuation_clean && scan.tokens.is_empty() && !text.trim().is_empty() {
                        match shielded("literal parse", || parse_literal(text, &line_index)) {
                            Ok(Some(error)) => {
                                lists.push(vec![Defect::from_structure_error(&error, &line_index)]);
                            }
                            Ok(None) => {}
                            Err(fault) => lists.push(vec![fault]),
                        }
                    }
                }
                Err(fault) => lists.push(vec![fault]),
            }
        }
        // Every later pass consumes the scan's spans or tokens, so a
        // faulted scan ends the run with just the fault.
        Err(fault) => lists.push(vec![fault]),
    }

    aggregate(lists, &options.policy)
}

fn shielded<T>(pass: &str, f: impl FnOnce() -> T) -> Result<T, Defect> {
    let started = Instant::now();
    let outcome = catch_unwind(AssertUnwindSafe(f));
    tracing::debug!(pass, elapsed = ?started.elapsed(), "validation pass finished");
    outcome.map_err(|payload| {
        let detail = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("unknown panic");
        Defect::internal_fault(pass, detail)
    })
}

#[cfg(test)]
mod tests {
    use mjl_source::Severity;

    use super::*;
    use crate::defect::Pass;

    fn run(text: &str) -> Vec<Defect> {
        validate(text, &ValidateOptions::default())
    }

    #[test]
    fn matched_template_is_clean() {
        assert!(run("{{#users}}{{name}}{{/users}}").is_empty());
    }

    #[test]
    fn mismatched_closer_reports_error_plus_opener_info() {
        let defects = run("{{#users}}{{name}}{{/user}}");
        assert_eq!(defects.len(), 2);

        // Position sort puts the opener's companion Info first.
        assert_eq!(defects[0].code, "S103");
        assert_eq!(defects[0].severity, Severity::Info);
        assert_eq!((defects[0].line, defects[0].column), (1, 0));

        assert_eq!(defects[1].code, "S102");
        assert_eq!(defects[1].severity, Severity::Error);
        assert_eq!((defects[1].line, defects[1].column), (1, 18));
    }

    #[test]
    fn trailing_comma_reports_exactly_one_error_at_the_comma() {
        let defects = run(r#"{"a": 1,}"#);
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].code, "L102");
        assert_eq!(defects[0].severity, Severity::Error);
        assert_eq!((defects[0].line, defects[0].column), (1, 7));
    }

    #[test]
    fn unclosed_tag_reports_exactly_one_error_at_the_opener() {
        let defects = run("{{ unterminated");
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].code, "T100");
        assert_eq!(defects[0].severity, Severity::Error);
        assert_eq!((defects[0].line, defects[0].column), (1, 0));
    }

    #[test]
    fn single_quoted_string_reports_exactly_one_error_at_the_quote() {
        let defects = run("'single quoted'");
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].code, "L104");
        assert_eq!(defects[0].severity, Severity::Error);
        assert_eq!((defects[0].line, defects[0].column), (1, 0));
    }

    #[test]
    fn valid_data_document_is_clean() {
        assert!(run(r#"{"users": [{"name": "Ada"}, {"name": "Bob"}]}"#).is_empty());
    }

    #[test]
    fn data_document_with_missing_colon_fails_the_literal_parse() {
        let defects = run(r#"{"a" 1}"#);
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].code, "L109");
        assert_eq!(defects[0].pass, Pass::LiteralStructure);
    }

    #[test]
    fn punctuation_defects_suppress_the_literal_parse() {
        // The trailing comma would also fail the parse; only the targeted
        // punctuation defect comes back.
        let defects = run(r#"{"a": 1,}"#);
        assert!(defects.iter().all(|d| d.code != "L109"));
    }

    #[test]
    fn template_presence_suppresses_the_literal_parse() {
        assert!(run(r#"{"a": {{value}}}"#).is_empty());
    }

    #[test]
    fn empty_and_blank_text_are_clean() {
        assert!(run("").is_empty());
        assert!(run("  \n\t\n").is_empty());
    }

    #[test]
    fn validation_is_idempotent() {
        let text = "{{#a}}{{#b}}{{/c}}\n{\"x\": 01,}";
        let first = run(text);
        let second = run(text);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn defects_come_back_in_position_order() {
        let text = "{{/stray}}\n{\"a\": 1,}";
        let defects = run(text);
        let positions: Vec<_> = defects.iter().map(|d| (d.line, d.column)).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn policy_flows_through_to_advisories() {
        let mut source = String::new();
        for i in 0..12 {
            source.push_str(&format!("{{{{#s{i}}}}}"));
        }
        for i in (0..12).rev() {
            source.push_str(&format!("{{{{/s{i}}}}}"));
        }

        assert_eq!(run(&source).len(), 2, "two depth warnings by default");

        let quiet = ValidateOptions {
            policy: SeverityPolicy {
                show_warnings: false,
                show_hints: true,
            },
            max_length: None,
        };
        assert!(validate(&source, &quiet).is_empty());
    }

    #[test]
    fn size_ceiling_short_circuits_even_under_a_quiet_policy() {
        let options = ValidateOptions {
            policy: SeverityPolicy {
                show_warnings: false,
                show_hints: false,
            },
            max_length: Some(4),
        };
        let defects = validate("{{#a}}{{/a}}", &options);
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].code, "E101");
        assert_eq!(defects[0].severity, Severity::Warning);
    }

    #[test]
    fn text_at_the_ceiling_is_still_scanned() {
        let options = ValidateOptions {
            policy: SeverityPolicy::default(),
            max_length: Some(12),
        };
        assert!(validate("{{#a}}{{/a}}", &options).is_empty());
    }
}
