use mjl_source::Span;

use crate::errors::StructureError;

/// Check the data-interchange layer's literal punctuation.
///
/// An independent re-scan of the raw text with the same string/escape
/// tracking rules as the tag scanner, but focused on brackets, quotes and
/// common literal-syntax mistakes. `tag_spans` are the Tag spans the scanner
/// produced, in document order; every byte they cover is skipped, since a
/// template directive's internal punctuation is not data-layer punctuation.
#[must_use]
pub fn check_structure(text: &str, tag_spans: &[Span]) -> Vec<StructureError> {
    Balancer::new(text, tag_spans).check()
}

struct Balancer<'a> {
    source: &'a str,
    current: usize,
    tag_spans: &'a [Span],
    next_tag: usize,
    stack: Vec<(char, usize)>,
    in_string: bool,
    string_start: usize,
    /// Position of a separator awaiting its verdict: cleared by any
    /// significant character, flagged if a closing bracket arrives first.
    pending_comma: Option<usize>,
    errors: Vec<StructureError>,
}

impl<'a> Balancer<'a> {
    fn new(source: &'a str, tag_spans: &'a [Span]) -> Self {
        Self {
            source,
            current: 0,
            tag_spans,
            next_tag: 0,
            stack: Vec::new(),
            in_string: false,
            string_start: 0,
            pending_comma: None,
            errors: Vec::new(),
        }
    }

    fn check(mut self) -> Vec<StructureError> {
        while !self.is_at_end() {
            if self.skip_tag_span() {
                continue;
            }

            if self.in_string {
                self.scan_string_char();
            } else {
                self.scan_char();
            }
        }

        if self.in_string {
            self.errors.push(StructureError::UnterminatedString {
                span: Span::from_parts(self.string_start, 1),
            });
        }

        // Entries still open at end of text, outermost first, each anchored
        // at its opening character.
        let stack = std::mem::take(&mut self.stack);
        for (bracket, position) in stack {
            self.errors.push(StructureError::UnclosedBracket {
                bracket,
                span: Span::from_parts(position, 1),
            });
        }

        self.errors
    }

    /// Jump over the next tag span if the cursor has reached it.
    fn skip_tag_span(&mut self) -> bool {
        while let Some(span) = self.tag_spans.get(self.next_tag) {
            if self.current < span.start_usize() {
                return false;
            }
            self.next_tag += 1;
            if self.current < span.end() as usize {
                self.current = span.end() as usize;
                self.pending_comma = None;
                return true;
            }
        }
        false
    }

    fn scan_char(&mut self) {
        let ch = self.peek();
        match ch {
            '"' => {
                self.string_start = self.current;
                self.in_string = true;
                self.pending_comma = None;
                self.consume();
            }
            '\'' => self.scan_single_quoted(),
            '{' | '[' => {
                self.stack.push((ch, self.current));
                self.pending_comma = None;
                self.consume();
            }
            '}' | ']' => self.scan_closer(ch),
            ',' => {
                self.pending_comma = Some(self.current);
                self.consume();
            }
            c if c.is_whitespace() => self.consume(),
            c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(),
            c if c.is_ascii_digit() => self.scan_number(),
            _ => {
                self.pending_comma = None;
                self.consume();
            }
        }
    }

    fn scan_closer(&mut self, closer: char) {
        if let Some(comma) = self.pending_comma.take() {
            self.errors.push(StructureError::TrailingSeparator {
                span: Span::from_parts(comma, 1),
            });
        }

        let expected_opener = if closer == '}' { '{' } else { '[' };
        match self.stack.last() {
            Some(&(opener, _)) if opener == expected_opener => {
                self.stack.pop();
            }
            // A mismatched closer does not pop: the opener on top is still
            // reported as unclosed at end of text.
            _ => self.errors.push(StructureError::UnexpectedCloser {
                bracket: closer,
                span: Span::from_parts(self.current, 1),
            }),
        }
        self.consume();
    }

    fn scan_single_quoted(&mut self) {
        self.errors.push(StructureError::SingleQuotedString {
            span: Span::from_parts(self.current, 1),
        });
        self.pending_comma = None;
        self.consume();

        // Swallow the quoted run up to the closing quote on this line so its
        // content does not cascade into further defects.
        while !self.is_at_end() {
            let c = self.peek();
            if c == '\n' {
                break;
            }
            self.consume();
            if c == '\'' {
                break;
            }
        }
    }

    fn scan_identifier(&mut self) {
        let start = self.current;
        self.pending_comma = None;
        while !self.is_at_end() {
            let c = self.peek();
            if c.is_ascii_alphanumeric() || c == '_' {
                self.consume();
            } else {
                break;
            }
        }

        // An identifier-like run acting as a key must be quoted.
        let rest = self.source[self.current..].trim_start_matches([' ', '\t']);
        if rest.starts_with(':') {
            self.errors.push(StructureError::UnquotedKey {
                key: self.source[start..self.current].to_string(),
                span: Span::from_bounds(start, self.current),
            });
        }
    }

    fn scan_number(&mut self) {
        let start = self.current;
        self.pending_comma = None;
        let leading_zero = self.peek() == '0';
        self.consume();
        if leading_zero && self.peek().is_ascii_digit() {
            self.errors.push(StructureError::LeadingZero {
                span: Span::from_parts(start, 1),
            });
        }
        while self.peek().is_ascii_digit() || self.peek() == '.' {
            self.consume();
        }
        // Exponent suffix, so `0.5e+1` does not leak an `e` into the
        // identifier scan.
        if matches!(self.peek(), 'e' | 'E') {
            self.consume();
            if matches!(self.peek(), '+' | '-') {
                self.consume();
            }
            while self.peek().is_ascii_digit() {
                self.consume();
            }
        }
    }

    fn scan_string_char(&mut self) {
        let ch = self.peek();
        match ch {
            '\\' => self.scan_escape(),
            '"' => {
                self.in_string = false;
                self.consume();
            }
            // Strings in the literal layer are single-line; a line ending
            // means the string never closed. The newline is reprocessed as
            // ordinary whitespace outside the string.
            '\n' | '\r' => {
                self.errors.push(StructureError::UnterminatedString {
                    span: Span::from_parts(self.string_start, 1),
                });
                self.in_string = false;
            }
            c if u32::from(c) < 0x20 => {
                self.errors.push(StructureError::ControlCharacter {
                    span: Span::from_parts(self.current, 1),
                });
                self.consume();
            }
            _ => self.consume(),
        }
    }

    fn scan_escape(&mut self) {
        let start = self.current;
        self.consume();
        match self.peek() {
            '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' => self.consume(),
            'u' => {
                self.consume();
                let hex = &self.source[self.current..];
                let valid = hex.len() >= 4 && hex.bytes().take(4).all(|b| b.is_ascii_hexdigit());
                if !valid {
                    self.errors.push(StructureError::InvalidEscape {
                        span: Span::from_parts(start, 2),
                    });
                }
            }
            _ => {
                // The offending character is left for the string scanner, so
                // an escaped line ending still terminates the string.
                self.errors.push(StructureError::InvalidEscape {
                    span: Span::from_parts(start, 2),
                });
            }
        }
    }

    #[inline]
    fn peek(&self) -> char {
        self.source[self.current..].chars().next().unwrap_or('\0')
    }

    #[inline]
    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    #[inline]
    fn consume(&mut self) {
        if let Some(ch) = self.source[self.current..].chars().next() {
            self.current += ch.len_utf8();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(text: &str) -> Vec<StructureError> {
        check_structure(text, &[])
    }

    #[test]
    fn balanced_document_is_clean() {
        let errors = check(r#"{"a": [1, 2], "b": {"c": true, "d": null}}"#);
        assert!(errors.is_empty(), "expected clean check, got {errors:?}");
    }

    #[test]
    fn trailing_comma_before_brace() {
        let errors = check(r#"{"a": 1,}"#);
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            StructureError::TrailingSeparator { span } => assert_eq!(span.start(), 7),
            other => panic!("Expected TrailingSeparator, got {other:?}"),
        }
    }

    #[test]
    fn trailing_comma_before_bracket_across_lines() {
        let errors = check("[1,\n]");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], StructureError::TrailingSeparator { .. }));
    }

    #[test]
    fn comma_followed_by_value_is_fine() {
        assert!(check("[1, 2]").is_empty());
    }

    #[test]
    fn unclosed_defect_anchors_at_opener() {
        // Dropping the closing brace reports the opener, not end of text.
        let errors = check(r#"{"a": [1, 2]"#);
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            StructureError::UnclosedBracket { bracket, span } => {
                assert_eq!(*bracket, '{');
                assert_eq!(span.start(), 0);
            }
            other => panic!("Expected UnclosedBracket, got {other:?}"),
        }
    }

    #[test]
    fn unclosed_brackets_report_outermost_first() {
        let errors = check("[{");
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            errors[0],
            StructureError::UnclosedBracket { bracket: '[', .. }
        ));
        assert!(matches!(
            errors[1],
            StructureError::UnclosedBracket { bracket: '{', .. }
        ));
    }

    #[test]
    fn unexpected_closer_on_empty_stack() {
        let errors = check("]");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            StructureError::UnexpectedCloser { bracket: ']', .. }
        ));
    }

    #[test]
    fn mismatched_closer_keeps_opener_open() {
        let errors = check("[}");
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            errors[0],
            StructureError::UnexpectedCloser { bracket: '}', .. }
        ));
        assert!(matches!(
            errors[1],
            StructureError::UnclosedBracket { bracket: '[', .. }
        ));
    }

    #[test]
    fn single_quoted_string() {
        let errors = check("'single quoted'");
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            StructureError::SingleQuotedString { span } => assert_eq!(span.start(), 0),
            other => panic!("Expected SingleQuotedString, got {other:?}"),
        }
    }

    #[test]
    fn single_quoted_content_does_not_cascade() {
        // The brackets inside the quoted run must not hit the stack.
        let errors = check("'a}b['");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn unquoted_key() {
        let errors = check(r#"{name: "x"}"#);
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            StructureError::UnquotedKey { key, span } => {
                assert_eq!(key, "name");
                assert_eq!(span.start(), 1);
            }
            other => panic!("Expected UnquotedKey, got {other:?}"),
        }
    }

    #[test]
    fn bare_words_as_values_are_not_keys() {
        assert!(check(r#"{"a": true, "b": false, "c": null}"#).is_empty());
    }

    #[test]
    fn leading_zero_number() {
        let errors = check(r#"{"a": 0123}"#);
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            StructureError::LeadingZero { span } => assert_eq!(span.start(), 6),
            other => panic!("Expected LeadingZero, got {other:?}"),
        }
    }

    #[test]
    fn zero_and_decimals_are_fine() {
        assert!(check(r#"[0, 0.5, 10, 1.25]"#).is_empty());
    }

    #[test]
    fn scientific_notation_is_consumed_with_the_number() {
        assert!(check(r#"{"a": 0.5e+1, "b": 1E-5, "c": 2e10}"#).is_empty());
    }

    #[test]
    fn leading_zero_is_still_caught_before_an_exponent() {
        let errors = check(r#"{"a": 012e5}"#);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], StructureError::LeadingZero { .. }));
    }

    #[test]
    fn invalid_escape() {
        let errors = check(r#""a\qb""#);
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            StructureError::InvalidEscape { span } => assert_eq!(span.start(), 2),
            other => panic!("Expected InvalidEscape, got {other:?}"),
        }
    }

    #[test]
    fn recognized_escapes_are_fine() {
        assert!(check(r#""a\"b\\c\/d\b\f\n\r\té""#).is_empty());
    }

    #[test]
    fn unicode_escape_needs_four_hex_digits() {
        let errors = check(r#""\u12""#);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], StructureError::InvalidEscape { .. }));
    }

    #[test]
    fn control_character_in_string() {
        let errors = check("\"a\tb\"");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], StructureError::ControlCharacter { .. }));
    }

    #[test]
    fn unterminated_string_at_line_end() {
        let errors = check("\"abc\n");
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            StructureError::UnterminatedString { span } => assert_eq!(span.start(), 0),
            other => panic!("Expected UnterminatedString, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_string_at_end_of_text() {
        let errors = check("\"abc");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], StructureError::UnterminatedString { .. }));
    }

    #[test]
    fn punctuation_inside_string_is_never_flagged() {
        assert!(check(r#"["a,}b", "{'c'}"]"#).is_empty());
    }

    mod with_tags {
        use mjl_source::Span;
        use mjl_templates::TagScanner;

        use super::super::check_structure;

        fn check(text: &str) -> Vec<super::StructureError> {
            let scan = TagScanner::new(text).scan();
            let tag_spans: Vec<Span> = scan.tag_spans().collect();
            check_structure(text, &tag_spans)
        }

        #[test]
        fn tag_internal_punctuation_is_excluded() {
            // The braces of the tags themselves must not reach the stack.
            assert!(check(r#"{"users": [{{#users}}{{name}}{{/users}}]}"#).is_empty());
        }

        #[test]
        fn data_layer_defects_survive_around_tags() {
            let errors = check(r#"{"a": {{value}},}"#);
            assert_eq!(errors.len(), 1);
            assert!(matches!(
                errors[0],
                super::StructureError::TrailingSeparator { .. }
            ));
        }

        #[test]
        fn template_only_text_is_clean() {
            assert!(check("{{#users}}{{name}}{{/users}}").is_empty());
        }
    }
}
