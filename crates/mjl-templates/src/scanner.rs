use mjl_source::Span;

use crate::errors::TagError;
use crate::tokens::ClassifiedSpan;
use crate::tokens::SpanKind;
use crate::tokens::TagKind;
use crate::tokens::TagToken;

/// Everything one scan produces: the full span classification, the tag
/// tokens in document order, and the defects found along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub spans: Vec<ClassifiedSpan>,
    pub tokens: Vec<TagToken>,
    pub errors: Vec<TagError>,
}

impl ScanResult {
    /// The spans classified as template tags, in document order.
    pub fn tag_spans(&self) -> impl Iterator<Item = Span> + '_ {
        self.spans
            .iter()
            .filter(|s| s.kind == SpanKind::Tag)
            .map(|s| s.span)
    }
}

/// Single-pass scanner that classifies text into plain-text, string-literal
/// and tag spans while emitting tag tokens and syntax defects.
///
/// The scanner carries three pieces of lexical state: whether it is inside a
/// double-quoted string, whether it is inside a tag, and escape parity. A
/// `"` toggles the string state only when the preceding backslash run has
/// even parity; while inside a string all other classification is suspended,
/// so tag delimiters inside strings are never tags. Neither state resets at
/// line boundaries: tags and strings may span multiple lines.
///
/// Defect recovery never aborts the scan. Malformed tags still produce
/// tokens (possibly with empty names) so later passes can keep matching.
pub struct TagScanner<'a> {
    source: &'a str,
    current: usize,
    /// Start of the pending plain-text span.
    span_start: usize,
    /// Opening quote offset while inside a top-level string.
    string_start: usize,
    inside_string: bool,
    escaped: bool,
    spans: Vec<ClassifiedSpan>,
    tokens: Vec<TagToken>,
    errors: Vec<TagError>,
}

impl<'a> TagScanner<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            current: 0,
            span_start: 0,
            string_start: 0,
            inside_string: false,
            escaped: false,
            spans: Vec::new(),
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn scan(mut self) -> ScanResult {
        while !self.is_at_end() {
            let ch = self.peek();
            let was_escaped = self.escaped;
            self.escaped = ch == '\\' && !was_escaped;

            if self.inside_string {
                self.consume();
                if ch == '"' && !was_escaped {
                    self.push_span(SpanKind::StringLiteral, self.string_start, self.current);
                    self.span_start = self.current;
                    self.inside_string = false;
                }
                continue;
            }

            if ch == '"' && !was_escaped {
                self.flush_text();
                self.string_start = self.current;
                self.inside_string = true;
                self.consume();
                continue;
            }

            if ch == '{' && self.peek_next() == '{' {
                self.flush_text();
                self.lex_tag();
                continue;
            }

            if ch == '}' {
                let run = self.brace_run(b'}');
                if run >= 3 {
                    self.errors.push(TagError::MalformedBraces {
                        span: Span::from_parts(self.current, run),
                    });
                }
                self.consume_n(run);
                continue;
            }

            self.consume();
        }

        if self.inside_string {
            self.push_span(SpanKind::StringLiteral, self.string_start, self.current);
        } else {
            self.flush_text();
        }

        ScanResult {
            spans: self.spans,
            tokens: self.tokens,
            errors: self.errors,
        }
    }

    fn lex_tag(&mut self) {
        'tag: loop {
            let open_start = self.current;
            let open_run = self.brace_run(b'{');
            let triple = open_run >= 3;
            if open_run > 3 {
                self.errors.push(TagError::MalformedBraces {
                    span: Span::from_parts(open_start, open_run),
                });
            }
            self.consume_n(open_run);

            let body_start = self.current;
            let mut in_string = false;
            let mut escaped = false;

            loop {
                if self.is_at_end() {
                    self.errors.push(TagError::UnclosedTag {
                        span: Span::from_parts(open_start, open_run.min(3)),
                    });
                    self.finish_tag(open_start, body_start, self.current, triple);
                    return;
                }

                let ch = self.peek();
                let was_escaped = escaped;
                escaped = ch == '\\' && !was_escaped;

                if in_string {
                    if ch == '"' && !was_escaped {
                        in_string = false;
                    }
                    self.consume();
                    continue;
                }

                if ch == '"' && !was_escaped {
                    in_string = true;
                    self.consume();
                    continue;
                }

                if ch == '}' && self.peek_next() == '}' {
                    let close_run = self.brace_run(b'}');
                    let expected = if triple { 3 } else { 2 };
                    if close_run < expected {
                        self.errors.push(TagError::MalformedBraces {
                            span: Span::from_parts(self.current, close_run),
                        });
                    }
                    let body_end = self.current;
                    // Only the delimiter belongs to the tag. Surplus braces
                    // go back to the outer scan as data-layer text, so a
                    // tag sitting directly against a closing bracket
                    // ({{value}} followed by }) stays well formed.
                    self.consume_n(close_run.min(expected));
                    self.finish_tag(open_start, body_start, body_end, triple);
                    return;
                }

                if ch == '{' && self.peek_next() == '{' {
                    self.errors.push(TagError::NestedTag {
                        span: Span::from_parts(self.current, 2),
                    });
                    self.errors.push(TagError::UnclosedTag {
                        span: Span::from_parts(open_start, open_run.min(3)),
                    });
                    self.finish_tag(open_start, body_start, self.current, triple);
                    continue 'tag;
                }

                self.consume();
            }
        }
    }

    /// Emit the token, name defects, and tag span for a tag whose body ends
    /// at `body_end`. `self.current` already sits past the closing
    /// delimiter (or wherever scanning resumes).
    fn finish_tag(&mut self, open_start: usize, body_start: usize, body_end: usize, triple: bool) {
        let body = &self.source[body_start..body_end];
        let tag_span = Span::from_bounds(open_start, self.current);

        // The character immediately following the opening delimiter selects
        // the kind; the name is the trimmed remainder.
        let (kind, name) = if triple {
            (TagKind::VariableUnescaped, body.trim())
        } else {
            match body.as_bytes().first() {
                Some(b'#') => (TagKind::Open, body[1..].trim()),
                Some(b'^') => (TagKind::Inverted, body[1..].trim()),
                Some(b'/') => (TagKind::Close, body[1..].trim()),
                Some(b'&') => (TagKind::VariableUnescaped, body[1..].trim()),
                Some(b'!') => (TagKind::Comment, body[1..].trim()),
                Some(b'>') => (TagKind::Partial, body[1..].trim()),
                _ => (TagKind::Variable, body.trim()),
            }
        };

        if body.trim().is_empty() {
            self.errors.push(TagError::EmptyTag { span: tag_span });
        } else if name.is_empty() {
            match kind {
                TagKind::Open | TagKind::Inverted | TagKind::Close => {
                    self.errors
                        .push(TagError::MissingSectionName { span: tag_span });
                }
                TagKind::Comment => {}
                _ => self.errors.push(TagError::EmptyTag { span: tag_span }),
            }
        } else if kind != TagKind::Comment && !is_valid_name(name) {
            self.errors.push(TagError::InvalidTagName {
                name: name.to_string(),
                span: tag_span,
            });
        }

        self.tokens.push(TagToken::new(name, kind, tag_span));
        self.push_span(SpanKind::Tag, open_start, self.current);
        self.span_start = self.current;
        self.escaped = false;
    }

    fn flush_text(&mut self) {
        self.push_span(SpanKind::Text, self.span_start, self.current);
        self.span_start = self.current;
    }

    fn push_span(&mut self, kind: SpanKind, start: usize, end: usize) {
        if start < end {
            self.spans.push(ClassifiedSpan::new(kind, start, end));
        }
    }

    /// Length of the run of `byte` starting at the cursor.
    fn brace_run(&self, byte: u8) -> usize {
        self.source[self.current..]
            .bytes()
            .take_while(|&b| b == byte)
            .count()
    }

    #[inline]
    fn peek(&self) -> char {
        self.source[self.current..].chars().next().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        let mut chars = self.source[self.current..].chars();
        chars.next();
        chars.next().unwrap_or('\0')
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

    fn consume_n(&mut self, count: usize) {
        for _ in 0..count {
            self.consume();
        }
    }
}

/// Tag names follow `[A-Za-z_][A-Za-z0-9_.-]*`.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}
