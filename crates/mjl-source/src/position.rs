use serde::Serialize;

/// A byte offset within a text document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ByteOffset(u32);

impl ByteOffset {
    #[must_use]
    pub fn new(offset: u32) -> Self {
        Self(offset)
    }

    #[must_use]
    pub fn from_usize(offset: usize) -> Self {
        Self(u32::try_from(offset).unwrap_or(u32::MAX))
    }

    #[must_use]
    pub fn offset(self) -> u32 {
        self.0
    }
}

/// A line and column position within a text document.
///
/// Both components are 0-based; presentation layers apply 1-based line
/// numbering at the boundary where diagnostics are constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LineCol {
    line: u32,
    column: u32,
}

impl LineCol {
    #[must_use]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    #[must_use]
    pub fn line(self) -> u32 {
        self.line
    }

    #[must_use]
    pub fn column(self) -> u32 {
        self.column
    }
}

/// Precomputed line-start table for offset ↔ line/column conversion.
///
/// Built once per document in a single pass, then queried in O(log n).
/// Validation runs on every keystroke, so callers converting many offsets
/// share one index instead of rescanning from zero each time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    length: u32,
}

impl LineIndex {
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut pos = 0u32;

        for c in text.chars() {
            pos += u32::try_from(c.len_utf8()).unwrap_or(0);
            if c == '\n' {
                line_starts.push(pos);
            }
        }

        Self {
            line_starts,
            length: pos,
        }
    }

    #[must_use]
    pub fn line_count(&self) -> u32 {
        u32::try_from(self.line_starts.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Convert a byte offset to a 0-based line/column position.
    ///
    /// Offsets at or past end-of-text clamp to the final position rather
    /// than erroring.
    #[must_use]
    pub fn to_line_col(&self, offset: ByteOffset) -> LineCol {
        let offset = offset.offset().min(self.length);
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let column = offset - self.line_starts[line];
        LineCol::new(u32::try_from(line).unwrap_or(u32::MAX), column)
    }

    /// Convert a 0-based line/column position back to a byte offset.
    ///
    /// The line is clamped to the last line and the column to that line's
    /// extent, mirroring the clamping in [`Self::to_line_col`].
    #[must_use]
    pub fn offset(&self, position: LineCol) -> ByteOffset {
        let line = (position.line() as usize).min(self.line_starts.len() - 1);
        let line_start = self.line_starts[line];
        let line_end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.length);
        ByteOffset::new((line_start + position.column()).min(line_end))
    }
}
