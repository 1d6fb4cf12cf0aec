//! Offset to line/column conversion.

use text_size::TextSize;

/// A 0-indexed line and column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

/// Maps byte offsets of a source text to line/column positions.
#[derive(Clone, Debug)]
pub struct LineIndex {
    /// Offset of the first byte of every line.
    newlines: Vec<TextSize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut newlines = vec![TextSize::from(0)];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                newlines.push(TextSize::from(offset as u32 + 1));
            }
        }
        Self { newlines }
    }

    /// Line and column of `offset`.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let line = self.newlines.partition_point(|&start| start <= offset) - 1;
        LineCol {
            line: line as u32,
            col: u32::from(offset - self.newlines[line]),
        }
    }
}
