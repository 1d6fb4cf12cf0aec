//! Syntax-level parsing interface.
//!
//! The composition engine never depends on a concrete grammar: it reads
//! documents through [`DocumentParser`]. The ReqM reader in the `parser`
//! module is the built-in implementation.

use std::fmt;

use super::document::Document;

/// Parse error type for syntax-level errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    /// 0-indexed line.
    pub line: u32,
    /// 0-indexed column.
    pub column: u32,
}

impl ParseError {
    pub fn syntax_error(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line + 1, self.column + 1, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Turns document text into the typed element tree.
///
/// `file_name` is recorded as the `source_file_name` of every element.
pub trait DocumentParser: Send + Sync {
    fn parse(&self, source: &str, file_name: &str) -> Result<Document, ParseError>;
}
