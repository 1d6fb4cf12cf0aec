//! Built-in reader for ReqM documents
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens (trivia dropped)
//!     ↓
//! Grammar (recursive descent) → syntax::Document
//! ```
//!
//! The composition engine only sees [`DocumentParser`]; this module is the
//! implementation used for repositories on disk.

mod grammar;
pub mod lexer;

pub use lexer::{Lexer, Token, TokenKind, tokenize};

use crate::syntax::{Document, DocumentParser, ParseError};

/// Parse one ReqM document.
pub fn parse_reqm(source: &str, file_name: &str) -> Result<Document, ParseError> {
    grammar::Parser::new(source, file_name).document()
}

/// [`DocumentParser`] for the ReqM grammar.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReqmParser;

impl DocumentParser for ReqmParser {
    fn parse(&self, source: &str, file_name: &str) -> Result<Document, ParseError> {
        parse_reqm(source, file_name)
    }
}
