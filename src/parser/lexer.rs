//! Logos-based lexer for ReqM documents
//!
//! Fast tokenization using the logos crate.

use logos::Logos;
use text_size::TextSize;

/// A token with its kind, text, and position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: TextSize,
}

/// Lexer wrapping the logos-generated tokenizer
///
/// Trivia (whitespace and comments) is consumed but not yielded.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let result = self.inner.next()?;
            let text = self.inner.slice();
            let offset = TextSize::new(self.inner.span().start as u32);
            let kind = match result {
                Ok(token) => TokenKind::from(token),
                Err(()) => TokenKind::Error,
            };
            if kind.is_trivia() {
                continue;
            }
            return Some(Token { kind, text, offset });
        }
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Kind of a lexed token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Whitespace,
    LineComment,
    BlockComment,
    Ident,
    Number,
    String,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Semicolon,
    Eq,
    Comma,
    Dot,
    Error,
}

/// Logos token enum - maps to TokenKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    BlockComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token("=")]
    Eq,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,
}

impl From<LogosToken> for TokenKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => TokenKind::Whitespace,
            LogosToken::LineComment => TokenKind::LineComment,
            LogosToken::BlockComment => TokenKind::BlockComment,
            LogosToken::Ident => TokenKind::Ident,
            LogosToken::Number => TokenKind::Number,
            LogosToken::String => TokenKind::String,
            LogosToken::LBrace => TokenKind::LBrace,
            LogosToken::RBrace => TokenKind::RBrace,
            LogosToken::LBracket => TokenKind::LBracket,
            LogosToken::RBracket => TokenKind::RBracket,
            LogosToken::Colon => TokenKind::Colon,
            LogosToken::Semicolon => TokenKind::Semicolon,
            LogosToken::Eq => TokenKind::Eq,
            LogosToken::Comma => TokenKind::Comma,
            LogosToken::Dot => TokenKind::Dot,
        }
    }
}

impl TokenKind {
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    /// Human-readable description for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Whitespace => "whitespace",
            TokenKind::LineComment | TokenKind::BlockComment => "comment",
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Eq => "'='",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Error => "invalid character",
        }
    }
}
