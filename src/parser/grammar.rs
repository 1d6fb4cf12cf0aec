//! Recursive-descent grammar for ReqM documents.
//!
//! ```text
//! document := ("domain" qname ";")? element*
//! element  := KIND qname ("from" qname)? ("extends" qname)? (body | ";")
//! body     := "{" member* "}"
//! member   := "use" qname ";" | "call" qname ";" | property
//! property := key (":" ("list" "of")? qname)? ("mandatory" | "optional")?
//!             ("=" value)? ("{" property* "}" | ";")
//! value    := STRING | NUMBER | qname | "[" value ("," value)* "]"
//! ```

use smol_str::SmolStr;

use super::lexer::{Token, TokenKind, tokenize};
use crate::base::{LineIndex, QualifiedId, SourceRef};
use crate::syntax::{Document, Element, ElementKind, FeatureRef, Optionality, ParseError, Property};

pub(super) struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    source_len: usize,
    line_index: LineIndex,
    file_name: &'a str,
    domain: Option<SmolStr>,
}

type PResult<T> = Result<T, ParseError>;

impl<'a> Parser<'a> {
    pub(super) fn new(source: &'a str, file_name: &'a str) -> Self {
        Self {
            tokens: tokenize(source),
            pos: 0,
            source_len: source.len(),
            line_index: LineIndex::new(source),
            file_name,
            domain: None,
        }
    }

    // ------------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------------

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn peek_nth(&self, n: usize) -> Option<&Token<'a>> {
        self.tokens.get(self.pos + n)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.peek()
            .is_some_and(|t| t.kind == TokenKind::Ident && t.text == keyword)
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let offset = self
            .peek()
            .map(|t| t.offset)
            .unwrap_or_else(|| text_size::TextSize::new(self.source_len as u32));
        let pos = self.line_index.line_col(offset);
        ParseError::syntax_error(message, pos.line, pos.col)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Error => {
                self.error(format!("invalid character '{}'", token.text))
            }
            Some(token) => self.error(format!(
                "expected {}, found {} '{}'",
                expected,
                token.kind.describe(),
                token.text
            )),
            None => self.error(format!("expected {}, found end of file", expected)),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token<'a>> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                let token = *token;
                self.pos += 1;
                Ok(token)
            }
            _ => Err(self.unexpected(kind.describe())),
        }
    }

    fn ident(&mut self) -> PResult<&'a str> {
        Ok(self.expect(TokenKind::Ident)?.text)
    }

    /// `Ident ("." Ident)*`
    fn qname(&mut self) -> PResult<String> {
        let mut name = self.ident()?.to_string();
        while self.at(TokenKind::Dot) {
            self.bump();
            name.push('.');
            name.push_str(self.ident()?);
        }
        Ok(name)
    }

    // ------------------------------------------------------------------------
    // Grammar
    // ------------------------------------------------------------------------

    pub(super) fn document(mut self) -> PResult<Document> {
        let mut document = Document::new();
        if self.eat_keyword("domain") {
            let domain = SmolStr::from(self.qname()?);
            self.expect(TokenKind::Semicolon)?;
            self.domain = Some(domain.clone());
            document.domain = Some(domain);
        }
        while self.peek().is_some() {
            let element = self.element()?;
            document.push(element);
        }
        Ok(document)
    }

    fn element(&mut self) -> PResult<Element> {
        let kind = match self.peek() {
            Some(token) if token.kind == TokenKind::Ident => ElementKind::from_keyword(token.text),
            _ => None,
        }
        .ok_or_else(|| self.unexpected("element keyword"))?;
        self.bump();

        let qid = QualifiedId::parse(&self.qname()?).or_domain(self.domain.as_ref());
        let mut element = Element::new(kind, qid).with_file(self.file_name);

        if self.eat_keyword("from") {
            element.source_ref = SourceRef::Defined(QualifiedId::parse(&self.qname()?));
        }
        if self.eat_keyword("extends") {
            element.parent = SourceRef::Defined(QualifiedId::parse(&self.qname()?));
        }

        if self.eat(TokenKind::Semicolon) {
            return Ok(element);
        }
        self.expect(TokenKind::LBrace)?;
        while !self.eat(TokenKind::RBrace) {
            if self.peek().is_none() {
                return Err(self.unexpected("'}'"));
            }
            self.member(&mut element)?;
        }
        Ok(element)
    }

    fn member(&mut self, element: &mut Element) -> PResult<()> {
        let directive_follows = self
            .peek_nth(1)
            .is_some_and(|t| t.kind == TokenKind::Ident);

        if directive_follows && self.at_keyword("use") {
            self.bump();
            let feature = QualifiedId::parse(&self.qname()?);
            self.expect(TokenKind::Semicolon)?;
            element.definition.feature_refs.push(FeatureRef { feature });
        } else if directive_follows && self.at_keyword("call") {
            self.bump();
            let target = QualifiedId::parse(&self.qname()?);
            self.expect(TokenKind::Semicolon)?;
            element.definition.calls.push(target);
        } else {
            let property = self.property()?;
            element.definition.properties.push(property);
        }
        Ok(())
    }

    fn property(&mut self) -> PResult<Property> {
        let mut property = Property::new(self.ident()?);

        if self.eat(TokenKind::Colon) {
            let list_follows = self.at_keyword("list")
                && self
                    .peek_nth(1)
                    .is_some_and(|t| t.kind == TokenKind::Ident && t.text == "of");
            if list_follows {
                self.bump();
                self.bump();
                property.list_of = true;
            }
            property.type_name = Some(self.qname()?.into());
        }

        if self.eat_keyword("mandatory") {
            property.optionality = Some(Optionality::Mandatory);
        } else if self.eat_keyword("optional") {
            property.optionality = Some(Optionality::Optional);
        }

        if self.eat(TokenKind::Eq) {
            if self.eat(TokenKind::LBracket) {
                if !self.at(TokenKind::RBracket) {
                    property.value_list.push(self.value()?);
                    while self.eat(TokenKind::Comma) {
                        property.value_list.push(self.value()?);
                    }
                }
                self.expect(TokenKind::RBracket)?;
            } else {
                property.value = Some(self.value()?);
            }
        }

        if self.eat(TokenKind::LBrace) {
            while !self.eat(TokenKind::RBrace) {
                if self.peek().is_none() {
                    return Err(self.unexpected("'}'"));
                }
                let attribute = self.property()?;
                property.simple_attributes.push(attribute);
            }
        } else {
            self.expect(TokenKind::Semicolon)?;
        }
        Ok(property)
    }

    fn value(&mut self) -> PResult<SmolStr> {
        match self.peek().map(|t| t.kind) {
            Some(TokenKind::String) => {
                let text = self.bump().map(|t| t.text).unwrap_or_default();
                Ok(unquote(text).into())
            }
            Some(TokenKind::Number) => Ok(self.bump().map(|t| t.text).unwrap_or_default().into()),
            Some(TokenKind::Ident) => Ok(self.qname()?.into()),
            _ => Err(self.unexpected("value")),
        }
    }
}

/// Strip the surrounding quotes and resolve `\"` and `\\` escapes.
fn unquote(text: &str) -> String {
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
