//! Recursive-descent parser for the OpenStep plist grammar.
//!
//! ```text
//! plist := value
//! value := string | dict | array
//! dict  := '{' (key '=' value ';')* '}'
//! array := '(' (value ',')* value? ')'
//! ```
//!
//! Keys and scalar values are strings (quoted or bare); trailing commas in
//! arrays are accepted since Xcode always writes them.

use super::lexer::{Token, TokenKind, tokenize};
use crate::error::ParseError;
use crate::value::{Fields, Value};

/// Parse OpenStep plist text into a value tree.
pub fn parse(input: &str) -> Result<Value, ParseError> {
    let tokens = tokenize(input);
    let mut parser = Parser {
        tokens,
        pos: 0,
        input_len: input.len(),
    };

    let value = parser.value()?;
    if let Some(token) = parser.peek() {
        return Err(ParseError::new(
            token.offset,
            format!("unexpected trailing '{}'", token.text),
        ));
    }
    Ok(value)
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    input_len: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token<'a>, ParseError> {
        match self.bump() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(ParseError::new(
                token.offset,
                format!("expected {what}, found '{}'", token.text),
            )),
            None => Err(self.eof(what)),
        }
    }

    fn eof(&self, what: &str) -> ParseError {
        ParseError::new(self.input_len, format!("expected {what}, found end of input"))
    }

    fn value(&mut self) -> Result<Value, ParseError> {
        match self.peek() {
            Some(token) => match token.kind {
                TokenKind::LBrace => self.dict(),
                TokenKind::LParen => self.array(),
                TokenKind::Word | TokenKind::QuotedString => {
                    let text = string_text(token);
                    self.pos += 1;
                    Ok(Value::String(text))
                }
                _ => Err(ParseError::new(
                    token.offset,
                    format!("expected value, found '{}'", token.text),
                )),
            },
            None => Err(self.eof("value")),
        }
    }

    fn dict(&mut self) -> Result<Value, ParseError> {
        self.expect(TokenKind::LBrace, "'{'")?;

        let mut fields = Fields::new();
        loop {
            match self.peek() {
                Some(token) if token.kind == TokenKind::RBrace => {
                    self.bump();
                    return Ok(Value::Dictionary(fields));
                }
                Some(token)
                    if token.kind == TokenKind::Word || token.kind == TokenKind::QuotedString =>
                {
                    let key = string_text(token);
                    self.pos += 1;
                    self.expect(TokenKind::Eq, "'='")?;
                    let value = self.value()?;
                    self.expect(TokenKind::Semicolon, "';'")?;
                    fields.insert(key, value);
                }
                Some(token) => {
                    return Err(ParseError::new(
                        token.offset,
                        format!("expected key or '}}', found '{}'", token.text),
                    ));
                }
                None => return Err(self.eof("'}'")),
            }
        }
    }

    fn array(&mut self) -> Result<Value, ParseError> {
        self.expect(TokenKind::LParen, "'('")?;

        let mut items = Vec::new();
        loop {
            match self.peek() {
                Some(token) if token.kind == TokenKind::RParen => {
                    self.bump();
                    return Ok(Value::Array(items));
                }
                Some(_) => {
                    items.push(self.value()?);
                    match self.peek() {
                        Some(token) if token.kind == TokenKind::Comma => {
                            self.bump();
                        }
                        Some(token) if token.kind == TokenKind::RParen => {}
                        Some(token) => {
                            return Err(ParseError::new(
                                token.offset,
                                format!("expected ',' or ')', found '{}'", token.text),
                            ));
                        }
                        None => return Err(self.eof("')'")),
                    }
                }
                None => return Err(self.eof("')'")),
            }
        }
    }
}

/// Get the string content of a word or quoted-string token, processing
/// escapes for quoted strings.
fn string_text(token: &Token<'_>) -> String {
    match token.kind {
        TokenKind::QuotedString => unescape(&token.text[1..token.text.len() - 1]),
        _ => token.text.to_owned(),
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}
