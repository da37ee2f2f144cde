//! Logos-based lexer for the OpenStep plist dialect.

use logos::Logos;

/// A token with its kind, text, and byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: usize,
}

/// Token kinds after trivia classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    LBrace,
    RBrace,
    LParen,
    RParen,
    Eq,
    Semicolon,
    Comma,
    /// A double-quoted string, escapes not yet processed.
    QuotedString,
    /// A bare (unquoted) string.
    Word,
    Whitespace,
    LineComment,
    BlockComment,
    Error,
}

impl TokenKind {
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::LineComment | Self::BlockComment
        )
    }
}

/// Lexer wrapping the logos-generated tokenizer.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = self.offset;
        self.offset += text.len();

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => TokenKind::Error,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string, trivia excluded.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input)
        .filter(|t| !t.kind.is_trivia())
        .collect()
}

/// Logos token enum - maps to TokenKind.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    // The comment patterns tie with Word on short inputs like "//x"; they
    // carry a higher priority so the trivia classification wins.
    #[regex(r"//[^\n]*", priority = 10)]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/", priority = 10)]
    BlockComment,

    // =========================================================================
    // STRINGS
    // =========================================================================
    #[regex(r#""([^"\\]|\\.)*""#)]
    QuotedString,

    // The bare-word charset is wider than what the serializer emits unquoted:
    // hand-edited files show colons and plus signs in the wild.
    #[regex(r"[A-Za-z0-9_$+./:-]+", priority = 2)]
    Word,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("=")]
    Eq,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
}

impl From<LogosToken> for TokenKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => Self::Whitespace,
            LogosToken::LineComment => Self::LineComment,
            LogosToken::BlockComment => Self::BlockComment,
            LogosToken::QuotedString => Self::QuotedString,
            LogosToken::Word => Self::Word,
            LogosToken::LBrace => Self::LBrace,
            LogosToken::RBrace => Self::RBrace,
            LogosToken::LParen => Self::LParen,
            LogosToken::RParen => Self::RParen,
            LogosToken::Eq => Self::Eq,
            LogosToken::Semicolon => Self::Semicolon,
            LogosToken::Comma => Self::Comma,
        }
    }
}
