//! OpenStep (ASCII plist) reader.
//!
//! Xcode still writes pbxproj files in the legacy OpenStep plist syntax:
//! brace-delimited dictionaries, parenthesized arrays, `key = value;` pairs,
//! and `/* ... */` comments that carry human-readable annotations. This
//! module tokenizes with **logos** and parses with a small recursive-descent
//! parser; comments are trivia and are dropped (the serializer re-synthesizes
//! them from the object graph).

mod lexer;
mod parser;

pub use lexer::{Lexer, Token, TokenKind};
pub use parser::parse;
