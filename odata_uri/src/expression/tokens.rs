//! Token vocabulary of the filter/orderby grammar
//!
//! Operators and method names are plain words here; the parser decides their
//! meaning from position. Only the structural characters and literals get
//! dedicated tokens.

use crate::types::UriLiteral;
use serde::Serialize;
use std::fmt;

/// Flat token stream element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Token {
    OpenParen,
    CloseParen,
    Comma,
    Slash,
    /// `-` not absorbed by a number literal; always the unary operator
    Minus,
    /// Identifier, operator word, method name or sort keyword
    Word(String),
    Literal(UriLiteral),
}

impl Token {
    /// Rendering used by error messages
    pub fn describe(&self) -> String {
        match self {
            Token::OpenParen => "(".to_string(),
            Token::CloseParen => ")".to_string(),
            Token::Comma => ",".to_string(),
            Token::Slash => "/".to_string(),
            Token::Minus => "-".to_string(),
            Token::Word(w) => w.clone(),
            Token::Literal(l) => l.text.clone(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}
