//! Hand-written character scanner for the filter/orderby grammar
//!
//! Produces a flat token stream over one expression string. Literal
//! recognition (quoted strings, typed prefixes, suffixed numbers) delegates
//! to the URI literal parser so the two stay in lockstep.

use crate::config::constants::limits::expression::{MAX_EXPRESSION_LENGTH, MAX_TOKEN_COUNT};
use crate::expression::error::{ExpressionError, ExpressionResult};
use crate::expression::tokens::Token;
use crate::types::literals::parse_literal;
use crate::utils::{Span, Spanned};

/// Word prefixes that combine with a quoted body into one literal token
const TYPED_LITERAL_PREFIXES: [&str; 6] =
    ["X", "binary", "guid", "datetime", "datetimeoffset", "time"];

pub fn tokenize(expression: &str) -> ExpressionResult<Vec<Spanned<Token>>> {
    if expression.len() > MAX_EXPRESSION_LENGTH {
        return Err(ExpressionError::TooLong {
            length: expression.len(),
            maximum: MAX_EXPRESSION_LENGTH,
        });
    }

    let bytes = expression.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let ch = expression[pos..].chars().next().unwrap();

        if ch.is_whitespace() {
            pos += ch.len_utf8();
            continue;
        }

        if tokens.len() >= MAX_TOKEN_COUNT {
            return Err(ExpressionError::TooLong {
                length: expression.len(),
                maximum: MAX_EXPRESSION_LENGTH,
            });
        }

        let start = pos;
        let token = match ch {
            '(' => {
                pos += 1;
                Token::OpenParen
            }
            ')' => {
                pos += 1;
                Token::CloseParen
            }
            ',' => {
                pos += 1;
                Token::Comma
            }
            '/' => {
                pos += 1;
                Token::Slash
            }
            '\'' => {
                let end = scan_quoted(expression, pos);
                let raw = &expression[pos..end];
                pos = end;
                Token::Literal(
                    parse_literal(raw).map_err(|e| ExpressionError::literal(e, start))?,
                )
            }
            '-' => {
                // a minus immediately followed by a digit opens a number
                if bytes.get(pos + 1).is_some_and(|b| b.is_ascii_digit()) {
                    let end = scan_number(expression, pos + 1);
                    let raw = &expression[pos..end];
                    pos = end;
                    Token::Literal(
                        parse_literal(raw).map_err(|e| ExpressionError::literal(e, start))?,
                    )
                } else {
                    pos += 1;
                    Token::Minus
                }
            }
            c if c.is_ascii_digit() => {
                let end = scan_number(expression, pos);
                let raw = &expression[pos..end];
                pos = end;
                Token::Literal(
                    parse_literal(raw).map_err(|e| ExpressionError::literal(e, start))?,
                )
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let end = scan_word(expression, pos);
                let word = &expression[pos..end];
                pos = end;

                if TYPED_LITERAL_PREFIXES.contains(&word)
                    && bytes.get(pos) == Some(&b'\'')
                {
                    let quoted_end = scan_quoted(expression, pos);
                    let raw = &expression[start..quoted_end];
                    pos = quoted_end;
                    Token::Literal(
                        parse_literal(raw).map_err(|e| ExpressionError::literal(e, start))?,
                    )
                } else if matches!(word, "true" | "false" | "null") {
                    Token::Literal(
                        parse_literal(word).map_err(|e| ExpressionError::literal(e, start))?,
                    )
                } else {
                    Token::Word(word.to_string())
                }
            }
            other => {
                return Err(ExpressionError::InvalidToken {
                    token: other.to_string(),
                    position: start,
                })
            }
        };

        tokens.push(Spanned::new(token, Span::new(start, pos)));
    }

    Ok(tokens)
}

/// Advance past a quoted run starting at the opening quote; doubled quotes
/// stay inside the run. Returns the index one past the closing quote, or the
/// end of input for an unterminated run (the literal parser reports that).
fn scan_quoted(expression: &str, start: usize) -> usize {
    let bytes = expression.as_bytes();
    let mut pos = start + 1;
    while pos < bytes.len() {
        if bytes[pos] == b'\'' {
            if bytes.get(pos + 1) == Some(&b'\'') {
                pos += 2;
            } else {
                return pos + 1;
            }
        } else {
            pos += expression[pos..].chars().next().unwrap().len_utf8();
        }
    }
    pos
}

/// Advance past a number body: digits, optional fraction, optional exponent,
/// optional one-letter type suffix
fn scan_number(expression: &str, mut pos: usize) -> usize {
    let bytes = expression.as_bytes();

    let take_digits = |mut p: usize| {
        while p < bytes.len() && bytes[p].is_ascii_digit() {
            p += 1;
        }
        p
    };

    pos = take_digits(pos);

    if bytes.get(pos) == Some(&b'.') && bytes.get(pos + 1).is_some_and(|b| b.is_ascii_digit()) {
        pos = take_digits(pos + 1);
    }

    if matches!(bytes.get(pos), Some(&b'e') | Some(&b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(&b'+') | Some(&b'-')) {
            exp += 1;
        }
        if bytes.get(exp).is_some_and(|b| b.is_ascii_digit()) {
            pos = take_digits(exp);
        }
    }

    if matches!(
        bytes.get(pos),
        Some(&b'l') | Some(&b'L') | Some(&b'm') | Some(&b'M') | Some(&b'd') | Some(&b'D')
            | Some(&b'f') | Some(&b'F')
    ) {
        // only when it terminates the token; `128Max` stays a broken word
        let next_is_word = bytes
            .get(pos + 1)
            .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_');
        if !next_is_word {
            pos += 1;
        }
    }

    pos
}

fn scan_word(expression: &str, mut pos: usize) -> usize {
    let bytes = expression.as_bytes();
    while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
        pos += 1;
    }
    pos
}
