//! URI literal parsing against the EDM simple-type syntaxes
//!
//! A literal token is matched to exactly one simple type from its shape:
//! quoted strings, typed-prefix literals (`guid'...'`, `datetime'...'`, ...),
//! suffixed numbers (`L`, `M`, `d`, `f`) and bare integers, which infer the
//! narrowest ladder type whose range accepts them.

use crate::logging::{codes, Code};
use chrono::{DateTime, NaiveDateTime};
use odata_edm::EdmSimpleType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A parsed URI literal: canonical text (quotes, prefixes and suffixes
/// stripped; doubled quotes unescaped) plus the inferred simple type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UriLiteral {
    pub text: String,
    pub kind: EdmSimpleType,
}

impl UriLiteral {
    pub fn new(text: impl Into<String>, kind: EdmSimpleType) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Literal parsing errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LiteralError {
    #[error("empty literal where a value is required")]
    NoText,

    #[error("'{literal}' matches no EDM simple type syntax")]
    Unknown { literal: String },

    #[error("'{literal}' is not a valid {simple_type} literal")]
    Format {
        literal: String,
        simple_type: EdmSimpleType,
    },
}

impl LiteralError {
    pub fn error_code(&self) -> Code {
        match self {
            LiteralError::NoText => codes::literal::EMPTY_LITERAL,
            LiteralError::Unknown { .. } => codes::literal::UNKNOWN_LITERAL,
            LiteralError::Format { .. } => codes::literal::LITERAL_FORMAT,
        }
    }

    fn unknown(literal: &str) -> Self {
        Self::Unknown {
            literal: literal.to_string(),
        }
    }

    fn format(literal: &str, simple_type: EdmSimpleType) -> Self {
        Self::Format {
            literal: literal.to_string(),
            simple_type,
        }
    }
}

/// Parse a raw URI literal token into canonical text and inferred type
pub fn parse_literal(text: &str) -> Result<UriLiteral, LiteralError> {
    if text.is_empty() {
        return Err(LiteralError::NoText);
    }

    match text {
        "true" | "false" => return Ok(UriLiteral::new(text, EdmSimpleType::Boolean)),
        "null" => return Ok(UriLiteral::new(text, EdmSimpleType::Null)),
        _ => {}
    }

    if text.starts_with('\'') {
        return parse_quoted_string(text);
    }

    // typed-prefix literals: prefix'body'
    if let Some(quote) = text.find('\'') {
        let prefix = &text[..quote];
        let kind = match prefix {
            "X" | "binary" => EdmSimpleType::Binary,
            "guid" => EdmSimpleType::Guid,
            "datetime" => EdmSimpleType::DateTime,
            "datetimeoffset" => EdmSimpleType::DateTimeOffset,
            "time" => EdmSimpleType::Time,
            _ => return Err(LiteralError::unknown(text)),
        };
        let rest = &text[quote..];
        if rest.len() < 2 || !rest.ends_with('\'') {
            return Err(LiteralError::format(text, kind));
        }
        let body = &rest[1..rest.len() - 1];
        return parse_prefixed_body(text, body, kind);
    }

    let first = text.chars().next().unwrap_or('\0');
    if first.is_ascii_digit() || first == '-' {
        return parse_number(text);
    }

    Err(LiteralError::unknown(text))
}

// ============================================================================
// STRINGS
// ============================================================================

fn parse_quoted_string(text: &str) -> Result<UriLiteral, LiteralError> {
    if text.len() < 2 || !text.ends_with('\'') {
        return Err(LiteralError::format(text, EdmSimpleType::String));
    }
    let inner = &text[1..text.len() - 1];

    let mut content = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\'' {
            // an interior quote must be doubled
            match chars.next() {
                Some('\'') => content.push('\''),
                _ => return Err(LiteralError::format(text, EdmSimpleType::String)),
            }
        } else {
            content.push(ch);
        }
    }

    Ok(UriLiteral::new(content, EdmSimpleType::String))
}

// ============================================================================
// TYPED-PREFIX BODIES
// ============================================================================

fn parse_prefixed_body(
    full: &str,
    body: &str,
    kind: EdmSimpleType,
) -> Result<UriLiteral, LiteralError> {
    let valid = match kind {
        EdmSimpleType::Binary => is_hex_body(body),
        EdmSimpleType::Guid => is_guid_body(body),
        EdmSimpleType::DateTime => is_datetime_body(body),
        EdmSimpleType::DateTimeOffset => DateTime::parse_from_rfc3339(body).is_ok(),
        EdmSimpleType::Time => is_duration_body(body),
        _ => false,
    };

    if valid {
        Ok(UriLiteral::new(body, kind))
    } else {
        Err(LiteralError::format(full, kind))
    }
}

fn is_hex_body(body: &str) -> bool {
    !body.is_empty() && body.len() % 2 == 0 && body.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_guid_body(body: &str) -> bool {
    let groups: Vec<&str> = body.split('-').collect();
    let lengths = [8usize, 4, 4, 4, 12];
    groups.len() == lengths.len()
        && groups
            .iter()
            .zip(lengths.iter())
            .all(|(g, &len)| g.len() == len && g.chars().all(|c| c.is_ascii_hexdigit()))
}

fn is_datetime_body(body: &str) -> bool {
    const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
    FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(body, fmt).is_ok())
}

/// ISO 8601 duration restricted to the time-of-day shapes Edm.Time uses:
/// `P` then optional `nD`, then `T` with at least one of `nH`, `nM`,
/// `n[.n]S`, in that order
fn is_duration_body(body: &str) -> bool {
    let mut rest = match body.strip_prefix('P') {
        Some(r) => r,
        None => return false,
    };

    fn take_number(s: &str) -> (usize, &str) {
        let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
        (digits, &s[digits..])
    }

    // optional day component
    let (digits, after) = take_number(rest);
    if digits > 0 {
        match after.strip_prefix('D') {
            Some(r) => rest = r,
            None => return false,
        }
    }

    let mut rest = match rest.strip_prefix('T') {
        Some(r) => r,
        None => return false,
    };

    let mut seen = false;
    for marker in ['H', 'M'] {
        let (digits, after) = take_number(rest);
        if digits > 0 && after.starts_with(marker) {
            rest = &after[1..];
            seen = true;
        }
    }

    // seconds: digits with optional fraction
    let (digits, after) = take_number(rest);
    if digits > 0 {
        let after = match after.strip_prefix('.') {
            Some(frac) => {
                let (frac_digits, tail) = take_number(frac);
                if frac_digits == 0 {
                    return false;
                }
                tail
            }
            None => after,
        };
        match after.strip_prefix('S') {
            Some(r) => {
                rest = r;
                seen = true;
            }
            None => return false,
        }
    }

    seen && rest.is_empty()
}

// ============================================================================
// NUMBERS
// ============================================================================

fn parse_number(text: &str) -> Result<UriLiteral, LiteralError> {
    if is_integer_body(text) {
        return infer_integer(text);
    }

    let (body, suffix) = match text.char_indices().last() {
        Some((idx, ch)) if ch.is_ascii_alphabetic() => (&text[..idx], ch),
        _ => return Err(LiteralError::unknown(text)),
    };

    match suffix {
        'l' | 'L' => {
            if is_integer_body(body) && body.parse::<i64>().is_ok() {
                Ok(UriLiteral::new(body, EdmSimpleType::Int64))
            } else {
                Err(LiteralError::format(text, EdmSimpleType::Int64))
            }
        }
        'm' | 'M' => {
            if is_decimal_body(body) {
                Ok(UriLiteral::new(body, EdmSimpleType::Decimal))
            } else {
                Err(LiteralError::format(text, EdmSimpleType::Decimal))
            }
        }
        'd' | 'D' => {
            if is_float_body(body) {
                Ok(UriLiteral::new(body, EdmSimpleType::Double))
            } else {
                Err(LiteralError::format(text, EdmSimpleType::Double))
            }
        }
        'f' | 'F' => {
            if is_float_body(body) {
                Ok(UriLiteral::new(body, EdmSimpleType::Single))
            } else {
                Err(LiteralError::format(text, EdmSimpleType::Single))
            }
        }
        _ => Err(LiteralError::unknown(text)),
    }
}

/// Narrowest ladder type whose range accepts the integer
fn infer_integer(text: &str) -> Result<UriLiteral, LiteralError> {
    let value: i64 = text
        .parse()
        .map_err(|_| LiteralError::format(text, EdmSimpleType::Int64))?;

    let kind = if value == 0 || value == 1 {
        EdmSimpleType::Bit
    } else if (0..=127).contains(&value) {
        EdmSimpleType::Uint7
    } else if (-128..=127).contains(&value) {
        EdmSimpleType::SByte
    } else if (0..=255).contains(&value) {
        EdmSimpleType::Byte
    } else if (i64::from(i16::MIN)..=i64::from(i16::MAX)).contains(&value) {
        EdmSimpleType::Int16
    } else if (i64::from(i32::MIN)..=i64::from(i32::MAX)).contains(&value) {
        EdmSimpleType::Int32
    } else {
        EdmSimpleType::Int64
    };

    Ok(UriLiteral::new(text, kind))
}

fn is_integer_body(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn is_decimal_body(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    match unsigned.split_once('.') {
        None => !unsigned.is_empty() && unsigned.chars().all(|c| c.is_ascii_digit()),
        Some((int, frac)) => {
            !int.is_empty()
                && !frac.is_empty()
                && int.chars().all(|c| c.is_ascii_digit())
                && frac.chars().all(|c| c.is_ascii_digit())
        }
    }
}

fn is_float_body(s: &str) -> bool {
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(idx) => (&s[..idx], Some(&s[idx + 1..])),
        None => (s, None),
    };
    if !is_decimal_body(mantissa) {
        return false;
    }
    match exponent {
        None => true,
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use EdmSimpleType::*;

    fn kind_of(text: &str) -> EdmSimpleType {
        parse_literal(text).unwrap().kind
    }

    #[test]
    fn test_boolean_and_null() {
        assert_eq!(kind_of("true"), Boolean);
        assert_eq!(kind_of("false"), Boolean);
        assert_eq!(kind_of("null"), Null);
    }

    #[test]
    fn test_empty_literal() {
        assert_matches!(parse_literal(""), Err(LiteralError::NoText));
    }

    #[test]
    fn test_integer_inference_ladder() {
        assert_eq!(kind_of("0"), Bit);
        assert_eq!(kind_of("1"), Bit);
        assert_eq!(kind_of("2"), Uint7);
        assert_eq!(kind_of("127"), Uint7);
        assert_eq!(kind_of("-1"), SByte);
        assert_eq!(kind_of("-128"), SByte);
        assert_eq!(kind_of("128"), Byte);
        assert_eq!(kind_of("255"), Byte);
        assert_eq!(kind_of("256"), Int16);
        assert_eq!(kind_of("-129"), Int16);
        assert_eq!(kind_of("32767"), Int16);
        assert_eq!(kind_of("32768"), Int32);
        assert_eq!(kind_of("2147483647"), Int32);
        assert_eq!(kind_of("2147483648"), Int64);
        assert_eq!(kind_of("-9223372036854775808"), Int64);
    }

    #[test]
    fn test_integer_beyond_int64() {
        assert_matches!(
            parse_literal("9223372036854775808"),
            Err(LiteralError::Format { simple_type: Int64, .. })
        );
    }

    #[test]
    fn test_literal_130_is_byte() {
        let literal = parse_literal("130").unwrap();
        assert_eq!(literal.kind, Byte);
        assert_eq!(literal.text, "130");
    }

    #[test]
    fn test_suffixed_numbers() {
        assert_eq!(parse_literal("12L").unwrap(), UriLiteral::new("12", Int64));
        assert_eq!(parse_literal("-7l").unwrap(), UriLiteral::new("-7", Int64));
        assert_eq!(
            parse_literal("2.5M").unwrap(),
            UriLiteral::new("2.5", Decimal)
        );
        assert_eq!(parse_literal("22M").unwrap(), UriLiteral::new("22", Decimal));
        assert_eq!(
            parse_literal("1.5d").unwrap(),
            UriLiteral::new("1.5", Double)
        );
        assert_eq!(
            parse_literal("-1.5E2D").unwrap(),
            UriLiteral::new("-1.5E2", Double)
        );
        assert_eq!(
            parse_literal("1.5f").unwrap(),
            UriLiteral::new("1.5", Single)
        );
    }

    #[test]
    fn test_malformed_suffixed_numbers() {
        assert_matches!(
            parse_literal("1.5L"),
            Err(LiteralError::Format { simple_type: Int64, .. })
        );
        assert_matches!(
            parse_literal("1.M"),
            Err(LiteralError::Format { simple_type: Decimal, .. })
        );
        assert_matches!(
            parse_literal("1e5M"),
            Err(LiteralError::Format { simple_type: Decimal, .. })
        );
        assert_matches!(parse_literal("12X"), Err(LiteralError::Unknown { .. }));
    }

    #[test]
    fn test_unsuffixed_decimal_is_unknown() {
        assert_matches!(parse_literal("1.5"), Err(LiteralError::Unknown { .. }));
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            parse_literal("'Walter'").unwrap(),
            UriLiteral::new("Walter", String)
        );
        assert_eq!(parse_literal("''").unwrap(), UriLiteral::new("", String));
        // doubled quote unescapes to one quote
        assert_eq!(
            parse_literal("'O''Neil'").unwrap(),
            UriLiteral::new("O'Neil", String)
        );
    }

    #[test]
    fn test_malformed_strings() {
        assert_matches!(
            parse_literal("'unterminated"),
            Err(LiteralError::Format { simple_type: String, .. })
        );
        assert_matches!(
            parse_literal("'lone'quote'"),
            Err(LiteralError::Format { simple_type: String, .. })
        );
        assert_matches!(
            parse_literal("'"),
            Err(LiteralError::Format { simple_type: String, .. })
        );
    }

    #[test]
    fn test_binary() {
        assert_eq!(
            parse_literal("X'1A2B'").unwrap(),
            UriLiteral::new("1A2B", Binary)
        );
        assert_eq!(
            parse_literal("binary'00ff'").unwrap(),
            UriLiteral::new("00ff", Binary)
        );
        assert_matches!(
            parse_literal("X'1A2'"),
            Err(LiteralError::Format { simple_type: Binary, .. })
        );
        assert_matches!(
            parse_literal("X'zz'"),
            Err(LiteralError::Format { simple_type: Binary, .. })
        );
    }

    #[test]
    fn test_guid() {
        assert_eq!(
            kind_of("guid'12345678-aaaa-bbbb-cccc-ddddeeeeffff'"),
            Guid
        );
        assert_matches!(
            parse_literal("guid'1234-aaaa-bbbb-cccc-ddddeeeeffff'"),
            Err(LiteralError::Format { simple_type: Guid, .. })
        );
    }

    #[test]
    fn test_datetime() {
        assert_eq!(kind_of("datetime'2009-12-26T21:23'"), DateTime);
        assert_eq!(kind_of("datetime'2009-12-26T21:23:38'"), DateTime);
        assert_eq!(kind_of("datetime'2009-12-26T21:23:38.123'"), DateTime);
        assert_matches!(
            parse_literal("datetime'2009-13-26T21:23:38'"),
            Err(LiteralError::Format { simple_type: DateTime, .. })
        );
    }

    #[test]
    fn test_datetimeoffset() {
        assert_eq!(kind_of("datetimeoffset'2009-12-26T21:23:38Z'"), DateTimeOffset);
        assert_eq!(
            kind_of("datetimeoffset'2002-10-10T17:00:00+01:00'"),
            DateTimeOffset
        );
        assert_matches!(
            parse_literal("datetimeoffset'2009-12-26T21:23:38'"),
            Err(LiteralError::Format { simple_type: DateTimeOffset, .. })
        );
    }

    #[test]
    fn test_time() {
        assert_eq!(kind_of("time'PT13H20M'"), Time);
        assert_eq!(kind_of("time'PT20M'"), Time);
        assert_eq!(kind_of("time'PT13H20M53S'"), Time);
        assert_eq!(kind_of("time'PT13H20M53.125S'"), Time);
        assert_eq!(kind_of("time'P1DT13H'"), Time);
        assert_matches!(
            parse_literal("time'13:20:00'"),
            Err(LiteralError::Format { simple_type: Time, .. })
        );
        assert_matches!(
            parse_literal("time'PT'"),
            Err(LiteralError::Format { simple_type: Time, .. })
        );
    }

    #[test]
    fn test_unknown_shapes() {
        assert_matches!(parse_literal("wat"), Err(LiteralError::Unknown { .. }));
        assert_matches!(parse_literal("foo'bar'"), Err(LiteralError::Unknown { .. }));
        assert_matches!(parse_literal("-"), Err(LiteralError::Unknown { .. }));
    }
}
