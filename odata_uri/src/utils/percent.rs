//! Percent-decoding for path segments and key-predicate components
//!
//! Query-parameter values arrive already decoded (the transport layer does
//! that); path segments and the pieces of a key predicate do not, because the
//! structural characters (`,`, `=`, `(`, `)`) must be matched before escapes
//! are resolved.

use thiserror::Error;

/// Malformed percent escape in an otherwise structural token
#[derive(Debug, Clone, PartialEq, Error)]
#[error("malformed percent escape in '{text}'")]
pub struct PercentDecodeError {
    pub text: String,
}

/// Decode `%xx` escapes; the result must be valid UTF-8
pub fn decode_percent(text: &str) -> Result<String, PercentDecodeError> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = bytes.get(i + 1).and_then(|b| (*b as char).to_digit(16));
            let lo = bytes.get(i + 2).and_then(|b| (*b as char).to_digit(16));
            match (hi, lo) {
                (Some(h), Some(l)) => {
                    out.push((h * 16 + l) as u8);
                    i += 3;
                }
                _ => {
                    return Err(PercentDecodeError {
                        text: text.to_string(),
                    })
                }
            }
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).map_err(|_| PercentDecodeError {
        text: text.to_string(),
    })
}

/// Form-encoding translation: literal `+` becomes a space. Applied only when
/// the caller has seen the forms-encoding marker parameter.
pub fn decode_plus_as_space(value: &str) -> String {
    value.replace('+', " ")
}
