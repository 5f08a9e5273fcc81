//! Built-in method table and overload resolution
//!
//! Each method declares its arity bounds and an ordered list of signatures.
//! Resolution checks arity first, then walks the signatures and takes the
//! first one every parameter promotes into, so arity mismatches are always
//! reported ahead of type mismatches, and a `concat` call with any number of
//! string-compatible arguments ≥ 2 resolves against the variadic rule.

use crate::expression::ast::ExpressionType;
use crate::expression::error::{ExpressionError, ExpressionResult};
use crate::types::lattice;
use odata_edm::EdmSimpleType;
use serde::Serialize;
use std::fmt;

/// Built-in method names of the V2 expression grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MethodOperator {
    EndsWith,
    IndexOf,
    StartsWith,
    ToLower,
    ToUpper,
    Trim,
    Substring,
    SubstringOf,
    Concat,
    Length,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Round,
    Ceiling,
    Floor,
    Replace,
}

impl MethodOperator {
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "endswith" => Some(Self::EndsWith),
            "indexof" => Some(Self::IndexOf),
            "startswith" => Some(Self::StartsWith),
            "tolower" => Some(Self::ToLower),
            "toupper" => Some(Self::ToUpper),
            "trim" => Some(Self::Trim),
            "substring" => Some(Self::Substring),
            "substringof" => Some(Self::SubstringOf),
            "concat" => Some(Self::Concat),
            "length" => Some(Self::Length),
            "year" => Some(Self::Year),
            "month" => Some(Self::Month),
            "day" => Some(Self::Day),
            "hour" => Some(Self::Hour),
            "minute" => Some(Self::Minute),
            "second" => Some(Self::Second),
            "round" => Some(Self::Round),
            "ceiling" => Some(Self::Ceiling),
            "floor" => Some(Self::Floor),
            "replace" => Some(Self::Replace),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EndsWith => "endswith",
            Self::IndexOf => "indexof",
            Self::StartsWith => "startswith",
            Self::ToLower => "tolower",
            Self::ToUpper => "toupper",
            Self::Trim => "trim",
            Self::Substring => "substring",
            Self::SubstringOf => "substringof",
            Self::Concat => "concat",
            Self::Length => "length",
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
            Self::Round => "round",
            Self::Ceiling => "ceiling",
            Self::Floor => "floor",
            Self::Replace => "replace",
        }
    }

    /// Arity bounds: minimum and maximum (None = variadic)
    pub fn arity(&self) -> (usize, Option<usize>) {
        match self {
            Self::ToLower
            | Self::ToUpper
            | Self::Trim
            | Self::Length
            | Self::Year
            | Self::Month
            | Self::Day
            | Self::Hour
            | Self::Minute
            | Self::Second
            | Self::Round
            | Self::Ceiling
            | Self::Floor => (1, Some(1)),
            Self::EndsWith | Self::IndexOf | Self::StartsWith | Self::SubstringOf => (2, Some(2)),
            Self::Substring => (2, Some(3)),
            Self::Replace => (3, Some(3)),
            Self::Concat => (2, None),
        }
    }

    /// Ordered signatures: parameter type lists with their return type.
    /// `Concat` has none; it is resolved by the variadic string rule.
    fn signatures(&self) -> &'static [(&'static [EdmSimpleType], EdmSimpleType)] {
        use EdmSimpleType::*;
        match self {
            Self::EndsWith | Self::StartsWith | Self::SubstringOf => {
                &[(&[String, String], Boolean)]
            }
            Self::IndexOf => &[(&[String, String], Int32)],
            Self::Replace => &[(&[String, String, String], String)],
            Self::ToLower | Self::ToUpper | Self::Trim => &[(&[String], String)],
            Self::Substring => &[
                (&[String, Int32], String),
                (&[String, Int32, Int32], String),
            ],
            Self::Length => &[(&[String], Int32)],
            Self::Year | Self::Month | Self::Day => {
                &[(&[DateTime], Int32), (&[DateTimeOffset], Int32)]
            }
            Self::Hour | Self::Minute | Self::Second => &[
                (&[DateTime], Int32),
                (&[Time], Int32),
                (&[DateTimeOffset], Int32),
            ],
            Self::Round | Self::Ceiling | Self::Floor => {
                &[(&[Double], Double), (&[Decimal], Decimal)]
            }
            Self::Concat => &[],
        }
    }
}

impl fmt::Display for MethodOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pick the method's result type for the given parameter types, applying
/// arity checks before type checks
pub(crate) fn resolve_method(
    method: MethodOperator,
    parameter_types: &[ExpressionType],
    position: usize,
) -> ExpressionResult<ExpressionType> {
    let (minimum, maximum) = method.arity();
    let found = parameter_types.len();

    if found < minimum {
        return Err(ExpressionError::TooFewParameters {
            method: method.as_str().to_string(),
            minimum,
            found,
            position,
        });
    }
    if let Some(maximum) = maximum {
        if found > maximum {
            return Err(ExpressionError::TooManyParameters {
                method: method.as_str().to_string(),
                maximum,
                found,
                position,
            });
        }
    }

    // non-simple parameters never match any signature
    let mut simple_types = Vec::with_capacity(found);
    for (index, ty) in parameter_types.iter().enumerate() {
        match ty.as_simple() {
            Some(t) => simple_types.push(t),
            None => {
                return Err(ExpressionError::NoApplicableMethod {
                    method: method.as_str().to_string(),
                    parameter: index + 1,
                    found: ty.to_string(),
                    position,
                })
            }
        }
    }

    if method == MethodOperator::Concat {
        for (index, &ty) in simple_types.iter().enumerate() {
            if !lattice::is_compatible(ty, EdmSimpleType::String) {
                return Err(ExpressionError::NoApplicableMethod {
                    method: method.as_str().to_string(),
                    parameter: index + 1,
                    found: ty.to_string(),
                    position,
                });
            }
        }
        return Ok(ExpressionType::Simple(EdmSimpleType::String));
    }

    let candidates: Vec<_> = method
        .signatures()
        .iter()
        .filter(|(params, _)| params.len() == found)
        .collect();

    for (params, ret) in &candidates {
        let matches = simple_types
            .iter()
            .zip(params.iter())
            .all(|(&actual, &expected)| lattice::is_compatible(actual, expected));
        if matches {
            return Ok(ExpressionType::Simple(*ret));
        }
    }

    // report the first parameter no candidate signature accepts
    let parameter = simple_types
        .iter()
        .enumerate()
        .find(|(i, &actual)| {
            !candidates
                .iter()
                .any(|(params, _)| lattice::is_compatible(actual, params[*i]))
        })
        .map(|(i, _)| i + 1)
        .unwrap_or(1);

    Err(ExpressionError::NoApplicableMethod {
        method: method.as_str().to_string(),
        parameter,
        found: simple_types[parameter - 1].to_string(),
        position,
    })
}
