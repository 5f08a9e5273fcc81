//! Error types for filter/orderby expression parsing
//!
//! Every variant carries the offending text and a byte position into the
//! expression string, so the transport layer can render a precise message
//! without re-parsing.

use crate::logging::{codes, Code};
use crate::types::LiteralError;
use odata_edm::EdmError;
use thiserror::Error;

pub type ExpressionResult<T> = Result<T, ExpressionError>;

/// Expression parsing and type-checking errors
#[derive(Debug, Clone, Error)]
pub enum ExpressionError {
    #[error("unexpected token '{token}' at position {position}")]
    InvalidToken { token: String, position: usize },

    #[error("expression ended unexpectedly: expected {expected}")]
    UnexpectedEnd { expected: String },

    #[error("unbalanced parentheses at position {position}")]
    UnbalancedParentheses { position: usize },

    #[error("property '{property}' not found on type '{type_name}' at position {position}")]
    PropertyNotFound {
        property: String,
        type_name: String,
        position: usize,
    },

    #[error("expression of type {expected} expected at position {position}")]
    TypeExpectedAt { expected: String, position: usize },

    #[error(
        "operator '{operator}' is incompatible with operand types {left} and {right} at position {position}"
    )]
    InvalidBinaryTypes {
        operator: String,
        left: String,
        right: String,
        position: usize,
    },

    #[error("operator '{operator}' is incompatible with operand type {operand} at position {position}")]
    InvalidUnaryType {
        operator: String,
        operand: String,
        position: usize,
    },

    #[error("navigation property '{property}' used as a scalar at position {position}")]
    InvalidMultiplicity { property: String, position: usize },

    #[error("unknown method '{method}' at position {position}")]
    UnknownMethod { method: String, position: usize },

    #[error("too few parameters for method '{method}' at position {position}: expected at least {minimum}, found {found}")]
    TooFewParameters {
        method: String,
        minimum: usize,
        found: usize,
        position: usize,
    },

    #[error("too many parameters for method '{method}' at position {position}: expected at most {maximum}, found {found}")]
    TooManyParameters {
        method: String,
        maximum: usize,
        found: usize,
        position: usize,
    },

    #[error("no signature of method '{method}' accepts type {found} for parameter {parameter} at position {position}")]
    NoApplicableMethod {
        method: String,
        parameter: usize,
        found: String,
        position: usize,
    },

    #[error("sort order at position {position} must be lowercase 'asc' or 'desc', found '{token}'")]
    InvalidSortOrder { token: String, position: usize },

    #[error("expression nesting exceeds {maximum} levels")]
    TooDeep { maximum: usize },

    #[error("expression length {length} exceeds {maximum} bytes")]
    TooLong { length: usize, maximum: usize },

    #[error("invalid literal at position {position}: {source}")]
    InvalidLiteral {
        source: LiteralError,
        position: usize,
    },

    #[error(transparent)]
    Model(#[from] EdmError),
}

impl ExpressionError {
    pub fn literal(source: LiteralError, position: usize) -> Self {
        Self::InvalidLiteral { source, position }
    }

    /// Get error code for the global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::InvalidToken { .. } => codes::expression::INVALID_TOKEN,
            Self::UnexpectedEnd { .. } => codes::expression::UNEXPECTED_END,
            Self::UnbalancedParentheses { .. } => codes::expression::UNBALANCED_PARENTHESES,
            Self::PropertyNotFound { .. } => codes::expression::PROPERTY_NOT_FOUND,
            Self::TypeExpectedAt { .. } => codes::expression::TYPE_EXPECTED,
            Self::InvalidBinaryTypes { .. } => codes::expression::INVALID_BINARY_TYPES,
            Self::InvalidUnaryType { .. } => codes::expression::INVALID_UNARY_TYPE,
            Self::InvalidMultiplicity { .. } => codes::expression::INVALID_MULTIPLICITY,
            Self::UnknownMethod { .. } => codes::expression::UNKNOWN_METHOD,
            Self::TooFewParameters { .. } => codes::expression::TOO_FEW_PARAMETERS,
            Self::TooManyParameters { .. } => codes::expression::TOO_MANY_PARAMETERS,
            Self::NoApplicableMethod { .. } => codes::expression::NO_APPLICABLE_METHOD,
            Self::InvalidSortOrder { .. } => codes::expression::INVALID_SORT_ORDER,
            Self::TooDeep { .. } => codes::expression::EXPRESSION_TOO_DEEP,
            Self::TooLong { .. } => codes::expression::EXPRESSION_TOO_LONG,
            Self::InvalidLiteral { source, .. } => source.error_code(),
            Self::Model(_) => codes::system::MODEL_INCONSISTENCY,
        }
    }

    /// Byte position into the expression string, if known
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::InvalidToken { position, .. }
            | Self::UnbalancedParentheses { position }
            | Self::PropertyNotFound { position, .. }
            | Self::TypeExpectedAt { position, .. }
            | Self::InvalidBinaryTypes { position, .. }
            | Self::InvalidUnaryType { position, .. }
            | Self::InvalidMultiplicity { position, .. }
            | Self::UnknownMethod { position, .. }
            | Self::TooFewParameters { position, .. }
            | Self::TooManyParameters { position, .. }
            | Self::NoApplicableMethod { position, .. }
            | Self::InvalidSortOrder { position, .. }
            | Self::InvalidLiteral { position, .. } => Some(*position),
            _ => None,
        }
    }
}
