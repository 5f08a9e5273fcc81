//! Error taxonomy of the resource-path and query-option layer
//!
//! Three classes, mirroring how callers react: syntax errors (malformed
//! input regardless of the model), not-matching errors (input does not fit
//! the segment grammar) and not-found errors (the model has no such name).
//! Expression and literal errors bubble up unchanged; `UriParseError`
//! aggregates everything for the public API.

use crate::expression::ExpressionError;
use crate::logging::{codes, Code};
use crate::types::LiteralError;
use odata_edm::{EdmError, EdmSimpleType};
use thiserror::Error;

/// Malformed input independent of the EDM
#[derive(Debug, Clone, Error)]
pub enum UriSyntaxError {
    #[error("empty path segment")]
    EmptySegment,

    #[error("segment '{segment}' must be the last segment")]
    MustBeLastSegment { segment: String },

    #[error("'{segment}' is not legal at this position")]
    InvalidSegment { segment: String },

    #[error("entity set '{entity_set}' addressed where a single entity is required")]
    EntitySetInsteadOfEntity { entity_set: String },

    #[error("invalid key predicate '{predicate}'")]
    InvalidKeyPredicate { predicate: String },

    #[error("key property '{name}' supplied more than once")]
    DuplicateKeyProperty { name: String },

    #[error("literal '{literal}' ({found}) is incompatible with key property '{property}' ({expected})")]
    IncompatibleLiteral {
        literal: String,
        property: String,
        expected: EdmSimpleType,
        found: EdmSimpleType,
    },

    #[error("malformed percent escape in '{text}'")]
    MalformedEscape { text: String },

    #[error("'$value' is not legal here: entity type '{entity_type}' has no media stream")]
    NoMediaResource { entity_type: String },

    #[error("required parameter '{parameter}' of function import '{function_import}' is missing")]
    MissingParameter {
        function_import: String,
        parameter: String,
    },

    #[error("entity link '{link}' does not address entity set '{entity_set}'")]
    InvalidEntityLink { link: String, entity_set: String },

    #[error("path has {found} segments, more than the allowed {maximum}")]
    TooManySegments { found: usize, maximum: usize },

    #[error("unknown system query option '{option}'")]
    InvalidSystemQueryOption { option: String },

    #[error("system query option '{option}' given more than once")]
    DuplicateSystemQueryParameters { option: String },

    #[error("system query option '{option}' has an empty value")]
    InvalidNullValue { option: String },

    #[error("system query option '{option}' is not compatible with this request shape")]
    IncompatibleSystemQueryOption { option: String },

    #[error("invalid value '{value}' for system query option '{option}'")]
    InvalidValue { option: String, value: String },

    #[error("negative value '{value}' for system query option '{option}'")]
    InvalidNegativeValue { option: String, value: String },

    #[error("'{segment}' in a select or expand path must be a navigation property")]
    MustBeNavigationProperty { segment: String },

    #[error("empty select or expand item")]
    EmptySelectItem,

    #[error("expand path has {found} segments, more than the allowed {maximum}")]
    ExpandTooDeep { found: usize, maximum: usize },
}

impl UriSyntaxError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::EmptySegment => codes::uri::EMPTY_SEGMENT,
            Self::MustBeLastSegment { .. } => codes::uri::MUST_BE_LAST_SEGMENT,
            Self::InvalidSegment { .. } => codes::uri::INVALID_SEGMENT,
            Self::EntitySetInsteadOfEntity { .. } => codes::uri::ENTITY_SET_INSTEAD_OF_ENTITY,
            Self::InvalidKeyPredicate { .. } => codes::key::INVALID_KEY_PREDICATE,
            Self::DuplicateKeyProperty { .. } => codes::key::DUPLICATE_KEY_PROPERTY,
            Self::IncompatibleLiteral { .. } => codes::key::INCOMPATIBLE_LITERAL,
            Self::MalformedEscape { .. } => codes::uri::MALFORMED_ESCAPE,
            Self::NoMediaResource { .. } => codes::uri::NO_MEDIA_RESOURCE,
            Self::MissingParameter { .. } => codes::uri::MISSING_PARAMETER,
            Self::InvalidEntityLink { .. } => codes::uri::INVALID_ENTITY_LINK,
            Self::TooManySegments { .. } => codes::uri::TOO_MANY_SEGMENTS,
            Self::InvalidSystemQueryOption { .. } => codes::option::INVALID_SYSTEM_QUERY_OPTION,
            Self::DuplicateSystemQueryParameters { .. } => {
                codes::option::DUPLICATE_SYSTEM_QUERY_OPTION
            }
            Self::InvalidNullValue { .. } => codes::option::INVALID_NULL_VALUE,
            Self::IncompatibleSystemQueryOption { .. } => {
                codes::option::INCOMPATIBLE_SYSTEM_QUERY_OPTION
            }
            Self::InvalidValue { .. } => codes::option::INVALID_VALUE,
            Self::InvalidNegativeValue { .. } => codes::option::INVALID_NEGATIVE_VALUE,
            Self::MustBeNavigationProperty { .. } => codes::expand::MUST_BE_NAVIGATION_PROPERTY,
            Self::EmptySelectItem => codes::expand::EMPTY_SELECT_ITEM,
            Self::ExpandTooDeep { .. } => codes::expand::EXPAND_TOO_DEEP,
        }
    }
}

/// Input does not fit the expected segment grammar shape at all
#[derive(Debug, Clone, Error)]
pub enum UriNotMatchingError {
    #[error("segment '{segment}' does not match the expected resource grammar")]
    MatchProblem { segment: String },
}

impl UriNotMatchingError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::MatchProblem { .. } => codes::uri::MATCH_PROBLEM,
        }
    }
}

/// An EDM lookup found nothing under the given name
#[derive(Debug, Clone, Error)]
pub enum UriNotFoundError {
    #[error("entity container '{container}' not found")]
    ContainerNotFound { container: String },

    #[error("'{segment}' is neither an entity set nor a function import")]
    ResourceNotFound { segment: String },

    #[error("property '{property}' not found on type '{type_name}'")]
    PropertyNotFound {
        property: String,
        type_name: String,
    },
}

impl UriNotFoundError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::ContainerNotFound { .. } => codes::uri::CONTAINER_NOT_FOUND,
            Self::ResourceNotFound { .. } => codes::uri::RESOURCE_NOT_FOUND,
            Self::PropertyNotFound { .. } => codes::uri::PROPERTY_NOT_FOUND,
        }
    }
}

/// Aggregate error of a full parse
#[derive(Debug, Clone, Error)]
pub enum UriParseError {
    #[error(transparent)]
    Syntax(#[from] UriSyntaxError),

    #[error(transparent)]
    NotMatching(#[from] UriNotMatchingError),

    #[error(transparent)]
    NotFound(#[from] UriNotFoundError),

    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error(transparent)]
    Literal(#[from] LiteralError),

    #[error(transparent)]
    Model(#[from] EdmError),
}

impl UriParseError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::Syntax(e) => e.error_code(),
            Self::NotMatching(e) => e.error_code(),
            Self::NotFound(e) => e.error_code(),
            Self::Expression(e) => e.error_code(),
            Self::Literal(e) => e.error_code(),
            Self::Model(_) => codes::system::MODEL_INCONSISTENCY,
        }
    }
}

pub type UriResult<T> = Result<T, UriParseError>;
