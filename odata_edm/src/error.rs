//! Error type for EDM model access
//!
//! `EdmError` covers model *inconsistencies* only: a lookup that simply finds
//! nothing reports absence through `Option`, while a model that contradicts
//! itself (an association set naming a role its association does not declare,
//! an entity set pointing at an undeclared type) surfaces here. Callers treat
//! these as defects in the supplied schema, not as user input errors.

use thiserror::Error;

pub type EdmResult<T> = Result<T, EdmError>;

/// EDM model access and construction errors
#[derive(Debug, Clone, Error)]
pub enum EdmError {
    #[error("no default entity container defined in any schema")]
    NoDefaultContainer,

    #[error("duplicate name in model: '{name}'")]
    DuplicateName { name: String },

    #[error("model inconsistency: {message}")]
    Inconsistent { message: String },
}

impl EdmError {
    /// Create a duplicate name error
    pub fn duplicate(name: &str) -> Self {
        Self::DuplicateName {
            name: name.to_string(),
        }
    }

    /// Create a model inconsistency error
    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::Inconsistent {
            message: message.into(),
        }
    }
}
