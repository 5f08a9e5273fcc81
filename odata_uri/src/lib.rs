// Internal modules
pub mod config;
pub mod expression;
#[macro_use]
pub mod logging;
pub mod types;
pub mod uri;
pub mod utils;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export key types for library consumers
pub use expression::{
    parse_filter, parse_orderby, CommonExpression, ExpressionError, FilterExpression,
    OrderByExpression,
};
pub use types::{parse_literal, LiteralError, UriLiteral};
pub use uri::{UriInfo, UriParseError, UriParser, UriType};

// Re-export the model crate so consumers need a single dependency
pub use odata_edm as edm;
