//! Filter and orderby expression engine
//!
//! Tokenizes and parses the `$filter`/`$orderby` grammar into immutable,
//! fully typed ASTs, resolving property paths against the EDM and method
//! calls against the built-in signature table.

pub mod ast;
pub mod error;
pub mod methods;
pub mod operators;
mod parser;
pub mod orderby;
pub mod tokenizer;
pub mod tokens;

pub use ast::{
    CommonExpression, ExpressionType, FilterExpression, OrderByExpression, OrderExpression,
    PropertyClass,
};
pub use error::{ExpressionError, ExpressionResult};
pub use methods::MethodOperator;
pub use operators::{BinaryOperator, SortOrder, UnaryOperator};
pub use orderby::parse_orderby;

use crate::log_success;
use crate::logging::codes;
use odata_edm::{EdmProvider, EdmSimpleType, EntityType};
use parser::ExpressionParser;
use tokenizer::tokenize;

/// Parse a `$filter` value against an entity type. The resulting expression
/// must be Boolean-typed.
pub fn parse_filter(
    provider: &dyn EdmProvider,
    entity_type: &EntityType,
    expression: &str,
) -> ExpressionResult<FilterExpression> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(ExpressionError::UnexpectedEnd {
            expected: "filter expression".to_string(),
        });
    }

    let mut parser = ExpressionParser::new(provider, entity_type, tokens);
    let parsed = parser.parse_single()?;

    if parsed.expression_type().as_simple() != Some(EdmSimpleType::Boolean) {
        return Err(ExpressionError::TypeExpectedAt {
            expected: EdmSimpleType::Boolean.name().to_string(),
            position: 0,
        });
    }

    log_success!(codes::success::EXPRESSION_PARSE_COMPLETE, "Filter parsed",
        "entity_type" => entity_type.name,
        "length" => expression.len()
    );

    Ok(FilterExpression {
        expression_string: expression.to_string(),
        expression: parsed,
    })
}

/// Parse a filter-grammar expression without the Boolean requirement.
/// Used where a typed sub-expression is wanted in isolation.
pub fn parse_expression_raw(
    provider: &dyn EdmProvider,
    entity_type: &EntityType,
    expression: &str,
) -> ExpressionResult<CommonExpression> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(ExpressionError::UnexpectedEnd {
            expected: "expression".to_string(),
        });
    }
    let mut parser = ExpressionParser::new(provider, entity_type, tokens);
    parser.parse_single()
}
