//! $orderby parsing
//!
//! A comma-separated list of expressions, each with an optional lowercase
//! `asc`/`desc` keyword (default ascending). Expressions go through the same
//! parser and type rules as $filter.

use crate::expression::ast::OrderByExpression;
use crate::expression::error::{ExpressionError, ExpressionResult};
use crate::expression::parser::ExpressionParser;
use crate::expression::tokenizer::tokenize;
use crate::log_success;
use crate::logging::codes;
use odata_edm::{EdmProvider, EntityType};

/// Parse an `$orderby` value against an entity type
pub fn parse_orderby(
    provider: &dyn EdmProvider,
    entity_type: &EntityType,
    expression: &str,
) -> ExpressionResult<OrderByExpression> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(ExpressionError::UnexpectedEnd {
            expected: "orderby expression".to_string(),
        });
    }

    let mut parser = ExpressionParser::new(provider, entity_type, tokens);
    let orders = parser.parse_order_entries()?;

    log_success!(codes::success::EXPRESSION_PARSE_COMPLETE, "Orderby parsed",
        "entity_type" => entity_type.name,
        "orders" => orders.len()
    );

    Ok(OrderByExpression {
        expression_string: expression.to_string(),
        orders,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ast::CommonExpression;
    use crate::expression::operators::SortOrder;
    use crate::fixtures;
    use assert_matches::assert_matches;

    #[test]
    fn test_single_property_defaults_ascending() {
        let provider = fixtures::provider();
        let employee = fixtures::entity_type(&provider, "Employee");

        let orderby = parse_orderby(&provider, employee, "EmployeeName").unwrap();
        assert_eq!(orderby.orders.len(), 1);
        assert_eq!(orderby.orders[0].order, SortOrder::Ascending);
        assert_matches!(
            &orderby.orders[0].expression,
            CommonExpression::Property { name, .. } if name == "EmployeeName"
        );
    }

    #[test]
    fn test_explicit_directions() {
        let provider = fixtures::provider();
        let employee = fixtures::entity_type(&provider, "Employee");

        let orderby =
            parse_orderby(&provider, employee, "EmployeeName desc, Age asc, EmployeeId").unwrap();
        assert_eq!(orderby.orders.len(), 3);
        assert_eq!(orderby.orders[0].order, SortOrder::Descending);
        assert_eq!(orderby.orders[1].order, SortOrder::Ascending);
        assert_eq!(orderby.orders[2].order, SortOrder::Ascending);
    }

    #[test]
    fn test_expression_entries() {
        let provider = fixtures::provider();
        let employee = fixtures::entity_type(&provider, "Employee");

        let orderby = parse_orderby(&provider, employee, "Age add 1 desc").unwrap();
        assert_eq!(orderby.orders.len(), 1);
        assert_eq!(orderby.orders[0].order, SortOrder::Descending);
        assert_matches!(
            &orderby.orders[0].expression,
            CommonExpression::Binary { .. }
        );
    }

    #[test]
    fn test_uppercase_direction_rejected() {
        let provider = fixtures::provider();
        let employee = fixtures::entity_type(&provider, "Employee");

        assert_matches!(
            parse_orderby(&provider, employee, "EmployeeName ASC"),
            Err(ExpressionError::InvalidSortOrder { token, .. }) if token == "ASC"
        );
        assert_matches!(
            parse_orderby(&provider, employee, "EmployeeName Desc"),
            Err(ExpressionError::InvalidSortOrder { .. })
        );
    }

    #[test]
    fn test_member_path_entry() {
        let provider = fixtures::provider();
        let employee = fixtures::entity_type(&provider, "Employee");

        let orderby = parse_orderby(&provider, employee, "ne_Team/Name desc").unwrap();
        assert_matches!(
            &orderby.orders[0].expression,
            CommonExpression::Member { .. }
        );
    }

    #[test]
    fn test_empty_orderby_rejected() {
        let provider = fixtures::provider();
        let employee = fixtures::entity_type(&provider, "Employee");

        assert_matches!(
            parse_orderby(&provider, employee, ""),
            Err(ExpressionError::UnexpectedEnd { .. })
        );
        assert_matches!(
            parse_orderby(&provider, employee, "Age,"),
            Err(ExpressionError::UnexpectedEnd { .. })
        );
    }

    #[test]
    fn test_unknown_property_rejected() {
        let provider = fixtures::provider();
        let employee = fixtures::entity_type(&provider, "Employee");

        assert_matches!(
            parse_orderby(&provider, employee, "Salary desc"),
            Err(ExpressionError::PropertyNotFound { property, .. }) if property == "Salary"
        );
    }
}
