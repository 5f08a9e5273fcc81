//! Operator tables and binary/unary type rules
//!
//! Operand checking follows the promotion lattice: arithmetic results take
//! the join of the operand types, relational/equality/logical operators
//! yield Boolean, and a `null` operand adopts the other side's type.
//! Navigation properties are legal operands only for `eq`/`ne` against
//! `null`, and never when collection-valued.

use crate::expression::ast::{CommonExpression, ExpressionType};
use crate::expression::error::{ExpressionError, ExpressionResult};
use crate::types::lattice;
use odata_edm::EdmSimpleType;
use serde::Serialize;
use std::fmt;

/// Binary operators, word-spelled per the V2 grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Coarse behavior class of a binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    Logical,
    Equality,
    Relational,
    Arithmetic,
}

impl BinaryOperator {
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "or" => Some(Self::Or),
            "and" => Some(Self::And),
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            "lt" => Some(Self::Lt),
            "le" => Some(Self::Le),
            "gt" => Some(Self::Gt),
            "ge" => Some(Self::Ge),
            "add" => Some(Self::Add),
            "sub" => Some(Self::Sub),
            "mul" => Some(Self::Mul),
            "div" => Some(Self::Div),
            "mod" => Some(Self::Mod),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Mod => "mod",
        }
    }

    /// Binding power for precedence climbing; higher binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge => 3,
            Self::Add | Self::Sub => 4,
            Self::Mul | Self::Div | Self::Mod => 5,
        }
    }

    pub fn class(&self) -> OperatorClass {
        match self {
            Self::Or | Self::And => OperatorClass::Logical,
            Self::Eq | Self::Ne => OperatorClass::Equality,
            Self::Lt | Self::Le | Self::Gt | Self::Ge => OperatorClass::Relational,
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod => OperatorClass::Arithmetic,
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unary operators; both are right-associative and stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
    Minus,
    Not,
}

impl UnaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minus => "-",
            Self::Not => "not",
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sort direction of one orderby entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Keywords are lowercase only; anything else is not a sort order
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "asc" => Some(Self::Ascending),
            "desc" => Some(Self::Descending),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

// ============================================================================
// TYPE RULES
// ============================================================================

/// Types with a defined ordering for lt/le/gt/ge
fn is_orderable(ty: EdmSimpleType) -> bool {
    ty.is_numeric()
        || ty.is_temporal()
        || matches!(ty, EdmSimpleType::String | EdmSimpleType::Guid)
}

/// Result type of a binary node, or a typing error
pub(crate) fn check_binary(
    operator: BinaryOperator,
    left: &CommonExpression,
    right: &CommonExpression,
    position: usize,
) -> ExpressionResult<ExpressionType> {
    // navigation operands first: only `nav eq null` / `nav ne null` with a
    // single-valued target is legal
    for (operand, other) in [(left, right), (right, left)] {
        if let Some((name, multiplicity)) = operand.navigation_info() {
            let legal = multiplicity.is_single()
                && operator.class() == OperatorClass::Equality
                && other.is_null_literal();
            if !legal {
                return Err(ExpressionError::InvalidMultiplicity {
                    property: name.to_string(),
                    position,
                });
            }
        }
    }
    if left.navigation_info().is_some() || right.navigation_info().is_some() {
        return Ok(ExpressionType::Simple(EdmSimpleType::Boolean));
    }

    let invalid = || ExpressionError::InvalidBinaryTypes {
        operator: operator.as_str().to_string(),
        left: left.expression_type().to_string(),
        right: right.expression_type().to_string(),
        position,
    };

    let (l, r) = match (
        left.expression_type().as_simple(),
        right.expression_type().as_simple(),
    ) {
        (Some(l), Some(r)) => (l, r),
        _ => return Err(invalid()),
    };

    match operator.class() {
        OperatorClass::Logical => {
            if lattice::join(l, r) == Some(EdmSimpleType::Boolean)
                || (l == EdmSimpleType::Null && r == EdmSimpleType::Null)
            {
                Ok(ExpressionType::Simple(EdmSimpleType::Boolean))
            } else {
                Err(invalid())
            }
        }
        OperatorClass::Equality => {
            if lattice::join(l, r).is_some() {
                Ok(ExpressionType::Simple(EdmSimpleType::Boolean))
            } else {
                Err(invalid())
            }
        }
        OperatorClass::Relational => match lattice::join(l, r) {
            Some(joined) if is_orderable(joined) => {
                Ok(ExpressionType::Simple(EdmSimpleType::Boolean))
            }
            _ => Err(invalid()),
        },
        OperatorClass::Arithmetic => match lattice::join(l, r) {
            Some(joined) if joined.is_numeric() => Ok(ExpressionType::Simple(joined)),
            _ => Err(invalid()),
        },
    }
}

/// Result type of a unary node, or a typing error
pub(crate) fn check_unary(
    operator: UnaryOperator,
    operand: &CommonExpression,
    position: usize,
) -> ExpressionResult<ExpressionType> {
    if let Some((name, multiplicity)) = operand.navigation_info() {
        if !multiplicity.is_single() {
            return Err(ExpressionError::InvalidMultiplicity {
                property: name.to_string(),
                position,
            });
        }
    }

    let invalid = || ExpressionError::InvalidUnaryType {
        operator: operator.as_str().to_string(),
        operand: operand.expression_type().to_string(),
        position,
    };

    let ty = match operand.expression_type().as_simple() {
        Some(t) => t,
        None => return Err(invalid()),
    };

    match operator {
        UnaryOperator::Not => {
            if matches!(ty, EdmSimpleType::Boolean | EdmSimpleType::Null) {
                Ok(ExpressionType::Simple(EdmSimpleType::Boolean))
            } else {
                Err(invalid())
            }
        }
        UnaryOperator::Minus => {
            if ty.is_numeric() || ty == EdmSimpleType::Null {
                Ok(ExpressionType::Simple(ty))
            } else {
                Err(invalid())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ast::PropertyClass;
    use crate::types::UriLiteral;
    use assert_matches::assert_matches;
    use odata_edm::{Multiplicity, TypeName};

    fn literal(text: &str, kind: EdmSimpleType) -> CommonExpression {
        CommonExpression::Literal {
            value: UriLiteral::new(text, kind),
            ty: ExpressionType::Simple(kind),
        }
    }

    fn nav(multiplicity: Multiplicity) -> CommonExpression {
        CommonExpression::Property {
            name: "ne_Team".to_string(),
            class: PropertyClass::Navigation { multiplicity },
            ty: ExpressionType::Entity(TypeName::new("Demo", "Team")),
        }
    }

    #[test]
    fn test_operator_words() {
        assert_eq!(BinaryOperator::from_word("eq"), Some(BinaryOperator::Eq));
        assert_eq!(BinaryOperator::from_word("mod"), Some(BinaryOperator::Mod));
        assert_eq!(BinaryOperator::from_word("EQ"), None);
        assert_eq!(BinaryOperator::from_word("equals"), None);
    }

    #[test]
    fn test_precedence_table() {
        use BinaryOperator::*;
        assert!(Or.precedence() < And.precedence());
        assert!(And.precedence() < Eq.precedence());
        assert_eq!(Eq.precedence(), Lt.precedence());
        assert!(Lt.precedence() < Add.precedence());
        assert!(Add.precedence() < Mul.precedence());
    }

    #[test]
    fn test_arithmetic_join() {
        let result = check_binary(
            BinaryOperator::Add,
            &literal("130", EdmSimpleType::Byte),
            &literal("5", EdmSimpleType::Uint7),
            0,
        )
        .unwrap();
        assert_eq!(result, ExpressionType::Simple(EdmSimpleType::Byte));
    }

    #[test]
    fn test_arithmetic_with_null_adopts_other_type() {
        // "130 add null" keeps Byte
        let result = check_binary(
            BinaryOperator::Add,
            &literal("130", EdmSimpleType::Byte),
            &literal("null", EdmSimpleType::Null),
            0,
        )
        .unwrap();
        assert_eq!(result, ExpressionType::Simple(EdmSimpleType::Byte));
    }

    #[test]
    fn test_relational_yields_boolean() {
        let result = check_binary(
            BinaryOperator::Lt,
            &literal("3", EdmSimpleType::Uint7),
            &literal("2.5", EdmSimpleType::Decimal),
            0,
        )
        .unwrap();
        assert_eq!(result, ExpressionType::Simple(EdmSimpleType::Boolean));
    }

    #[test]
    fn test_string_arithmetic_rejected() {
        assert_matches!(
            check_binary(
                BinaryOperator::Add,
                &literal("a", EdmSimpleType::String),
                &literal("1", EdmSimpleType::Bit),
                3,
            ),
            Err(ExpressionError::InvalidBinaryTypes { position: 3, .. })
        );
    }

    #[test]
    fn test_boolean_relational_rejected() {
        assert_matches!(
            check_binary(
                BinaryOperator::Lt,
                &literal("true", EdmSimpleType::Boolean),
                &literal("false", EdmSimpleType::Boolean),
                0,
            ),
            Err(ExpressionError::InvalidBinaryTypes { .. })
        );
    }

    #[test]
    fn test_nav_eq_null_is_legal() {
        let result = check_binary(
            BinaryOperator::Eq,
            &nav(Multiplicity::One),
            &literal("null", EdmSimpleType::Null),
            0,
        )
        .unwrap();
        assert_eq!(result, ExpressionType::Simple(EdmSimpleType::Boolean));
    }

    #[test]
    fn test_nav_against_non_null_rejected() {
        assert_matches!(
            check_binary(
                BinaryOperator::Eq,
                &nav(Multiplicity::One),
                &literal("1", EdmSimpleType::Bit),
                0,
            ),
            Err(ExpressionError::InvalidMultiplicity { .. })
        );
    }

    #[test]
    fn test_collection_nav_always_rejected() {
        assert_matches!(
            check_binary(
                BinaryOperator::Eq,
                &nav(Multiplicity::Many),
                &literal("null", EdmSimpleType::Null),
                0,
            ),
            Err(ExpressionError::InvalidMultiplicity { .. })
        );
    }

    #[test]
    fn test_unary_rules() {
        let result =
            check_unary(UnaryOperator::Minus, &literal("5", EdmSimpleType::Uint7), 0).unwrap();
        assert_eq!(result, ExpressionType::Simple(EdmSimpleType::Uint7));

        let result = check_unary(
            UnaryOperator::Not,
            &literal("true", EdmSimpleType::Boolean),
            0,
        )
        .unwrap();
        assert_eq!(result, ExpressionType::Simple(EdmSimpleType::Boolean));

        assert_matches!(
            check_unary(UnaryOperator::Not, &literal("5", EdmSimpleType::Uint7), 0),
            Err(ExpressionError::InvalidUnaryType { .. })
        );
        assert_matches!(
            check_unary(UnaryOperator::Minus, &literal("a", EdmSimpleType::String), 0),
            Err(ExpressionError::InvalidUnaryType { .. })
        );
    }

    #[test]
    fn test_sort_order_words_lowercase_only() {
        assert_eq!(SortOrder::from_word("asc"), Some(SortOrder::Ascending));
        assert_eq!(SortOrder::from_word("desc"), Some(SortOrder::Descending));
        assert_eq!(SortOrder::from_word("ASC"), None);
        assert_eq!(SortOrder::from_word("Desc"), None);
    }
}
