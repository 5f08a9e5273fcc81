//! Typed expression trees for $filter and $orderby
//!
//! Nodes are immutable after construction and every node carries its
//! resolved type; there is no separate re-typing pass. EDM objects are not
//! retained: property nodes record the resolved names and types instead, so
//! the tree outlives the parse without borrowing the model.

use crate::expression::methods::MethodOperator;
use crate::expression::operators::{BinaryOperator, SortOrder, UnaryOperator};
use crate::types::UriLiteral;
use odata_edm::{EdmSimpleType, Multiplicity, TypeName};
use serde::Serialize;
use std::fmt;

/// Resolved type of an expression node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExpressionType {
    Simple(EdmSimpleType),
    Complex(TypeName),
    Entity(TypeName),
}

impl ExpressionType {
    pub fn as_simple(&self) -> Option<EdmSimpleType> {
        match self {
            Self::Simple(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for ExpressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(t) => write!(f, "{}", t),
            Self::Complex(n) | Self::Entity(n) => write!(f, "{}", n),
        }
    }
}

/// What kind of property a `Property` node resolved to
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PropertyClass {
    Simple,
    Complex,
    Navigation { multiplicity: Multiplicity },
}

/// Common expression node (filter and orderby share it)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CommonExpression {
    Literal {
        value: UriLiteral,
        ty: ExpressionType,
    },
    Property {
        name: String,
        class: PropertyClass,
        ty: ExpressionType,
    },
    /// Navigation via `/`: `a/b/c` is `Member(Member(a, b), c)`
    Member {
        path: Box<CommonExpression>,
        property: Box<CommonExpression>,
        ty: ExpressionType,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<CommonExpression>,
        ty: ExpressionType,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<CommonExpression>,
        right: Box<CommonExpression>,
        ty: ExpressionType,
    },
    Method {
        method: MethodOperator,
        parameters: Vec<CommonExpression>,
        ty: ExpressionType,
    },
}

impl CommonExpression {
    pub fn expression_type(&self) -> &ExpressionType {
        match self {
            Self::Literal { ty, .. }
            | Self::Property { ty, .. }
            | Self::Member { ty, .. }
            | Self::Unary { ty, .. }
            | Self::Binary { ty, .. }
            | Self::Method { ty, .. } => ty,
        }
    }

    /// The literal `null`, which may stand in for any type
    pub fn is_null_literal(&self) -> bool {
        matches!(
            self,
            Self::Literal { value, .. } if value.kind == EdmSimpleType::Null
        )
    }

    /// If this node denotes a navigation property (directly or as the last
    /// hop of a member chain), its name and target multiplicity
    pub fn navigation_info(&self) -> Option<(&str, Multiplicity)> {
        match self {
            Self::Property {
                name,
                class: PropertyClass::Navigation { multiplicity },
                ..
            } => Some((name, *multiplicity)),
            Self::Member { property, .. } => property.navigation_info(),
            _ => None,
        }
    }
}

/// One `$orderby` entry: expression plus direction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderExpression {
    pub expression: CommonExpression,
    pub order: SortOrder,
}

/// Parsed `$filter`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterExpression {
    pub expression_string: String,
    pub expression: CommonExpression,
}

/// Parsed `$orderby`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderByExpression {
    pub expression_string: String,
    pub orders: Vec<OrderExpression>,
}
