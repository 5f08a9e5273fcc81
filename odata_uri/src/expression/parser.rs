//! Precedence-climbing parser for the filter/orderby grammar
//!
//! Descending precedence: `or` < `and` < relational < additive <
//! multiplicative < unary < member/primary. Every constructed node is typed
//! immediately; property paths resolve against the EDM as they are built.

use crate::config::constants::limits::expression::{
    MAX_EXPRESSION_DEPTH, MAX_METHOD_PARAMETERS,
};
use crate::expression::ast::{CommonExpression, ExpressionType, OrderExpression, PropertyClass};
use crate::expression::error::{ExpressionError, ExpressionResult};
use crate::expression::methods::{self, MethodOperator};
use crate::expression::operators::{self, BinaryOperator, SortOrder, UnaryOperator};
use crate::expression::tokens::Token;
use crate::utils::Spanned;
use odata_edm::{EdmError, EdmProvider, EntityType, PropertyKind};

pub(crate) struct ExpressionParser<'a> {
    provider: &'a dyn EdmProvider,
    entity_type: &'a EntityType,
    tokens: Vec<Spanned<Token>>,
    pos: usize,
    depth: usize,
}

impl<'a> ExpressionParser<'a> {
    pub(crate) fn new(
        provider: &'a dyn EdmProvider,
        entity_type: &'a EntityType,
        tokens: Vec<Spanned<Token>>,
    ) -> Self {
        Self {
            provider,
            entity_type,
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Parse the whole token stream as one expression
    pub(crate) fn parse_single(&mut self) -> ExpressionResult<CommonExpression> {
        let expr = self.parse_expression(1)?;
        match self.current() {
            None => Ok(expr),
            Some(tok) => Err(ExpressionError::InvalidToken {
                token: tok.value.describe(),
                position: tok.span.start,
            }),
        }
    }

    /// Parse a comma-separated orderby list: `expr [asc|desc], ...`
    pub(crate) fn parse_order_entries(&mut self) -> ExpressionResult<Vec<OrderExpression>> {
        let mut orders = Vec::new();

        loop {
            let expression = self.parse_expression(1)?;

            let order = match self.current() {
                Some(tok) => match &tok.value {
                    Token::Word(word) => match SortOrder::from_word(word) {
                        Some(order) => {
                            self.advance();
                            order
                        }
                        None => {
                            return Err(ExpressionError::InvalidSortOrder {
                                token: word.clone(),
                                position: tok.span.start,
                            })
                        }
                    },
                    _ => SortOrder::Ascending,
                },
                None => SortOrder::Ascending,
            };

            orders.push(OrderExpression { expression, order });

            match self.current() {
                None => break,
                Some(tok) if tok.value == Token::Comma => {
                    self.advance();
                }
                Some(tok) => {
                    return Err(ExpressionError::InvalidToken {
                        token: tok.value.describe(),
                        position: tok.span.start,
                    })
                }
            }
        }

        Ok(orders)
    }

    // ========================================================================
    // TOKEN ACCESS
    // ========================================================================

    fn current(&self) -> Option<&Spanned<Token>> {
        self.tokens.get(self.pos)
    }

    fn peek_next(&self) -> Option<&Spanned<Token>> {
        self.tokens.get(self.pos + 1)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn current_operator(&self) -> Option<BinaryOperator> {
        match self.current().map(|t| &t.value) {
            Some(Token::Word(word)) => BinaryOperator::from_word(word),
            _ => None,
        }
    }

    // ========================================================================
    // GRAMMAR
    // ========================================================================

    fn parse_expression(&mut self, min_precedence: u8) -> ExpressionResult<CommonExpression> {
        self.depth += 1;
        if self.depth > MAX_EXPRESSION_DEPTH {
            return Err(ExpressionError::TooDeep {
                maximum: MAX_EXPRESSION_DEPTH,
            });
        }
        let result = self.parse_binary(min_precedence);
        self.depth -= 1;
        result
    }

    fn parse_binary(&mut self, min_precedence: u8) -> ExpressionResult<CommonExpression> {
        let mut left = self.parse_unary()?;

        while let Some(operator) = self.current_operator() {
            let precedence = operator.precedence();
            if precedence < min_precedence {
                break;
            }
            let operator_position = self.current().map(|t| t.span.start).unwrap_or(0);
            self.advance();

            // left-associative: the right side only takes tighter operators
            let right = self.parse_expression(precedence + 1)?;
            let ty = operators::check_binary(operator, &left, &right, operator_position)?;
            left = CommonExpression::Binary {
                operator,
                left: Box::new(left),
                right: Box::new(right),
                ty,
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ExpressionResult<CommonExpression> {
        match self.current().map(|t| (&t.value, t.span)) {
            Some((Token::Minus, span)) => {
                let position = span.start;
                self.advance();
                // sign stacks: `- - x` nests
                let operand = self.parse_unary()?;
                let ty = operators::check_unary(UnaryOperator::Minus, &operand, position)?;
                Ok(CommonExpression::Unary {
                    operator: UnaryOperator::Minus,
                    operand: Box::new(operand),
                    ty,
                })
            }
            Some((Token::Word(word), span)) if word == "not" => {
                let position = span.start;
                self.advance();
                let operand = self.parse_unary()?;
                let ty = operators::check_unary(UnaryOperator::Not, &operand, position)?;
                Ok(CommonExpression::Unary {
                    operator: UnaryOperator::Not,
                    operand: Box::new(operand),
                    ty,
                })
            }
            _ => self.parse_member(),
        }
    }

    /// Primary expression followed by any number of `/` member hops
    fn parse_member(&mut self) -> ExpressionResult<CommonExpression> {
        let mut expr = self.parse_primary()?;

        while self.current().map(|t| &t.value) == Some(&Token::Slash) {
            self.advance();

            let (name, position) = match self.current() {
                Some(tok) => match &tok.value {
                    Token::Word(word) => (word.clone(), tok.span.start),
                    other => {
                        return Err(ExpressionError::InvalidToken {
                            token: other.describe(),
                            position: tok.span.start,
                        })
                    }
                },
                None => {
                    return Err(ExpressionError::UnexpectedEnd {
                        expected: "property name after '/'".to_string(),
                    })
                }
            };
            self.advance();

            let property = self.resolve_member_property(&expr, &name, position)?;
            let ty = property.expression_type().clone();
            expr = CommonExpression::Member {
                path: Box::new(expr),
                property: Box::new(property),
                ty,
            };
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> ExpressionResult<CommonExpression> {
        let tok = match self.current() {
            Some(tok) => tok.clone(),
            None => {
                return Err(ExpressionError::UnexpectedEnd {
                    expected: "expression".to_string(),
                })
            }
        };

        match tok.value {
            Token::Literal(value) => {
                self.advance();
                let ty = ExpressionType::Simple(value.kind);
                Ok(CommonExpression::Literal { value, ty })
            }
            Token::OpenParen => {
                let open_position = tok.span.start;
                self.advance();
                let inner = self.parse_expression(1)?;
                match self.current() {
                    Some(tok) if tok.value == Token::CloseParen => {
                        self.advance();
                        // grouping unwraps; no AST node
                        Ok(inner)
                    }
                    Some(tok) => Err(ExpressionError::InvalidToken {
                        token: tok.value.describe(),
                        position: tok.span.start,
                    }),
                    None => Err(ExpressionError::UnbalancedParentheses {
                        position: open_position,
                    }),
                }
            }
            Token::Word(word) => {
                let position = tok.span.start;
                if self.peek_next().map(|t| &t.value) == Some(&Token::OpenParen) {
                    self.parse_method_call(&word, position)
                } else {
                    self.advance();
                    self.resolve_entity_property(self.entity_type, &word, position)
                }
            }
            other => Err(ExpressionError::InvalidToken {
                token: other.describe(),
                position: tok.span.start,
            }),
        }
    }

    fn parse_method_call(
        &mut self,
        word: &str,
        position: usize,
    ) -> ExpressionResult<CommonExpression> {
        let method =
            MethodOperator::from_word(word).ok_or_else(|| ExpressionError::UnknownMethod {
                method: word.to_string(),
                position,
            })?;
        self.advance(); // method name
        let open_position = self.current().map(|t| t.span.start).unwrap_or(position);
        self.advance(); // open paren

        let mut parameters = Vec::new();
        if self.current().map(|t| &t.value) == Some(&Token::CloseParen) {
            self.advance();
        } else {
            loop {
                let parameter = self.parse_expression(1)?;

                // collection-valued navigation is never a method argument
                if let Some((name, multiplicity)) = parameter.navigation_info() {
                    if !multiplicity.is_single() {
                        return Err(ExpressionError::InvalidMultiplicity {
                            property: name.to_string(),
                            position,
                        });
                    }
                }
                parameters.push(parameter);

                if parameters.len() > MAX_METHOD_PARAMETERS {
                    return Err(ExpressionError::TooManyParameters {
                        method: method.as_str().to_string(),
                        maximum: MAX_METHOD_PARAMETERS,
                        found: parameters.len(),
                        position,
                    });
                }

                match self.current() {
                    Some(tok) if tok.value == Token::Comma => self.advance(),
                    Some(tok) if tok.value == Token::CloseParen => {
                        self.advance();
                        break;
                    }
                    Some(tok) => {
                        return Err(ExpressionError::InvalidToken {
                            token: tok.value.describe(),
                            position: tok.span.start,
                        })
                    }
                    None => {
                        return Err(ExpressionError::UnbalancedParentheses {
                            position: open_position,
                        })
                    }
                }
            }
        }

        let parameter_types: Vec<ExpressionType> = parameters
            .iter()
            .map(|p| p.expression_type().clone())
            .collect();
        let ty = methods::resolve_method(method, &parameter_types, position)?;

        Ok(CommonExpression::Method {
            method,
            parameters,
            ty,
        })
    }

    // ========================================================================
    // EDM RESOLUTION
    // ========================================================================

    /// Resolve `name` against an entity type, producing a typed property node
    fn resolve_entity_property(
        &self,
        entity_type: &EntityType,
        name: &str,
        position: usize,
    ) -> ExpressionResult<CommonExpression> {
        if let Some(property) = entity_type.property(name) {
            let (class, ty) = match &property.kind {
                PropertyKind::Simple(simple) => {
                    (PropertyClass::Simple, ExpressionType::Simple(*simple))
                }
                PropertyKind::Complex(type_name) => (
                    PropertyClass::Complex,
                    ExpressionType::Complex(type_name.clone()),
                ),
            };
            return Ok(CommonExpression::Property {
                name: name.to_string(),
                class,
                ty,
            });
        }

        if let Some(nav) = entity_type.navigation_property(name) {
            let association = self
                .provider
                .association(&nav.relationship)?
                .ok_or_else(|| {
                    EdmError::inconsistent(format!(
                        "navigation property '{}' references unknown association '{}'",
                        nav.name, nav.relationship
                    ))
                })?;
            let end = association.end(&nav.to_role).ok_or_else(|| {
                EdmError::inconsistent(format!(
                    "association '{}' has no end with role '{}'",
                    nav.relationship, nav.to_role
                ))
            })?;
            return Ok(CommonExpression::Property {
                name: name.to_string(),
                class: PropertyClass::Navigation {
                    multiplicity: end.multiplicity,
                },
                ty: ExpressionType::Entity(end.entity_type.clone()),
            });
        }

        Err(ExpressionError::PropertyNotFound {
            property: name.to_string(),
            type_name: entity_type.name.clone(),
            position,
        })
    }

    /// Resolve the right side of a `/` against the type of the left side
    fn resolve_member_property(
        &self,
        left: &CommonExpression,
        name: &str,
        position: usize,
    ) -> ExpressionResult<CommonExpression> {
        // a collection-valued hop cannot be traversed
        if let Some((nav_name, multiplicity)) = left.navigation_info() {
            if !multiplicity.is_single() {
                return Err(ExpressionError::InvalidMultiplicity {
                    property: nav_name.to_string(),
                    position,
                });
            }
        }

        match left.expression_type() {
            ExpressionType::Entity(type_name) => {
                let entity_type = self.provider.entity_type(type_name)?.ok_or_else(|| {
                    EdmError::inconsistent(format!("unknown entity type '{}'", type_name))
                })?;
                self.resolve_entity_property(entity_type, name, position)
            }
            ExpressionType::Complex(type_name) => {
                let complex_type = self.provider.complex_type(type_name)?.ok_or_else(|| {
                    EdmError::inconsistent(format!("unknown complex type '{}'", type_name))
                })?;
                match complex_type.property(name) {
                    Some(property) => {
                        let (class, ty) = match &property.kind {
                            PropertyKind::Simple(simple) => {
                                (PropertyClass::Simple, ExpressionType::Simple(*simple))
                            }
                            PropertyKind::Complex(inner) => (
                                PropertyClass::Complex,
                                ExpressionType::Complex(inner.clone()),
                            ),
                        };
                        Ok(CommonExpression::Property {
                            name: name.to_string(),
                            class,
                            ty,
                        })
                    }
                    None => Err(ExpressionError::PropertyNotFound {
                        property: name.to_string(),
                        type_name: complex_type.name.clone(),
                        position,
                    }),
                }
            }
            ExpressionType::Simple(_) => Err(ExpressionError::TypeExpectedAt {
                expected: "structured type before '/'".to_string(),
                position,
            }),
        }
    }
}
