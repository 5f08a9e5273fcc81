//! Numeric type promotion lattice
//!
//! The numeric simple types form a total order; everything else is only
//! promotable to itself. `Null` is the bottom element: it is compatible with
//! any expected type and adopts the other operand's type when joined.

use odata_edm::EdmSimpleType;

/// Numeric promotion ladder, narrowest first
pub const NUMERIC_LADDER: [EdmSimpleType; 10] = [
    EdmSimpleType::Bit,
    EdmSimpleType::Uint7,
    EdmSimpleType::SByte,
    EdmSimpleType::Byte,
    EdmSimpleType::Int16,
    EdmSimpleType::Int32,
    EdmSimpleType::Int64,
    EdmSimpleType::Single,
    EdmSimpleType::Double,
    EdmSimpleType::Decimal,
];

fn ladder_rank(ty: EdmSimpleType) -> Option<usize> {
    NUMERIC_LADDER.iter().position(|&t| t == ty)
}

/// True if a value of type `from` can be used where `to` is required.
/// Reflexive; among numerics it follows the ladder order.
pub fn is_promotable(from: EdmSimpleType, to: EdmSimpleType) -> bool {
    if from == to {
        return true;
    }
    match (ladder_rank(from), ladder_rank(to)) {
        (Some(f), Some(t)) => f <= t,
        _ => false,
    }
}

/// Literal-against-property compatibility: promotable, or the literal is null
pub fn is_compatible(actual: EdmSimpleType, expected: EdmSimpleType) -> bool {
    actual == EdmSimpleType::Null || is_promotable(actual, expected)
}

/// Least common promoted type of two operands, if any. A `Null` operand
/// adopts the other operand's type.
pub fn join(a: EdmSimpleType, b: EdmSimpleType) -> Option<EdmSimpleType> {
    if a == EdmSimpleType::Null {
        return Some(b);
    }
    if b == EdmSimpleType::Null {
        return Some(a);
    }
    if a == b {
        return Some(a);
    }
    match (ladder_rank(a), ladder_rank(b)) {
        (Some(ra), Some(rb)) => Some(NUMERIC_LADDER[ra.max(rb)]),
        _ => None,
    }
}
