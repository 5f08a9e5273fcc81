//! EDM simple-type lattice and URI literal parsing

pub mod lattice;
pub mod literals;

pub use lattice::{is_compatible, is_promotable, join};
pub use literals::{parse_literal, LiteralError, UriLiteral};
