pub mod percent;
pub mod span;

pub use percent::{decode_percent, decode_plus_as_space};
pub use span::{Span, Spanned};
