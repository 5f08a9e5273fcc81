//! Configuration module: compile-time limits and runtime preferences

pub mod constants;
pub mod runtime;

pub use runtime::ParserPreferences;
