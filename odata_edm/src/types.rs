//! EDM simple types and association-end multiplicity
//!
//! The simple-type set is the OData V1/V2 vocabulary plus two sub-byte
//! integer kinds (`Bit`, `Uint7`) that never appear in a schema: they exist
//! so the literal parser can record the narrowest type an unsuffixed integer
//! fits into, which drives promotion decisions later.

use serde::{Deserialize, Serialize};
use std::fmt;

/// EDM simple (primitive) types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdmSimpleType {
    Binary,
    Boolean,
    Byte,
    DateTime,
    DateTimeOffset,
    Decimal,
    Double,
    Guid,
    Int16,
    Int32,
    Int64,
    Null,
    SByte,
    Single,
    String,
    Time,
    /// Inference-only: an integer literal that is exactly 0 or 1
    Bit,
    /// Inference-only: an integer literal in 0..=127 (7-bit unsigned)
    Uint7,
}

impl EdmSimpleType {
    /// Fully qualified type name as it appears in metadata (`Edm.Int32`).
    /// The two inference-only kinds carry unqualified internal names.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Binary => "Edm.Binary",
            Self::Boolean => "Edm.Boolean",
            Self::Byte => "Edm.Byte",
            Self::DateTime => "Edm.DateTime",
            Self::DateTimeOffset => "Edm.DateTimeOffset",
            Self::Decimal => "Edm.Decimal",
            Self::Double => "Edm.Double",
            Self::Guid => "Edm.Guid",
            Self::Int16 => "Edm.Int16",
            Self::Int32 => "Edm.Int32",
            Self::Int64 => "Edm.Int64",
            Self::Null => "Edm.Null",
            Self::SByte => "Edm.SByte",
            Self::Single => "Edm.Single",
            Self::String => "Edm.String",
            Self::Time => "Edm.Time",
            Self::Bit => "Bit",
            Self::Uint7 => "Uint7",
        }
    }

    /// Resolve a metadata type name (`Edm.X` form only; internal kinds are
    /// not addressable by name)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Edm.Binary" => Some(Self::Binary),
            "Edm.Boolean" => Some(Self::Boolean),
            "Edm.Byte" => Some(Self::Byte),
            "Edm.DateTime" => Some(Self::DateTime),
            "Edm.DateTimeOffset" => Some(Self::DateTimeOffset),
            "Edm.Decimal" => Some(Self::Decimal),
            "Edm.Double" => Some(Self::Double),
            "Edm.Guid" => Some(Self::Guid),
            "Edm.Int16" => Some(Self::Int16),
            "Edm.Int32" => Some(Self::Int32),
            "Edm.Int64" => Some(Self::Int64),
            "Edm.Null" => Some(Self::Null),
            "Edm.SByte" => Some(Self::SByte),
            "Edm.Single" => Some(Self::Single),
            "Edm.String" => Some(Self::String),
            "Edm.Time" => Some(Self::Time),
            _ => None,
        }
    }

    /// True for the literal-inference internals that never appear in a schema
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Bit | Self::Uint7)
    }

    /// True for the integer kinds (including the inference internals)
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Bit
                | Self::Uint7
                | Self::SByte
                | Self::Byte
                | Self::Int16
                | Self::Int32
                | Self::Int64
        )
    }

    /// True for every numeric kind on the promotion ladder
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, Self::Single | Self::Double | Self::Decimal)
    }

    /// True for the temporal kinds
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::DateTime | Self::DateTimeOffset | Self::Time)
    }
}

impl fmt::Display for EdmSimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Multiplicity of an association end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Multiplicity {
    /// Exactly one (`1`)
    One,
    /// Zero or one (`0..1`)
    ZeroOrOne,
    /// Many (`*`)
    Many,
}

impl Multiplicity {
    /// Parse the metadata spelling of a multiplicity
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "1" => Some(Self::One),
            "0..1" => Some(Self::ZeroOrOne),
            "*" => Some(Self::Many),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::One => "1",
            Self::ZeroOrOne => "0..1",
            Self::Many => "*",
        }
    }

    /// True when the end targets at most one entity
    pub fn is_single(&self) -> bool {
        !matches!(self, Self::Many)
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
