//! Plain schema data structures
//!
//! These are deliberately dumb records: the engine reads them through the
//! `EdmProvider` trait and a handful of free functions, rather than through a
//! wrapper type per EDM construct. Lookup helpers that only need one struct
//! (find a property on an entity type) live here as methods.

use crate::types::{EdmSimpleType, Multiplicity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace-qualified type name (`ODataDemo.Employee`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeName {
    pub namespace: String,
    pub name: String,
}

impl TypeName {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// Parse a `Namespace.Name` string; the last dot separates the name
    pub fn parse(fqn: &str) -> Option<Self> {
        let idx = fqn.rfind('.')?;
        if idx == 0 || idx + 1 == fqn.len() {
            return None;
        }
        Some(Self {
            namespace: fqn[..idx].to_string(),
            name: fqn[idx + 1..].to_string(),
        })
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// One CSDL schema: types, associations and containers under one namespace
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    pub namespace: String,
    pub entity_types: Vec<EntityType>,
    pub complex_types: Vec<ComplexType>,
    pub associations: Vec<Association>,
    pub entity_containers: Vec<EntityContainer>,
}

/// Entity container: named scope for sets, association sets and function imports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityContainer {
    pub name: String,
    pub is_default: bool,
    pub entity_sets: Vec<EntitySet>,
    pub association_sets: Vec<AssociationSet>,
    pub function_imports: Vec<FunctionImport>,
}

impl EntityContainer {
    pub fn entity_set(&self, name: &str) -> Option<&EntitySet> {
        self.entity_sets.iter().find(|s| s.name == name)
    }

    pub fn function_import(&self, name: &str) -> Option<&FunctionImport> {
        self.function_imports.iter().find(|f| f.name == name)
    }

    pub fn association_set_for(&self, association: &TypeName) -> Option<&AssociationSet> {
        self.association_sets
            .iter()
            .find(|s| &s.association == association)
    }
}

/// Named collection of entities of one declared type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySet {
    pub name: String,
    pub entity_type: TypeName,
}

/// Entity type: keyed, property-carrying, possibly media-linked
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityType {
    pub name: String,
    /// Names of the key properties, in declaration order
    pub key_properties: Vec<String>,
    pub properties: Vec<Property>,
    pub navigation_properties: Vec<NavigationProperty>,
    pub has_stream: bool,
}

impl EntityType {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn navigation_property(&self, name: &str) -> Option<&NavigationProperty> {
        self.navigation_properties.iter().find(|n| n.name == name)
    }

    /// True when `name` is declared as a key property
    pub fn is_key_property(&self, name: &str) -> bool {
        self.key_properties.iter().any(|k| k == name)
    }
}

/// Complex type: structured value without identity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplexType {
    pub name: String,
    pub properties: Vec<Property>,
}

impl ComplexType {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Declared type of a structural property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyKind {
    Simple(EdmSimpleType),
    Complex(TypeName),
}

/// Structural property of an entity or complex type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub kind: PropertyKind,
    pub nullable: bool,
}

impl Property {
    pub fn simple(name: &str, simple_type: EdmSimpleType) -> Self {
        Self {
            name: name.to_string(),
            kind: PropertyKind::Simple(simple_type),
            nullable: true,
        }
    }

    pub fn complex(name: &str, type_name: TypeName) -> Self {
        Self {
            name: name.to_string(),
            kind: PropertyKind::Complex(type_name),
            nullable: true,
        }
    }

    pub fn not_nullable(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Declared simple type, if this is a simple property
    pub fn simple_type(&self) -> Option<EdmSimpleType> {
        match &self.kind {
            PropertyKind::Simple(t) => Some(*t),
            PropertyKind::Complex(_) => None,
        }
    }
}

/// Navigation property: one traversable end of an association
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationProperty {
    pub name: String,
    pub relationship: TypeName,
    pub from_role: String,
    pub to_role: String,
}

/// Association between two entity-type roles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Association {
    pub name: String,
    pub ends: Vec<AssociationEnd>,
}

impl Association {
    pub fn end(&self, role: &str) -> Option<&AssociationEnd> {
        self.ends.iter().find(|e| e.role == role)
    }
}

/// One role of an association
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationEnd {
    pub role: String,
    pub entity_type: TypeName,
    pub multiplicity: Multiplicity,
}

/// Binds an association's roles to entity sets within a container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationSet {
    pub name: String,
    pub association: TypeName,
    pub ends: Vec<AssociationSetEnd>,
}

impl AssociationSet {
    pub fn end(&self, role: &str) -> Option<&AssociationSetEnd> {
        self.ends.iter().find(|e| e.role == role)
    }
}

/// One bound role of an association set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationSetEnd {
    pub role: String,
    pub entity_set: String,
}

/// What a function import returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReturnKind {
    Entity(TypeName),
    Complex(TypeName),
    Simple(EdmSimpleType),
}

/// Declared return type of a function import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnType {
    pub kind: ReturnKind,
    pub multiplicity: Multiplicity,
}

impl ReturnType {
    pub fn entity(type_name: TypeName, multiplicity: Multiplicity) -> Self {
        Self {
            kind: ReturnKind::Entity(type_name),
            multiplicity,
        }
    }

    pub fn complex(type_name: TypeName, multiplicity: Multiplicity) -> Self {
        Self {
            kind: ReturnKind::Complex(type_name),
            multiplicity,
        }
    }

    pub fn simple(simple_type: EdmSimpleType, multiplicity: Multiplicity) -> Self {
        Self {
            kind: ReturnKind::Simple(simple_type),
            multiplicity,
        }
    }
}

/// Service operation addressable as a path segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionImport {
    pub name: String,
    pub return_type: Option<ReturnType>,
    /// Entity set the result belongs to, for entity-returning imports
    pub entity_set: Option<String>,
    pub http_method: Option<String>,
    pub parameters: Vec<FunctionImportParameter>,
}

impl FunctionImport {
    pub fn parameter(&self, name: &str) -> Option<&FunctionImportParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Declared parameter of a function import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionImportParameter {
    pub name: String,
    pub simple_type: EdmSimpleType,
    pub nullable: bool,
}
