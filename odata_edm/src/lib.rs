// Internal modules
pub mod error;
pub mod provider;
pub mod schema;
pub mod types;

// Re-export key types for library consumers
pub use error::EdmError;
pub use provider::{
    declared_key_properties, entity_type_of_set, function_import_entity_set, navigation_target,
    target_multiplicity, EdmProvider, InMemoryProvider,
};
pub use schema::{
    Association, AssociationEnd, AssociationSet, AssociationSetEnd, ComplexType, EntityContainer,
    EntitySet, EntityType, FunctionImport, FunctionImportParameter, NavigationProperty, Property,
    PropertyKind, ReturnKind, ReturnType, Schema, TypeName,
};
pub use types::{EdmSimpleType, Multiplicity};
