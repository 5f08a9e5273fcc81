//! Read-only provider interface over the schema structs
//!
//! One trait covers all by-name access the engine needs; derived lookups that
//! cross several structs (navigation target, end multiplicity) are free
//! functions. `InMemoryProvider` builds every lookup map eagerly at
//! construction, so a built provider is immutable and freely shareable
//! between threads; there is no lazy cache to race on.

use crate::error::{EdmError, EdmResult};
use crate::schema::{
    Association, ComplexType, EntityContainer, EntitySet, EntityType, FunctionImport,
    NavigationProperty, Property, Schema, TypeName,
};
use crate::types::Multiplicity;
use std::collections::HashMap;

/// Read-only, by-name access to an EDM model
pub trait EdmProvider: Send + Sync {
    fn schemas(&self) -> &[Schema];

    /// The container addressed when a path omits the container qualifier
    fn default_entity_container(&self) -> EdmResult<&EntityContainer>;

    fn entity_container(&self, name: &str) -> EdmResult<Option<&EntityContainer>>;

    fn entity_type(&self, name: &TypeName) -> EdmResult<Option<&EntityType>>;

    fn complex_type(&self, name: &TypeName) -> EdmResult<Option<&ComplexType>>;

    fn association(&self, name: &TypeName) -> EdmResult<Option<&Association>>;
}

/// Entity type an entity set is declared with; absence is an inconsistency,
/// not a user-facing miss, because the set itself was already resolved
pub fn entity_type_of_set<'a>(
    provider: &'a dyn EdmProvider,
    set: &EntitySet,
) -> EdmResult<&'a EntityType> {
    provider.entity_type(&set.entity_type)?.ok_or_else(|| {
        EdmError::inconsistent(format!(
            "entity set '{}' declares unknown entity type '{}'",
            set.name, set.entity_type
        ))
    })
}

/// Multiplicity of the target end of a navigation property
pub fn target_multiplicity(
    provider: &dyn EdmProvider,
    nav: &NavigationProperty,
) -> EdmResult<Multiplicity> {
    let association = provider.association(&nav.relationship)?.ok_or_else(|| {
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
    Ok(end.multiplicity)
}

/// Entity set and entity type reached by following a navigation property
/// out of `container`
pub fn navigation_target<'a>(
    provider: &'a dyn EdmProvider,
    container: &'a EntityContainer,
    nav: &NavigationProperty,
) -> EdmResult<(&'a EntitySet, &'a EntityType)> {
    let association_set = container
        .association_set_for(&nav.relationship)
        .ok_or_else(|| {
            EdmError::inconsistent(format!(
                "container '{}' has no association set for '{}'",
                container.name, nav.relationship
            ))
        })?;
    let end = association_set.end(&nav.to_role).ok_or_else(|| {
        EdmError::inconsistent(format!(
            "association set '{}' has no end with role '{}'",
            association_set.name, nav.to_role
        ))
    })?;
    let entity_set = container.entity_set(&end.entity_set).ok_or_else(|| {
        EdmError::inconsistent(format!(
            "association set end '{}' names unknown entity set '{}'",
            end.role, end.entity_set
        ))
    })?;
    let entity_type = entity_type_of_set(provider, entity_set)?;
    Ok((entity_set, entity_type))
}

/// Key properties of an entity type, in declaration order; a key name with
/// no matching property is an inconsistency
pub fn declared_key_properties<'a>(entity_type: &'a EntityType) -> EdmResult<Vec<&'a Property>> {
    entity_type
        .key_properties
        .iter()
        .map(|name| {
            entity_type.property(name).ok_or_else(|| {
                EdmError::inconsistent(format!(
                    "entity type '{}' declares key '{}' with no such property",
                    entity_type.name, name
                ))
            })
        })
        .collect()
}

/// Eagerly-indexed provider over owned schemas
pub struct InMemoryProvider {
    schemas: Vec<Schema>,
    /// container name -> (schema index, container index)
    containers: HashMap<String, (usize, usize)>,
    default_container: Option<(usize, usize)>,
    /// fully qualified name -> (schema index, type index)
    entity_types: HashMap<String, (usize, usize)>,
    complex_types: HashMap<String, (usize, usize)>,
    associations: HashMap<String, (usize, usize)>,
}

impl InMemoryProvider {
    /// Index the schemas; duplicate names and a missing default container are
    /// construction-time errors
    pub fn from_schemas(schemas: Vec<Schema>) -> EdmResult<Self> {
        let mut containers = HashMap::new();
        let mut default_container = None;
        let mut entity_types = HashMap::new();
        let mut complex_types = HashMap::new();
        let mut associations = HashMap::new();

        for (si, schema) in schemas.iter().enumerate() {
            for (ci, container) in schema.entity_containers.iter().enumerate() {
                if containers.insert(container.name.clone(), (si, ci)).is_some() {
                    return Err(EdmError::duplicate(&container.name));
                }
                if container.is_default {
                    if default_container.is_some() {
                        return Err(EdmError::inconsistent(
                            "more than one default entity container",
                        ));
                    }
                    default_container = Some((si, ci));
                }
            }
            for (ti, et) in schema.entity_types.iter().enumerate() {
                let fqn = format!("{}.{}", schema.namespace, et.name);
                if entity_types.insert(fqn.clone(), (si, ti)).is_some() {
                    return Err(EdmError::duplicate(&fqn));
                }
            }
            for (ti, ct) in schema.complex_types.iter().enumerate() {
                let fqn = format!("{}.{}", schema.namespace, ct.name);
                if complex_types.insert(fqn.clone(), (si, ti)).is_some() {
                    return Err(EdmError::duplicate(&fqn));
                }
            }
            for (ai, assoc) in schema.associations.iter().enumerate() {
                let fqn = format!("{}.{}", schema.namespace, assoc.name);
                if associations.insert(fqn.clone(), (si, ai)).is_some() {
                    return Err(EdmError::duplicate(&fqn));
                }
            }
        }

        Ok(Self {
            schemas,
            containers,
            default_container,
            entity_types,
            complex_types,
            associations,
        })
    }
}

impl EdmProvider for InMemoryProvider {
    fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    fn default_entity_container(&self) -> EdmResult<&EntityContainer> {
        let (si, ci) = self
            .default_container
            .ok_or(EdmError::NoDefaultContainer)?;
        Ok(&self.schemas[si].entity_containers[ci])
    }

    fn entity_container(&self, name: &str) -> EdmResult<Option<&EntityContainer>> {
        Ok(self
            .containers
            .get(name)
            .map(|&(si, ci)| &self.schemas[si].entity_containers[ci]))
    }

    fn entity_type(&self, name: &TypeName) -> EdmResult<Option<&EntityType>> {
        Ok(self
            .entity_types
            .get(&name.to_string())
            .map(|&(si, ti)| &self.schemas[si].entity_types[ti]))
    }

    fn complex_type(&self, name: &TypeName) -> EdmResult<Option<&ComplexType>> {
        Ok(self
            .complex_types
            .get(&name.to_string())
            .map(|&(si, ti)| &self.schemas[si].complex_types[ti]))
    }

    fn association(&self, name: &TypeName) -> EdmResult<Option<&Association>> {
        Ok(self
            .associations
            .get(&name.to_string())
            .map(|&(si, ai)| &self.schemas[si].associations[ai]))
    }
}

/// Resolve a function import in `container`, falling back to the declared
/// entity set lookup for entity-returning imports
pub fn function_import_entity_set<'a>(
    container: &'a EntityContainer,
    import: &FunctionImport,
) -> EdmResult<Option<&'a EntitySet>> {
    match &import.entity_set {
        None => Ok(None),
        Some(set_name) => {
            let set = container.entity_set(set_name).ok_or_else(|| {
                EdmError::inconsistent(format!(
                    "function import '{}' names unknown entity set '{}'",
                    import.name, set_name
                ))
            })?;
            Ok(Some(set))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        AssociationEnd, AssociationSet, AssociationSetEnd, EntitySet, Property,
    };
    use crate::types::EdmSimpleType;

    fn sample_schema() -> Schema {
        Schema {
            namespace: "Demo".to_string(),
            entity_types: vec![
                EntityType {
                    name: "Employee".to_string(),
                    key_properties: vec!["EmployeeId".to_string()],
                    properties: vec![
                        Property::simple("EmployeeId", EdmSimpleType::String).not_nullable(),
                    ],
                    navigation_properties: vec![NavigationProperty {
                        name: "ne_Manager".to_string(),
                        relationship: TypeName::new("Demo", "ManagerEmployees"),
                        from_role: "r_Employees".to_string(),
                        to_role: "r_Manager".to_string(),
                    }],
                    has_stream: false,
                },
                EntityType {
                    name: "Manager".to_string(),
                    key_properties: vec!["EmployeeId".to_string()],
                    properties: vec![
                        Property::simple("EmployeeId", EdmSimpleType::String).not_nullable(),
                    ],
                    navigation_properties: vec![],
                    has_stream: false,
                },
            ],
            complex_types: vec![],
            associations: vec![Association {
                name: "ManagerEmployees".to_string(),
                ends: vec![
                    AssociationEnd {
                        role: "r_Manager".to_string(),
                        entity_type: TypeName::new("Demo", "Manager"),
                        multiplicity: Multiplicity::One,
                    },
                    AssociationEnd {
                        role: "r_Employees".to_string(),
                        entity_type: TypeName::new("Demo", "Employee"),
                        multiplicity: Multiplicity::Many,
                    },
                ],
            }],
            entity_containers: vec![EntityContainer {
                name: "Container".to_string(),
                is_default: true,
                entity_sets: vec![
                    EntitySet {
                        name: "Employees".to_string(),
                        entity_type: TypeName::new("Demo", "Employee"),
                    },
                    EntitySet {
                        name: "Managers".to_string(),
                        entity_type: TypeName::new("Demo", "Manager"),
                    },
                ],
                association_sets: vec![AssociationSet {
                    name: "ManagerEmployeesSet".to_string(),
                    association: TypeName::new("Demo", "ManagerEmployees"),
                    ends: vec![
                        AssociationSetEnd {
                            role: "r_Manager".to_string(),
                            entity_set: "Managers".to_string(),
                        },
                        AssociationSetEnd {
                            role: "r_Employees".to_string(),
                            entity_set: "Employees".to_string(),
                        },
                    ],
                }],
                function_imports: vec![],
            }],
        }
    }

    #[test]
    fn test_container_lookup() {
        let provider = InMemoryProvider::from_schemas(vec![sample_schema()]).unwrap();

        let default = provider.default_entity_container().unwrap();
        assert_eq!(default.name, "Container");

        assert!(provider.entity_container("Container").unwrap().is_some());
        assert!(provider.entity_container("Nope").unwrap().is_none());
    }

    #[test]
    fn test_type_lookup() {
        let provider = InMemoryProvider::from_schemas(vec![sample_schema()]).unwrap();

        let tn = TypeName::new("Demo", "Employee");
        let et = provider.entity_type(&tn).unwrap().unwrap();
        assert_eq!(et.name, "Employee");

        assert!(provider
            .entity_type(&TypeName::new("Demo", "Missing"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_navigation_target_resolution() {
        let provider = InMemoryProvider::from_schemas(vec![sample_schema()]).unwrap();
        let container = provider.default_entity_container().unwrap();
        let employee = provider
            .entity_type(&TypeName::new("Demo", "Employee"))
            .unwrap()
            .unwrap();
        let nav = employee.navigation_property("ne_Manager").unwrap();

        let (set, et) = navigation_target(&provider, container, nav).unwrap();
        assert_eq!(set.name, "Managers");
        assert_eq!(et.name, "Manager");

        let mult = target_multiplicity(&provider, nav).unwrap();
        assert_eq!(mult, Multiplicity::One);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut schema = sample_schema();
        let dup = schema.entity_types[0].clone();
        schema.entity_types.push(dup);

        let result = InMemoryProvider::from_schemas(vec![schema]);
        assert!(matches!(result, Err(EdmError::DuplicateName { .. })));
    }

    #[test]
    fn test_missing_default_container() {
        let mut schema = sample_schema();
        schema.entity_containers[0].is_default = false;
        let provider = InMemoryProvider::from_schemas(vec![schema]).unwrap();

        assert!(matches!(
            provider.default_entity_container(),
            Err(EdmError::NoDefaultContainer)
        ));
    }

    #[test]
    fn test_declared_key_properties() {
        let schema = sample_schema();
        let keys = declared_key_properties(&schema.entity_types[0]).unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].name, "EmployeeId");
    }
}
