//! Shared in-memory EDM model for unit tests
//!
//! A small company scenario: employees with manager/team/room navigation, a
//! nested location complex type, buildings behind rooms, and a handful of
//! function imports covering every return shape.

use odata_edm::{
    Association, AssociationEnd, AssociationSet, AssociationSetEnd, ComplexType, EdmSimpleType,
    EntityContainer, EntitySet, EntityType, FunctionImport, FunctionImportParameter,
    InMemoryProvider, Multiplicity, NavigationProperty, Property, ReturnType, Schema, TypeName,
};

pub(crate) const NAMESPACE: &str = "RefScenario";

fn tn(name: &str) -> TypeName {
    TypeName::new(NAMESPACE, name)
}

fn nav(name: &str, relationship: &str, from_role: &str, to_role: &str) -> NavigationProperty {
    NavigationProperty {
        name: name.to_string(),
        relationship: tn(relationship),
        from_role: from_role.to_string(),
        to_role: to_role.to_string(),
    }
}

fn association(name: &str, ends: [(&str, &str, Multiplicity); 2]) -> Association {
    Association {
        name: name.to_string(),
        ends: ends
            .into_iter()
            .map(|(role, entity_type, multiplicity)| AssociationEnd {
                role: role.to_string(),
                entity_type: tn(entity_type),
                multiplicity,
            })
            .collect(),
    }
}

fn association_set(name: &str, assoc: &str, ends: [(&str, &str); 2]) -> AssociationSet {
    AssociationSet {
        name: name.to_string(),
        association: tn(assoc),
        ends: ends
            .into_iter()
            .map(|(role, entity_set)| AssociationSetEnd {
                role: role.to_string(),
                entity_set: entity_set.to_string(),
            })
            .collect(),
    }
}

fn employee_properties() -> Vec<Property> {
    vec![
        Property::simple("EmployeeId", EdmSimpleType::String).not_nullable(),
        Property::simple("EmployeeName", EdmSimpleType::String),
        Property::simple("ManagerId", EdmSimpleType::String),
        Property::simple("RoomId", EdmSimpleType::String),
        Property::simple("TeamId", EdmSimpleType::String),
        Property::simple("Age", EdmSimpleType::Int32),
        Property::simple("EntryDate", EdmSimpleType::DateTime),
        Property::simple("ImageUrl", EdmSimpleType::String),
        Property::complex("Location", tn("c_Location")),
    ]
}

pub(crate) fn schema() -> Schema {
    Schema {
        namespace: NAMESPACE.to_string(),
        entity_types: vec![
            EntityType {
                name: "Employee".to_string(),
                key_properties: vec!["EmployeeId".to_string()],
                properties: employee_properties(),
                navigation_properties: vec![
                    nav("ne_Manager", "ManagerEmployees", "r_Employees", "r_Manager"),
                    nav("ne_Team", "TeamEmployees", "r_Employees", "r_Team"),
                    nav("ne_Room", "RoomEmployees", "r_Employees", "r_Room"),
                ],
                has_stream: true,
            },
            EntityType {
                name: "Manager".to_string(),
                key_properties: vec!["EmployeeId".to_string()],
                properties: employee_properties(),
                navigation_properties: vec![nav(
                    "nm_Employees",
                    "ManagerEmployees",
                    "r_Manager",
                    "r_Employees",
                )],
                has_stream: true,
            },
            EntityType {
                name: "Team".to_string(),
                key_properties: vec!["Id".to_string()],
                properties: vec![
                    Property::simple("Id", EdmSimpleType::String).not_nullable(),
                    Property::simple("Name", EdmSimpleType::String),
                    Property::simple("isScrumTeam", EdmSimpleType::Boolean),
                ],
                navigation_properties: vec![nav(
                    "nt_Employees",
                    "TeamEmployees",
                    "r_Team",
                    "r_Employees",
                )],
                has_stream: false,
            },
            EntityType {
                name: "Room".to_string(),
                key_properties: vec!["Id".to_string()],
                properties: vec![
                    Property::simple("Id", EdmSimpleType::String).not_nullable(),
                    Property::simple("Name", EdmSimpleType::String),
                    Property::simple("Seats", EdmSimpleType::Int16),
                    Property::simple("Version", EdmSimpleType::Int32),
                ],
                navigation_properties: vec![
                    nav("nr_Employees", "RoomEmployees", "r_Room", "r_Employees"),
                    nav("nr_Building", "BuildingRooms", "r_Rooms", "r_Building"),
                ],
                has_stream: false,
            },
            EntityType {
                name: "Building".to_string(),
                key_properties: vec!["Id".to_string()],
                properties: vec![
                    Property::simple("Id", EdmSimpleType::String).not_nullable(),
                    Property::simple("Name", EdmSimpleType::String),
                    Property::simple("Image", EdmSimpleType::Binary),
                ],
                navigation_properties: vec![nav(
                    "nb_Rooms",
                    "BuildingRooms",
                    "r_Building",
                    "r_Rooms",
                )],
                has_stream: false,
            },
        ],
        complex_types: vec![
            ComplexType {
                name: "c_Location".to_string(),
                properties: vec![
                    Property::simple("Country", EdmSimpleType::String),
                    Property::complex("City", tn("c_City")),
                ],
            },
            ComplexType {
                name: "c_City".to_string(),
                properties: vec![
                    Property::simple("PostalCode", EdmSimpleType::String),
                    Property::simple("CityName", EdmSimpleType::String),
                ],
            },
        ],
        associations: vec![
            association(
                "ManagerEmployees",
                [
                    ("r_Manager", "Manager", Multiplicity::One),
                    ("r_Employees", "Employee", Multiplicity::Many),
                ],
            ),
            association(
                "TeamEmployees",
                [
                    ("r_Team", "Team", Multiplicity::One),
                    ("r_Employees", "Employee", Multiplicity::Many),
                ],
            ),
            association(
                "RoomEmployees",
                [
                    ("r_Room", "Room", Multiplicity::One),
                    ("r_Employees", "Employee", Multiplicity::Many),
                ],
            ),
            association(
                "BuildingRooms",
                [
                    ("r_Building", "Building", Multiplicity::One),
                    ("r_Rooms", "Room", Multiplicity::Many),
                ],
            ),
        ],
        entity_containers: vec![EntityContainer {
            name: "Container1".to_string(),
            is_default: true,
            entity_sets: vec![
                EntitySet {
                    name: "Employees".to_string(),
                    entity_type: tn("Employee"),
                },
                EntitySet {
                    name: "Managers".to_string(),
                    entity_type: tn("Manager"),
                },
                EntitySet {
                    name: "Teams".to_string(),
                    entity_type: tn("Team"),
                },
                EntitySet {
                    name: "Rooms".to_string(),
                    entity_type: tn("Room"),
                },
                EntitySet {
                    name: "Buildings".to_string(),
                    entity_type: tn("Building"),
                },
            ],
            association_sets: vec![
                association_set(
                    "ManagerEmployeesSet",
                    "ManagerEmployees",
                    [("r_Manager", "Managers"), ("r_Employees", "Employees")],
                ),
                association_set(
                    "TeamEmployeesSet",
                    "TeamEmployees",
                    [("r_Team", "Teams"), ("r_Employees", "Employees")],
                ),
                association_set(
                    "RoomEmployeesSet",
                    "RoomEmployees",
                    [("r_Room", "Rooms"), ("r_Employees", "Employees")],
                ),
                association_set(
                    "BuildingRoomsSet",
                    "BuildingRooms",
                    [("r_Building", "Buildings"), ("r_Rooms", "Rooms")],
                ),
            ],
            function_imports: vec![
                FunctionImport {
                    name: "EmployeeSearch".to_string(),
                    return_type: Some(ReturnType::entity(tn("Employee"), Multiplicity::Many)),
                    entity_set: Some("Employees".to_string()),
                    http_method: Some("GET".to_string()),
                    parameters: vec![FunctionImportParameter {
                        name: "q".to_string(),
                        simple_type: EdmSimpleType::String,
                        nullable: true,
                    }],
                },
                FunctionImport {
                    name: "OldestEmployee".to_string(),
                    return_type: Some(ReturnType::entity(tn("Employee"), Multiplicity::One)),
                    entity_set: Some("Employees".to_string()),
                    http_method: Some("GET".to_string()),
                    parameters: vec![],
                },
                FunctionImport {
                    name: "AllLocations".to_string(),
                    return_type: Some(ReturnType::complex(tn("c_Location"), Multiplicity::Many)),
                    entity_set: None,
                    http_method: Some("GET".to_string()),
                    parameters: vec![],
                },
                FunctionImport {
                    name: "MostCommonLocation".to_string(),
                    return_type: Some(ReturnType::complex(tn("c_Location"), Multiplicity::One)),
                    entity_set: None,
                    http_method: Some("GET".to_string()),
                    parameters: vec![],
                },
                FunctionImport {
                    name: "ManagerPhoto".to_string(),
                    return_type: Some(ReturnType::simple(
                        EdmSimpleType::Binary,
                        Multiplicity::One,
                    )),
                    entity_set: None,
                    http_method: Some("GET".to_string()),
                    parameters: vec![FunctionImportParameter {
                        name: "Id".to_string(),
                        simple_type: EdmSimpleType::String,
                        nullable: false,
                    }],
                },
                FunctionImport {
                    name: "AllUsedRoomIds".to_string(),
                    return_type: Some(ReturnType::simple(
                        EdmSimpleType::String,
                        Multiplicity::Many,
                    )),
                    entity_set: None,
                    http_method: Some("GET".to_string()),
                    parameters: vec![],
                },
                FunctionImport {
                    name: "MaximalAge".to_string(),
                    return_type: Some(ReturnType::simple(
                        EdmSimpleType::Int32,
                        Multiplicity::One,
                    )),
                    entity_set: None,
                    http_method: Some("GET".to_string()),
                    parameters: vec![],
                },
            ],
        }],
    }
}

pub(crate) fn provider() -> InMemoryProvider {
    InMemoryProvider::from_schemas(vec![schema()]).expect("fixture model is consistent")
}

pub(crate) fn entity_type<'a>(
    provider: &'a InMemoryProvider,
    name: &str,
) -> &'a odata_edm::EntityType {
    use odata_edm::EdmProvider;
    provider
        .entity_type(&tn(name))
        .expect("fixture model readable")
        .expect("fixture type exists")
}
