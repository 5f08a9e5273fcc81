//! The parse result
//!
//! `UriInfo` is built incrementally by the resolver and option validator and
//! is immutable once returned. It records everything downstream layers need
//! to execute the query: the classified shape, the addressed sets and types,
//! key predicates, the navigation chain, parsed option values and flags.

use crate::expression::{FilterExpression, OrderByExpression};
use crate::types::UriLiteral;
use crate::uri::select_expand::ExpandSelectTreeNode;
use crate::uri::uri_type::UriType;
use odata_edm::{EdmSimpleType, TypeName};
use serde::Serialize;
use std::collections::HashMap;

/// One resolved key: property name, its declared type, the literal text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyPredicate {
    pub property_name: String,
    pub simple_type: EdmSimpleType,
    pub literal: String,
}

/// One navigation hop traversed by the resource path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationSegment {
    pub navigation_property: String,
    pub entity_set: String,
    pub key_predicates: Vec<KeyPredicate>,
}

/// `$inlinecount` modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InlineCount {
    AllPages,
    None,
}

impl InlineCount {
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "allpages" => Some(Self::AllPages),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// One `$select` item, already split on `/`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectItem {
    /// Navigation prefix; empty for a direct property selection
    pub navigation_path: Vec<String>,
    /// Selected property name; `None` for a `*` item
    pub property: Option<String>,
    pub star: bool,
}

/// One hop of a `$expand` item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpandSegment {
    pub navigation_property: String,
    pub entity_set: String,
}

/// Immutable result of one URI parse
#[derive(Debug, Clone, Serialize)]
pub struct UriInfo {
    pub uri_type: UriType,
    /// Addressed entity container
    pub container: String,

    /// Entity set the path starts at, when it starts at one
    pub start_entity_set: Option<String>,
    /// Entity type of the start entity set
    pub start_entity_type: Option<TypeName>,
    /// Entity set the path ends at after navigation
    pub target_entity_set: Option<String>,
    /// Entity type of the final target, when the target is entity-shaped
    pub target_entity_type: Option<TypeName>,

    pub key_predicates: Vec<KeyPredicate>,
    pub navigation_segments: Vec<NavigationSegment>,
    /// Structural property path walked after the entity, outermost first
    pub property_path: Vec<String>,
    /// Declared type of the final simple property, for value requests
    pub target_simple_type: Option<EdmSimpleType>,

    /// Addressed function import, with its parsed parameter literals
    pub function_import: Option<String>,
    pub function_import_parameters: HashMap<String, UriLiteral>,

    pub format: Option<String>,
    pub filter: Option<FilterExpression>,
    pub order_by: Option<OrderByExpression>,
    pub skip_token: Option<String>,
    pub skip: Option<u32>,
    pub top: Option<u32>,
    pub inline_count: Option<InlineCount>,
    pub select: Vec<SelectItem>,
    pub expand: Vec<Vec<ExpandSegment>>,
    /// Joint select/expand tree for the serializer
    pub expand_select_tree: Option<ExpandSelectTreeNode>,
    /// Non-`$` query parameters that are not function-import parameters
    pub custom_query_options: HashMap<String, String>,

    pub is_count: bool,
    pub is_value: bool,
    pub is_links: bool,
}

impl UriInfo {
    pub(crate) fn new(container: String) -> Self {
        Self {
            uri_type: UriType::ServiceDocument,
            container,
            start_entity_set: None,
            start_entity_type: None,
            target_entity_set: None,
            target_entity_type: None,
            key_predicates: Vec::new(),
            navigation_segments: Vec::new(),
            property_path: Vec::new(),
            target_simple_type: None,
            function_import: None,
            function_import_parameters: HashMap::new(),
            format: None,
            filter: None,
            order_by: None,
            skip_token: None,
            skip: None,
            top: None,
            inline_count: None,
            select: Vec::new(),
            expand: Vec::new(),
            expand_select_tree: None,
            custom_query_options: HashMap::new(),
            is_count: false,
            is_value: false,
            is_links: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_count_values() {
        assert_eq!(InlineCount::from_value("allpages"), Some(InlineCount::AllPages));
        assert_eq!(InlineCount::from_value("none"), Some(InlineCount::None));
        assert_eq!(InlineCount::from_value("AllPages"), None);
        assert_eq!(InlineCount::from_value(""), None);
    }

    #[test]
    fn test_new_info_defaults() {
        let info = UriInfo::new("Container1".to_string());
        assert_eq!(info.uri_type, UriType::ServiceDocument);
        assert!(info.key_predicates.is_empty());
        assert!(!info.is_count);
        assert!(!info.is_value);
        assert!(!info.is_links);
    }
}
