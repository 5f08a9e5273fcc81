//! $select/$expand parsing and the joint selection tree
//!
//! Items are comma-separated slash-paths. Interior segments (and every
//! segment of a `$expand` item) must be navigation properties; the last
//! `$select` segment may be `*`, a structural property, or a navigation
//! property (selecting the link). The joint tree is built bottom-up and is
//! immutable once constructed: a node starts as "all properties, implicitly"
//! and flips to explicit selection the moment any select item narrows it;
//! after that, only an explicit `*` widens it again.

use crate::config::constants::limits::query::MAX_EXPAND_DEPTH;
use crate::uri::error::{UriNotFoundError, UriResult, UriSyntaxError};
use crate::uri::info::{ExpandSegment, SelectItem};
use odata_edm::{navigation_target, EdmProvider, EntityContainer, EntityType};
use serde::Serialize;
use std::collections::BTreeMap;

/// Selection state of one tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AllKind {
    /// Nothing narrowed this node; all properties are included by default
    ImplicitTrue,
    /// A `*` item explicitly selected all properties
    ExplicitTrue,
    /// Explicit selection narrowed this node to its property list
    False,
}

/// One node of the joint select/expand tree, keyed by navigation property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpandSelectTreeNode {
    pub all: AllKind,
    pub properties: Vec<String>,
    /// Selected/expanded links: `None` marks a selected but unexpanded link
    pub links: BTreeMap<String, Option<ExpandSelectTreeNode>>,
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse and validate a `$select` value against the target entity type
pub fn parse_select(
    value: &str,
    entity_type: &EntityType,
    provider: &dyn EdmProvider,
) -> UriResult<Vec<SelectItem>> {
    let mut items = Vec::new();

    for item in value.split(',') {
        if item.is_empty() {
            return Err(UriSyntaxError::EmptySelectItem.into());
        }

        let segments: Vec<&str> = item.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(UriSyntaxError::EmptySelectItem.into());
        }

        let mut navigation_path = Vec::new();
        let mut current = entity_type;
        let mut property = None;
        let mut star = false;

        for (index, segment) in segments.iter().enumerate() {
            let last = index + 1 == segments.len();

            if last && *segment == "*" {
                star = true;
                break;
            }

            if let Some(nav) = current.navigation_property(segment) {
                navigation_path.push(nav.name.clone());
                if !last {
                    current = navigation_end_type(provider, current, segment)?;
                }
                continue;
            }

            if current.property(segment).is_some() {
                if !last {
                    return Err(UriSyntaxError::MustBeNavigationProperty {
                        segment: segment.to_string(),
                    }
                    .into());
                }
                property = Some(segment.to_string());
                continue;
            }

            return Err(UriNotFoundError::PropertyNotFound {
                property: segment.to_string(),
                type_name: current.name.clone(),
            }
            .into());
        }

        items.push(SelectItem {
            navigation_path,
            property,
            star,
        });
    }

    Ok(items)
}

/// Parse and validate a `$expand` value; every segment must be a navigation
/// property, and each hop records its target entity set
pub fn parse_expand(
    value: &str,
    entity_type: &EntityType,
    container: &EntityContainer,
    provider: &dyn EdmProvider,
) -> UriResult<Vec<Vec<ExpandSegment>>> {
    let mut expand = Vec::new();

    for item in value.split(',') {
        if item.is_empty() {
            return Err(UriSyntaxError::EmptySelectItem.into());
        }

        let segments: Vec<&str> = item.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(UriSyntaxError::EmptySelectItem.into());
        }
        if segments.len() > MAX_EXPAND_DEPTH {
            return Err(UriSyntaxError::ExpandTooDeep {
                found: segments.len(),
                maximum: MAX_EXPAND_DEPTH,
            }
            .into());
        }

        let mut path = Vec::new();
        let mut current = entity_type;

        for segment in &segments {
            let nav = match current.navigation_property(segment) {
                Some(nav) => nav,
                None => {
                    // a structural property gets the clearer error
                    return Err(if current.property(segment).is_some() {
                        UriSyntaxError::MustBeNavigationProperty {
                            segment: segment.to_string(),
                        }
                        .into()
                    } else {
                        UriNotFoundError::PropertyNotFound {
                            property: segment.to_string(),
                            type_name: current.name.clone(),
                        }
                        .into()
                    });
                }
            };

            let (entity_set, target_type) = navigation_target(provider, container, nav)?;
            path.push(ExpandSegment {
                navigation_property: nav.name.clone(),
                entity_set: entity_set.name.clone(),
            });
            current = target_type;
        }

        expand.push(path);
    }

    Ok(expand)
}

fn navigation_end_type<'a>(
    provider: &'a dyn EdmProvider,
    entity_type: &EntityType,
    nav_name: &str,
) -> UriResult<&'a EntityType> {
    let nav = entity_type
        .navigation_property(nav_name)
        .expect("caller checked the navigation property exists");
    let association = provider.association(&nav.relationship)?.ok_or_else(|| {
        odata_edm::EdmError::inconsistent(format!(
            "navigation property '{}' references unknown association '{}'",
            nav.name, nav.relationship
        ))
    })?;
    let end = association.end(&nav.to_role).ok_or_else(|| {
        odata_edm::EdmError::inconsistent(format!(
            "association '{}' has no end with role '{}'",
            nav.relationship, nav.to_role
        ))
    })?;
    provider.entity_type(&end.entity_type)?.ok_or_else(|| {
        odata_edm::EdmError::inconsistent(format!("unknown entity type '{}'", end.entity_type))
            .into()
    })
}

// ============================================================================
// TREE CONSTRUCTION
// ============================================================================

#[derive(Clone, Copy)]
struct SelectCursor<'a> {
    path: &'a [String],
    property: Option<&'a str>,
    star: bool,
}

impl<'a> SelectCursor<'a> {
    fn from_item(item: &'a SelectItem) -> Self {
        Self {
            path: &item.navigation_path,
            property: item.property.as_deref(),
            star: item.star,
        }
    }

    /// A fully-consumed path with nothing selected marks a terminal link
    fn is_terminal_link_marker(&self) -> bool {
        self.path.is_empty() && self.property.is_none() && !self.star
    }
}

/// Build the joint select/expand tree for one entity node
pub fn build_expand_select_tree(
    select: &[SelectItem],
    expand: &[Vec<ExpandSegment>],
) -> ExpandSelectTreeNode {
    let cursors: Vec<SelectCursor> = select.iter().map(SelectCursor::from_item).collect();
    let paths: Vec<&[ExpandSegment]> = expand.iter().map(|p| p.as_slice()).collect();
    build_node(&cursors, &paths)
}

fn build_node(select: &[SelectCursor], expand: &[&[ExpandSegment]]) -> ExpandSelectTreeNode {
    let mut all = if select.is_empty() {
        AllKind::ImplicitTrue
    } else {
        AllKind::False
    };
    let mut properties = Vec::new();
    let mut link_names: Vec<String> = Vec::new();

    for cursor in select {
        if cursor.path.is_empty() {
            if cursor.star {
                all = AllKind::ExplicitTrue;
            }
            if let Some(property) = cursor.property {
                if !properties.iter().any(|p| p == property) {
                    properties.push(property.to_string());
                }
            }
        } else {
            let head = &cursor.path[0];
            if !link_names.contains(head) {
                link_names.push(head.clone());
            }
        }
    }

    for path in expand {
        let head = &path[0].navigation_property;
        if !link_names.contains(head) {
            link_names.push(head.clone());
        }
    }

    let mut links = BTreeMap::new();
    for name in link_names {
        let child_select: Vec<SelectCursor> = select
            .iter()
            .filter(|c| c.path.first() == Some(&name))
            .map(|c| SelectCursor {
                path: &c.path[1..],
                property: c.property,
                star: c.star,
            })
            .filter(|c| !c.is_terminal_link_marker())
            .collect();

        let expanded = expand
            .iter()
            .any(|p| p[0].navigation_property == name);
        let child_expand: Vec<&[ExpandSegment]> = expand
            .iter()
            .filter(|p| p[0].navigation_property == name)
            .map(|p| &p[1..])
            .filter(|p| !p.is_empty())
            .collect();

        let child = if expanded || !child_select.is_empty() {
            Some(build_node(&child_select, &child_expand))
        } else {
            None
        };
        links.insert(name, child);
    }

    ExpandSelectTreeNode {
        all,
        properties,
        links,
    }
}
