//! Resource path resolution
//!
//! A single forward pass over the percent-encoded path segments, consuming
//! them front to back against the EDM: entity sets and function imports
//! first, then navigation hops, structural property paths and the terminal
//! system segments `$count`, `$value` and `$links`. The pass fixes the
//! `UriType` exactly once, late, and fills the `UriInfo` as it walks.

use crate::config::constants::limits::path::{MAX_PATH_SEGMENTS, MAX_SEGMENT_LENGTH};
use crate::log_debug;
use crate::types::{lattice, parse_literal};
use crate::uri::error::{
    UriNotFoundError, UriNotMatchingError, UriParseError, UriResult, UriSyntaxError,
};
use crate::uri::info::{NavigationSegment, UriInfo};
use crate::uri::key_predicate::parse_key_predicate;
use crate::uri::segment::{match_initial_segment, match_navigation_segment, SegmentMatch};
use crate::uri::uri_type::UriType;
use crate::utils::percent::decode_percent;
use odata_edm::{
    entity_type_of_set, function_import_entity_set, navigation_target, target_multiplicity,
    EdmError, EdmProvider, EntityContainer, EntitySet, EntityType, FunctionImport, Property,
    PropertyKind, ReturnKind, TypeName,
};
use std::collections::{HashMap, VecDeque};

/// Everything the caller needs after path resolution
pub(crate) struct ResolvedPath<'a> {
    pub info: UriInfo,
    pub container: &'a EntityContainer,
    pub target_entity_type: Option<&'a EntityType>,
}

/// Resolve a resource path against the model. `plain_params` are the
/// non-`$` query parameters, consulted for function import parameters.
pub(crate) fn resolve_path<'a>(
    provider: &'a dyn EdmProvider,
    path_segments: &[String],
    plain_params: &HashMap<String, String>,
) -> UriResult<ResolvedPath<'a>> {
    if path_segments.len() > MAX_PATH_SEGMENTS {
        return Err(UriSyntaxError::TooManySegments {
            found: path_segments.len(),
            maximum: MAX_PATH_SEGMENTS,
        }
        .into());
    }
    for segment in path_segments {
        if segment.is_empty() {
            return Err(UriSyntaxError::EmptySegment.into());
        }
        if segment.len() > MAX_SEGMENT_LENGTH {
            return Err(UriNotMatchingError::MatchProblem {
                segment: format!("<{} bytes>", segment.len()),
            }
            .into());
        }
    }

    let mut resolver = PathResolver {
        provider,
        segments: path_segments.iter().cloned().collect(),
        plain_params,
    };
    resolver.run()
}

struct PathResolver<'a, 'p> {
    provider: &'a dyn EdmProvider,
    segments: VecDeque<String>,
    plain_params: &'p HashMap<String, String>,
}

impl<'a> PathResolver<'a, '_> {
    fn run(&mut self) -> UriResult<ResolvedPath<'a>> {
        let default_container = self.provider.default_entity_container()?;

        // empty path addresses the service document
        let first = match self.segments.pop_front() {
            None => {
                let info = {
                    let mut info = UriInfo::new(default_container.name.clone());
                    info.uri_type = UriType::ServiceDocument;
                    info
                };
                return Ok(ResolvedPath {
                    info,
                    container: default_container,
                    target_entity_type: None,
                });
            }
            Some(segment) => segment,
        };

        // $metadata / $batch are terminal shapes of their own
        if first == "$metadata" || first == "$batch" {
            if let Some(next) = self.segments.pop_front() {
                return Err(UriSyntaxError::MustBeLastSegment { segment: next }.into());
            }
            let mut info = UriInfo::new(default_container.name.clone());
            info.uri_type = if first == "$metadata" {
                UriType::Metadata
            } else {
                UriType::Batch
            };
            return Ok(ResolvedPath {
                info,
                container: default_container,
                target_entity_type: None,
            });
        }

        let matched = match_initial_segment(&first)?;

        let container = match &matched.container {
            None => default_container,
            Some(name) => {
                let decoded = decode(name)?;
                self.provider
                    .entity_container(&decoded)?
                    .ok_or(UriNotFoundError::ContainerNotFound { container: decoded })?
            }
        };

        let name = decode(&matched.name)?;
        let mut info = UriInfo::new(container.name.clone());

        log_debug!("Resolving initial segment",
            "segment" => first,
            "container" => container.name
        );

        if let Some(entity_set) = container.entity_set(&name) {
            let target =
                self.handle_entity_set(&mut info, container, entity_set, &matched)?;
            return Ok(ResolvedPath {
                info,
                container,
                target_entity_type: target,
            });
        }

        if let Some(import) = container.function_import(&name) {
            let target = self.handle_function_import(&mut info, container, import, &matched)?;
            return Ok(ResolvedPath {
                info,
                container,
                target_entity_type: target,
            });
        }

        Err(UriNotFoundError::ResourceNotFound { segment: name }.into())
    }

    // ========================================================================
    // ENTITY SETS AND NAVIGATION
    // ========================================================================

    fn handle_entity_set(
        &mut self,
        info: &mut UriInfo,
        container: &'a EntityContainer,
        entity_set: &'a EntitySet,
        matched: &SegmentMatch,
    ) -> UriResult<Option<&'a EntityType>> {
        let entity_type = entity_type_of_set(self.provider, entity_set)?;

        info.start_entity_set = Some(entity_set.name.clone());
        info.start_entity_type = Some(entity_set.entity_type.clone());
        info.target_entity_set = Some(entity_set.name.clone());
        info.target_entity_type = Some(entity_set.entity_type.clone());

        if matched.empty_parens {
            return Err(UriSyntaxError::InvalidSegment {
                segment: entity_set.name.clone(),
            }
            .into());
        }

        match &matched.key_text {
            Some(key_text) => {
                info.key_predicates = parse_key_predicate(key_text, entity_type)?;
                info.uri_type = UriType::Entity;
                self.walk_entity_tail(info, container, entity_type)
            }
            None => {
                match self.segments.pop_front() {
                    None => {
                        info.uri_type = UriType::EntitySet;
                    }
                    Some(next) if next == "$count" => {
                        if let Some(trailing) = self.segments.pop_front() {
                            return Err(UriSyntaxError::MustBeLastSegment {
                                segment: trailing,
                            }
                            .into());
                        }
                        info.uri_type = UriType::CountEntitySet;
                        info.is_count = true;
                    }
                    Some(_) => {
                        return Err(UriSyntaxError::EntitySetInsteadOfEntity {
                            entity_set: entity_set.name.clone(),
                        }
                        .into())
                    }
                }
                Ok(Some(entity_type))
            }
        }
    }

    /// Walk the segments that follow an addressed entity: structural
    /// properties, navigation hops and the `$count`/`$value`/`$links`
    /// terminals
    fn walk_entity_tail(
        &mut self,
        info: &mut UriInfo,
        container: &'a EntityContainer,
        mut entity_type: &'a EntityType,
    ) -> UriResult<Option<&'a EntityType>> {
        while let Some(segment) = self.segments.pop_front() {
            match segment.as_str() {
                "$count" => {
                    if let Some(trailing) = self.segments.pop_front() {
                        return Err(
                            UriSyntaxError::MustBeLastSegment { segment: trailing }.into()
                        );
                    }
                    info.uri_type = UriType::CountEntity;
                    info.is_count = true;
                    return Ok(Some(entity_type));
                }
                "$value" => {
                    if let Some(trailing) = self.segments.pop_front() {
                        return Err(
                            UriSyntaxError::MustBeLastSegment { segment: trailing }.into()
                        );
                    }
                    if !entity_type.has_stream {
                        return Err(UriSyntaxError::NoMediaResource {
                            entity_type: entity_type.name.clone(),
                        }
                        .into());
                    }
                    info.uri_type = UriType::MediaValue;
                    info.is_value = true;
                    return Ok(Some(entity_type));
                }
                "$links" => {
                    info.is_links = true;
                    return self.walk_links(info, container, entity_type);
                }
                _ => {
                    let matched = match_navigation_segment(&segment)?;
                    let name = decode(&matched.name)?;

                    if let Some(property) = entity_type.property(&name) {
                        if matched.key_text.is_some() || matched.empty_parens {
                            return Err(
                                UriSyntaxError::InvalidSegment { segment }.into()
                            );
                        }
                        self.walk_property_path(info, property)?;
                        return Ok(Some(entity_type));
                    }

                    match entity_type.navigation_property(&name) {
                        Some(_) => {
                            let (next_type, terminal) = self.handle_navigation(
                                info,
                                container,
                                entity_type,
                                &name,
                                &matched,
                            )?;
                            entity_type = next_type;
                            if terminal {
                                return Ok(Some(entity_type));
                            }
                        }
                        None => {
                            return Err(UriNotFoundError::PropertyNotFound {
                                property: name,
                                type_name: entity_type.name.clone(),
                            }
                            .into())
                        }
                    }
                }
            }
        }

        Ok(Some(entity_type))
    }

    /// One navigation hop outside `$links` mode. Returns the new entity type
    /// and whether the walk must stop (collection addressed without a key).
    fn handle_navigation(
        &mut self,
        info: &mut UriInfo,
        container: &'a EntityContainer,
        entity_type: &'a EntityType,
        name: &str,
        matched: &SegmentMatch,
    ) -> UriResult<(&'a EntityType, bool)> {
        let nav = entity_type
            .navigation_property(name)
            .expect("caller checked the navigation property exists");

        if matched.empty_parens {
            return Err(UriSyntaxError::InvalidSegment {
                segment: name.to_string(),
            }
            .into());
        }

        let multiplicity = target_multiplicity(self.provider, nav)?;
        let (target_set, target_type) = navigation_target(self.provider, container, nav)?;

        let key_predicates = match &matched.key_text {
            Some(key_text) => parse_key_predicate(key_text, target_type)?,
            None => Vec::new(),
        };
        let has_keys = !key_predicates.is_empty();

        info.navigation_segments.push(NavigationSegment {
            navigation_property: nav.name.clone(),
            entity_set: target_set.name.clone(),
            key_predicates,
        });
        info.target_entity_set = Some(target_set.name.clone());
        info.target_entity_type = Some(target_set.entity_type.clone());

        if multiplicity.is_single() || has_keys {
            info.uri_type = UriType::NavigationToOne;
            return Ok((target_type, false));
        }

        // collection without key: only $count may follow
        info.uri_type = UriType::NavigationToMany;
        match self.segments.pop_front() {
            None => Ok((target_type, true)),
            Some(next) if next == "$count" => {
                if let Some(trailing) = self.segments.pop_front() {
                    return Err(UriSyntaxError::MustBeLastSegment { segment: trailing }.into());
                }
                info.uri_type = UriType::CountEntitySet;
                info.is_count = true;
                Ok((target_type, true))
            }
            Some(_) => Err(UriSyntaxError::EntitySetInsteadOfEntity {
                entity_set: target_set.name.clone(),
            }
            .into()),
        }
    }

    /// `$links` takes exactly one navigation segment, optionally followed by
    /// `$count`
    fn walk_links(
        &mut self,
        info: &mut UriInfo,
        container: &'a EntityContainer,
        entity_type: &'a EntityType,
    ) -> UriResult<Option<&'a EntityType>> {
        let segment = self.segments.pop_front().ok_or_else(|| {
            UriSyntaxError::InvalidSegment {
                segment: "$links".to_string(),
            }
        })?;

        let matched = match_navigation_segment(&segment)?;
        let name = decode(&matched.name)?;

        let nav = match entity_type.navigation_property(&name) {
            Some(nav) => nav,
            None => {
                // structural properties have no links
                return Err(if entity_type.property(&name).is_some() {
                    UriSyntaxError::InvalidSegment { segment }.into()
                } else {
                    UriNotFoundError::PropertyNotFound {
                        property: name,
                        type_name: entity_type.name.clone(),
                    }
                    .into()
                });
            }
        };

        if matched.empty_parens {
            return Err(UriSyntaxError::InvalidSegment { segment }.into());
        }

        let multiplicity = target_multiplicity(self.provider, nav)?;
        let (target_set, target_type) = navigation_target(self.provider, container, nav)?;

        let key_predicates = match &matched.key_text {
            Some(key_text) => parse_key_predicate(key_text, target_type)?,
            None => Vec::new(),
        };
        let has_keys = !key_predicates.is_empty();

        info.navigation_segments.push(NavigationSegment {
            navigation_property: nav.name.clone(),
            entity_set: target_set.name.clone(),
            key_predicates,
        });
        info.target_entity_set = Some(target_set.name.clone());
        info.target_entity_type = Some(target_set.entity_type.clone());

        let single = multiplicity.is_single() || has_keys;
        info.uri_type = if single {
            UriType::LinksToOne
        } else {
            UriType::LinksToMany
        };

        match self.segments.pop_front() {
            None => Ok(Some(target_type)),
            Some(next) if next == "$count" => {
                if let Some(trailing) = self.segments.pop_front() {
                    return Err(UriSyntaxError::MustBeLastSegment { segment: trailing }.into());
                }
                info.uri_type = if single {
                    UriType::CountLinksToOne
                } else {
                    UriType::CountLinksToMany
                };
                info.is_count = true;
                Ok(Some(target_type))
            }
            Some(other) => Err(UriSyntaxError::InvalidSegment { segment: other }.into()),
        }
    }

    // ========================================================================
    // STRUCTURAL PROPERTY PATHS
    // ========================================================================

    /// Walk complex properties down to a simple property or a terminal
    /// complex property, with an optional trailing `$value`
    fn walk_property_path(&mut self, info: &mut UriInfo, property: &Property) -> UriResult<()> {
        info.property_path.push(property.name.clone());
        let mut depth = 1usize;

        let mut complex_name = match &property.kind {
            PropertyKind::Simple(simple) => {
                return self.finish_simple_property(info, *simple, depth);
            }
            PropertyKind::Complex(type_name) => type_name.clone(),
        };

        loop {
            let complex_type = self.provider.complex_type(&complex_name)?.ok_or_else(|| {
                EdmError::inconsistent(format!("unknown complex type '{}'", complex_name))
            })?;

            let segment = match self.segments.pop_front() {
                None => {
                    info.uri_type = UriType::ComplexProperty;
                    return Ok(());
                }
                Some(segment) => segment,
            };

            let matched = match_navigation_segment(&segment)?;
            if matched.key_text.is_some() || matched.empty_parens {
                return Err(UriSyntaxError::InvalidSegment { segment }.into());
            }
            let name = decode(&matched.name)?;

            let nested = complex_type.property(&name).ok_or_else(|| {
                UriNotFoundError::PropertyNotFound {
                    property: name.clone(),
                    type_name: complex_type.name.clone(),
                }
            })?;

            info.property_path.push(nested.name.clone());
            depth += 1;

            match &nested.kind {
                PropertyKind::Complex(type_name) => {
                    complex_name = type_name.clone();
                }
                PropertyKind::Simple(simple) => {
                    return self.finish_simple_property(info, *simple, depth);
                }
            }
        }
    }

    fn finish_simple_property(
        &mut self,
        info: &mut UriInfo,
        simple: odata_edm::EdmSimpleType,
        depth: usize,
    ) -> UriResult<()> {
        info.target_simple_type = Some(simple);
        info.uri_type = if depth > 1 {
            UriType::SimplePropertyOfComplex
        } else {
            UriType::SimpleProperty
        };

        match self.segments.pop_front() {
            None => Ok(()),
            Some(segment) if segment == "$value" => {
                if let Some(trailing) = self.segments.pop_front() {
                    return Err(UriSyntaxError::MustBeLastSegment { segment: trailing }.into());
                }
                info.is_value = true;
                Ok(())
            }
            Some(segment) => Err(UriSyntaxError::InvalidSegment { segment }.into()),
        }
    }

    // ========================================================================
    // FUNCTION IMPORTS
    // ========================================================================

    fn handle_function_import(
        &mut self,
        info: &mut UriInfo,
        container: &'a EntityContainer,
        import: &'a FunctionImport,
        matched: &SegmentMatch,
    ) -> UriResult<Option<&'a EntityType>> {
        info.function_import = Some(import.name.clone());
        self.collect_function_parameters(info, import)?;

        let return_type = match &import.return_type {
            Some(rt) => rt.clone(),
            None => {
                // a void operation is addressed like a simple result with
                // nothing after it
                info.uri_type = UriType::FunctionSimple;
                self.reject_trailing_segments()?;
                if matched.key_text.is_some() {
                    return Err(UriSyntaxError::InvalidSegment {
                        segment: import.name.clone(),
                    }
                    .into());
                }
                return Ok(None);
            }
        };

        match &return_type.kind {
            ReturnKind::Entity(type_name) => self.finish_entity_function(
                info,
                container,
                import,
                matched,
                type_name,
                return_type.multiplicity.is_single(),
            ),
            ReturnKind::Complex(_) => {
                if matched.key_text.is_some() {
                    return Err(UriSyntaxError::InvalidSegment {
                        segment: import.name.clone(),
                    }
                    .into());
                }
                info.uri_type = if return_type.multiplicity.is_single() {
                    UriType::FunctionComplex
                } else {
                    UriType::FunctionComplexCollection
                };
                self.reject_trailing_segments()?;
                Ok(None)
            }
            ReturnKind::Simple(simple) => {
                if matched.key_text.is_some() {
                    return Err(UriSyntaxError::InvalidSegment {
                        segment: import.name.clone(),
                    }
                    .into());
                }
                info.target_simple_type = Some(*simple);
                if return_type.multiplicity.is_single() {
                    info.uri_type = UriType::FunctionSimple;
                    // a scalar result additionally allows a trailing $value
                    match self.segments.pop_front() {
                        None => {}
                        Some(segment) if segment == "$value" => {
                            if let Some(trailing) = self.segments.pop_front() {
                                return Err(UriSyntaxError::MustBeLastSegment {
                                    segment: trailing,
                                }
                                .into());
                            }
                            info.is_value = true;
                        }
                        Some(segment) => {
                            return Err(
                                UriSyntaxError::MustBeLastSegment { segment }.into()
                            )
                        }
                    }
                } else {
                    info.uri_type = UriType::FunctionSimpleCollection;
                    self.reject_trailing_segments()?;
                }
                Ok(None)
            }
        }
    }

    fn finish_entity_function(
        &mut self,
        info: &mut UriInfo,
        container: &'a EntityContainer,
        import: &'a FunctionImport,
        matched: &SegmentMatch,
        type_name: &TypeName,
        single: bool,
    ) -> UriResult<Option<&'a EntityType>> {
        let entity_type = self.provider.entity_type(type_name)?.ok_or_else(|| {
            EdmError::inconsistent(format!(
                "function import '{}' returns unknown entity type '{}'",
                import.name, type_name
            ))
        })?;

        if let Some(entity_set) = function_import_entity_set(container, import)? {
            info.start_entity_set = Some(entity_set.name.clone());
            info.start_entity_type = Some(entity_set.entity_type.clone());
            info.target_entity_set = Some(entity_set.name.clone());
        }
        info.target_entity_type = Some(type_name.clone());

        if single {
            // a key predicate is only meaningful on a collection result
            if matched.key_text.is_some() {
                return Err(UriSyntaxError::InvalidSegment {
                    segment: import.name.clone(),
                }
                .into());
            }
            info.uri_type = UriType::FunctionEntity;
        } else {
            match &matched.key_text {
                Some(key_text) => {
                    info.key_predicates = parse_key_predicate(key_text, entity_type)?;
                    info.uri_type = UriType::FunctionEntity;
                }
                None => {
                    info.uri_type = UriType::FunctionEntityCollection;
                }
            }
        }

        self.reject_trailing_segments()?;
        Ok(Some(entity_type))
    }

    /// Parse declared function import parameters out of the plain query
    /// parameters, validating each literal against the declared type
    fn collect_function_parameters(
        &mut self,
        info: &mut UriInfo,
        import: &FunctionImport,
    ) -> UriResult<()> {
        for parameter in &import.parameters {
            match self.plain_params.get(&parameter.name) {
                Some(raw) => {
                    let literal = parse_literal(raw)?;
                    if !lattice::is_compatible(literal.kind, parameter.simple_type) {
                        return Err(UriSyntaxError::IncompatibleLiteral {
                            literal: literal.text.clone(),
                            property: parameter.name.clone(),
                            expected: parameter.simple_type,
                            found: literal.kind,
                        }
                        .into());
                    }
                    info.function_import_parameters
                        .insert(parameter.name.clone(), literal);
                }
                None => {
                    if !parameter.nullable {
                        return Err(UriSyntaxError::MissingParameter {
                            function_import: import.name.clone(),
                            parameter: parameter.name.clone(),
                        }
                        .into());
                    }
                }
            }
        }
        Ok(())
    }

    fn reject_trailing_segments(&mut self) -> UriResult<()> {
        match self.segments.pop_front() {
            None => Ok(()),
            Some(segment) => Err(UriSyntaxError::MustBeLastSegment { segment }.into()),
        }
    }
}

fn decode(text: &str) -> Result<String, UriParseError> {
    decode_percent(text)
        .map_err(|e| UriSyntaxError::MalformedEscape { text: e.text }.into())
}
