//! Query-URI engine entry points
//!
//! `UriParser` turns a resource path plus query parameters into one
//! immutable `UriInfo`. One parser handles one model; each `parse` call is
//! independent and carries its own state, so a parser may be shared freely.

pub mod error;
pub mod info;
pub mod key_predicate;
pub mod options;
pub mod resolver;
pub mod segment;
pub mod select_expand;
pub mod uri_type;

pub use error::{UriNotFoundError, UriNotMatchingError, UriParseError, UriResult, UriSyntaxError};
pub use info::{
    ExpandSegment, InlineCount, KeyPredicate, NavigationSegment, SelectItem, UriInfo,
};
pub use key_predicate::{parse_key_predicate, split_key_predicate};
pub use options::SystemQueryOption;
pub use select_expand::{build_expand_select_tree, AllKind, ExpandSelectTreeNode};
pub use uri_type::UriType;

use crate::config::runtime::{ParserPreferences, FORMS_ENCODING_MARKER};
use crate::expression::{
    parse_filter as parse_filter_expression, parse_orderby as parse_orderby_expression,
    ExpressionResult, FilterExpression, OrderByExpression,
};
use crate::log_success;
use crate::logging::{self, codes};
use crate::uri::resolver::resolve_path;
use crate::uri::segment::match_initial_segment;
use crate::utils::percent::{decode_percent, decode_plus_as_space};
use odata_edm::{EdmProvider, EntityType};
use std::collections::{HashMap, HashSet};

/// The engine's front door: path + query string in, `UriInfo` out
pub struct UriParser<'a> {
    provider: &'a dyn EdmProvider,
    preferences: ParserPreferences,
}

impl<'a> UriParser<'a> {
    pub fn new(provider: &'a dyn EdmProvider) -> Self {
        Self {
            provider,
            preferences: ParserPreferences::default(),
        }
    }

    pub fn with_preferences(provider: &'a dyn EdmProvider, preferences: ParserPreferences) -> Self {
        Self {
            provider,
            preferences,
        }
    }

    /// Parse a request: percent-encoded path segments (service root already
    /// stripped) and query parameters as ordered name/value pairs with
    /// percent-decoded values. Repeated names model multi-valued parameters.
    pub fn parse(
        &self,
        path_segments: &[String],
        query: &[(String, String)],
    ) -> UriResult<UriInfo> {
        let request = path_segments.join("/");
        logging::with_request_context(&request, || self.parse_inner(path_segments, query))
    }

    /// Convenience wrapper for a single-valued query map; pairs are passed
    /// in name order so parses stay deterministic
    pub fn parse_query_map(
        &self,
        path_segments: &[String],
        query: &HashMap<String, String>,
    ) -> UriResult<UriInfo> {
        let mut pairs: Vec<(String, String)> = query
            .iter()
            .map(|(n, v)| (n.clone(), v.clone()))
            .collect();
        pairs.sort();
        self.parse(path_segments, &pairs)
    }

    fn parse_inner(
        &self,
        path_segments: &[String],
        query: &[(String, String)],
    ) -> UriResult<UriInfo> {
        let pairs = self.preprocess_query(query);

        let mut system_options: Vec<(String, String)> = Vec::new();
        let mut plain_params: HashMap<String, String> = HashMap::new();
        for (name, value) in &pairs {
            if name.starts_with('$') {
                system_options.push((name.clone(), value.clone()));
            } else {
                // first value wins for plain parameters
                plain_params
                    .entry(name.clone())
                    .or_insert_with(|| value.clone());
            }
        }

        let resolved = resolve_path(self.provider, path_segments, &plain_params)?;
        let mut info = resolved.info;

        options::apply_query_options(
            &mut info,
            &system_options,
            self.provider,
            resolved.container,
            resolved.target_entity_type,
        )?;

        // whatever the function import consumed is not a custom option
        let consumed: HashSet<String> = info.function_import_parameters.keys().cloned().collect();
        for (name, value) in plain_params {
            if consumed.contains(&name) {
                continue;
            }
            if !self.preferences.keep_custom_query_options {
                return Err(UriSyntaxError::InvalidSystemQueryOption { option: name }.into());
            }
            info.custom_query_options.insert(name, value);
        }

        log_success!(codes::success::URI_PARSE_COMPLETE, "URI parsed",
            "uri_type" => format!("{:?}", info.uri_type),
            "segments" => path_segments.len(),
            "options" => system_options.len()
        );

        Ok(info)
    }

    /// Forms-encoding translation: when the marker parameter is present with
    /// value `true`, a literal `+` reads as space, but only in the first
    /// value of each parameter. The marker itself is consumed. This mirrors
    /// observed client behavior and is deliberately not generalized.
    fn preprocess_query(&self, query: &[(String, String)]) -> Vec<(String, String)> {
        let marker_on = self.preferences.accept_forms_encoding
            && query
                .iter()
                .any(|(n, v)| n == FORMS_ENCODING_MARKER && v == "true");

        let mut seen: HashSet<&String> = HashSet::new();
        let mut pairs = Vec::with_capacity(query.len());

        for (name, value) in query {
            if name == FORMS_ENCODING_MARKER {
                continue;
            }
            let first_occurrence = seen.insert(name);
            let value = if marker_on && first_occurrence {
                decode_plus_as_space(value)
            } else {
                value.clone()
            };
            pairs.push((name.clone(), value));
        }

        pairs
    }

    /// Parse a `$filter` string against an entity type in isolation
    pub fn parse_filter(
        &self,
        entity_type: &EntityType,
        expression: &str,
    ) -> ExpressionResult<FilterExpression> {
        parse_filter_expression(self.provider, entity_type, expression)
    }

    /// Parse an `$orderby` string against an entity type in isolation
    pub fn parse_orderby(
        &self,
        entity_type: &EntityType,
        expression: &str,
    ) -> ExpressionResult<OrderByExpression> {
        parse_orderby_expression(self.provider, entity_type, expression)
    }

    /// Resolve the key predicate from an entity link addressing `entity_set`
    /// under `service_root`
    pub fn resolve_entity_link(
        &self,
        service_root: &str,
        link: &str,
        entity_set: &str,
    ) -> UriResult<Vec<KeyPredicate>> {
        let invalid = || UriSyntaxError::InvalidEntityLink {
            link: link.to_string(),
            entity_set: entity_set.to_string(),
        };

        let root = service_root.trim_end_matches('/');
        let rest = link.strip_prefix(root).ok_or_else(invalid)?;
        let rest = rest.trim_start_matches('/');
        if rest.is_empty() || rest.contains('/') || rest.contains('?') {
            return Err(invalid().into());
        }

        let matched = match_initial_segment(rest)?;
        let name = decode_percent(&matched.name)
            .map_err(|e| UriSyntaxError::MalformedEscape { text: e.text })?;
        if name != entity_set {
            return Err(invalid().into());
        }

        let container = self.provider.default_entity_container()?;
        let set = container
            .entity_set(&name)
            .ok_or(UriNotFoundError::ResourceNotFound { segment: name })?;
        let entity_type = odata_edm::entity_type_of_set(self.provider, set)?;

        let key_text = matched.key_text.ok_or_else(invalid)?;
        parse_key_predicate(&key_text, entity_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use assert_matches::assert_matches;

    fn segments(path: &[&str]) -> Vec<String> {
        path.iter().map(|s| s.to_string()).collect()
    }

    fn pairs(query: &[(&str, &str)]) -> Vec<(String, String)> {
        query
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_entity_with_key_and_no_query() {
        let provider = fixtures::provider();
        let parser = UriParser::new(&provider);

        let info = parser.parse(&segments(&["Employees('1')"]), &[]).unwrap();
        assert_eq!(info.uri_type, UriType::Entity);
        assert_eq!(info.key_predicates.len(), 1);
        assert_eq!(info.key_predicates[0].property_name, "EmployeeId");
        assert_eq!(info.key_predicates[0].literal, "1");
    }

    #[test]
    fn test_navigation_count_scenario() {
        let provider = fixtures::provider();
        let parser = UriParser::new(&provider);

        let info = parser
            .parse(&segments(&["Managers('1')", "nm_Employees"]), &[])
            .unwrap();
        assert_eq!(info.uri_type, UriType::NavigationToMany);

        let info = parser
            .parse(&segments(&["Managers('1')", "nm_Employees", "$count"]), &[])
            .unwrap();
        assert!(info.is_count);
        assert_eq!(info.uri_type, UriType::CountEntitySet);
    }

    #[test]
    fn test_select_scenario() {
        let provider = fixtures::provider();
        let parser = UriParser::new(&provider);

        let info = parser
            .parse(
                &segments(&["Employees"]),
                &pairs(&[("$select", "EmployeeId,EmployeeName")]),
            )
            .unwrap();

        let tree = info.expand_select_tree.as_ref().unwrap();
        assert_eq!(tree.all, AllKind::False);
        assert_eq!(tree.properties, vec!["EmployeeId", "EmployeeName"]);
        assert!(tree.links.is_empty());
    }

    #[test]
    fn test_duplicate_top_scenario() {
        let provider = fixtures::provider();
        let parser = UriParser::new(&provider);

        let result = parser.parse(
            &segments(&["Employees"]),
            &pairs(&[("$top", "2"), ("$top", "3")]),
        );
        assert_matches!(
            result,
            Err(UriParseError::Syntax(
                UriSyntaxError::DuplicateSystemQueryParameters { option }
            )) if option == "$top"
        );
    }

    #[test]
    fn test_full_query_set() {
        let provider = fixtures::provider();
        let parser = UriParser::new(&provider);

        let info = parser
            .parse(
                &segments(&["Employees"]),
                &pairs(&[
                    ("$filter", "Age gt 30"),
                    ("$orderby", "EmployeeName desc"),
                    ("$top", "10"),
                    ("$skip", "5"),
                    ("$inlinecount", "allpages"),
                    ("$skiptoken", "abc"),
                    ("$format", "json"),
                    ("$select", "EmployeeId"),
                    ("$expand", "ne_Team"),
                    ("custom", "kept"),
                ]),
            )
            .unwrap();

        assert!(info.filter.is_some());
        assert!(info.order_by.is_some());
        assert_eq!(info.top, Some(10));
        assert_eq!(info.skip, Some(5));
        assert_eq!(info.inline_count, Some(InlineCount::AllPages));
        assert_eq!(info.skip_token.as_deref(), Some("abc"));
        assert_eq!(info.format.as_deref(), Some("json"));
        assert_eq!(info.select.len(), 1);
        assert_eq!(info.expand.len(), 1);
        assert_eq!(info.custom_query_options.get("custom").unwrap(), "kept");
    }

    #[test]
    fn test_determinism_across_parses() {
        let provider = fixtures::provider();
        let parser = UriParser::new(&provider);

        let path = segments(&["Employees"]);
        let query = pairs(&[("$filter", "Age gt 30"), ("$select", "EmployeeId")]);

        let first = parser.parse(&path, &query).unwrap();
        let second = parser.parse(&path, &query).unwrap();
        assert_eq!(format!("{:?}", first), format!("{:?}", second));
    }

    #[test]
    fn test_forms_encoding_first_value_only() {
        let provider = fixtures::provider();
        let parser = UriParser::new(&provider);

        // marker on: first value of each parameter gets '+' → ' '
        let info = parser
            .parse(
                &segments(&["Employees"]),
                &pairs(&[
                    ("odata-accept-forms-encoding", "true"),
                    ("custom", "a+b"),
                    ("custom", "c+d"),
                ]),
            )
            .unwrap();
        // first occurrence decoded and kept (first value wins for plain params)
        assert_eq!(info.custom_query_options.get("custom").unwrap(), "a b");
        // the marker itself is consumed
        assert!(!info
            .custom_query_options
            .contains_key("odata-accept-forms-encoding"));

        // marker absent: no translation
        let info = parser
            .parse(&segments(&["Employees"]), &pairs(&[("custom", "a+b")]))
            .unwrap();
        assert_eq!(info.custom_query_options.get("custom").unwrap(), "a+b");
    }

    #[test]
    fn test_forms_encoding_applies_to_filter() {
        let provider = fixtures::provider();
        let parser = UriParser::new(&provider);

        let info = parser
            .parse(
                &segments(&["Employees"]),
                &pairs(&[
                    ("odata-accept-forms-encoding", "true"),
                    ("$filter", "Age+gt+30"),
                ]),
            )
            .unwrap();
        assert_eq!(
            info.filter.as_ref().unwrap().expression_string,
            "Age gt 30"
        );
    }

    #[test]
    fn test_custom_options_rejected_when_configured() {
        let provider = fixtures::provider();
        let mut preferences = ParserPreferences::default();
        preferences.keep_custom_query_options = false;
        let parser = UriParser::with_preferences(&provider, preferences);

        assert_matches!(
            parser.parse(&segments(&["Employees"]), &pairs(&[("custom", "x")])),
            Err(UriParseError::Syntax(UriSyntaxError::InvalidSystemQueryOption { option }))
                if option == "custom"
        );
    }

    #[test]
    fn test_parse_query_map_is_deterministic() {
        let provider = fixtures::provider();
        let parser = UriParser::new(&provider);

        let mut map = HashMap::new();
        map.insert("$top".to_string(), "3".to_string());
        map.insert("$skip".to_string(), "1".to_string());

        let info = parser
            .parse_query_map(&segments(&["Employees"]), &map)
            .unwrap();
        assert_eq!(info.top, Some(3));
        assert_eq!(info.skip, Some(1));
    }

    #[test]
    fn test_isolated_filter_entry_point() {
        let provider = fixtures::provider();
        let parser = UriParser::new(&provider);
        let employee = fixtures::entity_type(&provider, "Employee");

        let filter = parser
            .parse_filter(employee, "startswith(EmployeeName, 'W')")
            .unwrap();
        assert_eq!(
            filter.expression_string,
            "startswith(EmployeeName, 'W')"
        );

        let orderby = parser.parse_orderby(employee, "Age desc").unwrap();
        assert_eq!(orderby.orders.len(), 1);
    }

    #[test]
    fn test_resolve_entity_link() {
        let provider = fixtures::provider();
        let parser = UriParser::new(&provider);

        let keys = parser
            .resolve_entity_link(
                "http://host/service/",
                "http://host/service/Employees('7')",
                "Employees",
            )
            .unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].literal, "7");
    }

    #[test]
    fn test_resolve_entity_link_rejects_foreign_links() {
        let provider = fixtures::provider();
        let parser = UriParser::new(&provider);

        // different service root
        assert_matches!(
            parser.resolve_entity_link(
                "http://host/service/",
                "http://elsewhere/Employees('7')",
                "Employees",
            ),
            Err(UriParseError::Syntax(UriSyntaxError::InvalidEntityLink { .. }))
        );

        // different entity set
        assert_matches!(
            parser.resolve_entity_link(
                "http://host/service/",
                "http://host/service/Teams('7')",
                "Employees",
            ),
            Err(UriParseError::Syntax(UriSyntaxError::InvalidEntityLink { .. }))
        );

        // missing key predicate
        assert_matches!(
            parser.resolve_entity_link(
                "http://host/service/",
                "http://host/service/Employees",
                "Employees",
            ),
            Err(UriParseError::Syntax(UriSyntaxError::InvalidEntityLink { .. }))
        );
    }

    #[test]
    fn test_service_document_with_format() {
        let provider = fixtures::provider();
        let parser = UriParser::new(&provider);

        let info = parser
            .parse(&[], &pairs(&[("$format", "json")]))
            .unwrap();
        assert_eq!(info.uri_type, UriType::ServiceDocument);
        assert_eq!(info.format.as_deref(), Some("json"));

        assert_matches!(
            parser.parse(&[], &pairs(&[("$filter", "Age gt 1")])),
            Err(UriParseError::Syntax(
                UriSyntaxError::IncompatibleSystemQueryOption { .. }
            ))
        );
    }

    #[test]
    fn test_function_import_with_query_parameters() {
        let provider = fixtures::provider();
        let parser = UriParser::new(&provider);

        let info = parser
            .parse(
                &segments(&["EmployeeSearch"]),
                &pairs(&[("q", "'Wal'"), ("$top", "5"), ("other", "x")]),
            )
            .unwrap();
        assert_eq!(info.uri_type, UriType::FunctionEntityCollection);
        assert_eq!(info.top, Some(5));
        // the consumed parameter does not surface as a custom option
        assert!(!info.custom_query_options.contains_key("q"));
        assert!(info.custom_query_options.contains_key("other"));
        assert_eq!(info.function_import_parameters.get("q").unwrap().text, "Wal");
    }
}
