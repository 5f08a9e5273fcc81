//! System query option parsing and compatibility validation
//!
//! Runs after the resolver has fixed the `UriType`. Each `$`-option is
//! resolved to its enum value, checked for duplicates and empty values,
//! gated by the shape's whitelist, then handed to its value handler.

use crate::config::constants::limits::query::MAX_OPTION_VALUE_LENGTH;
use crate::expression::{parse_filter, parse_orderby};
use crate::uri::error::{UriResult, UriSyntaxError};
use crate::uri::info::{InlineCount, UriInfo};
use crate::uri::select_expand::{build_expand_select_tree, parse_expand, parse_select};
use odata_edm::{EdmError, EdmProvider, EntityContainer, EntityType};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// The system query options of the V1/V2 protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SystemQueryOption {
    Format,
    Filter,
    InlineCount,
    OrderBy,
    SkipToken,
    Skip,
    Top,
    Expand,
    Select,
}

impl SystemQueryOption {
    /// Resolve a `$`-prefixed parameter name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "$format" => Some(Self::Format),
            "$filter" => Some(Self::Filter),
            "$inlinecount" => Some(Self::InlineCount),
            "$orderby" => Some(Self::OrderBy),
            "$skiptoken" => Some(Self::SkipToken),
            "$skip" => Some(Self::Skip),
            "$top" => Some(Self::Top),
            "$expand" => Some(Self::Expand),
            "$select" => Some(Self::Select),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Format => "$format",
            Self::Filter => "$filter",
            Self::InlineCount => "$inlinecount",
            Self::OrderBy => "$orderby",
            Self::SkipToken => "$skiptoken",
            Self::Skip => "$skip",
            Self::Top => "$top",
            Self::Expand => "$expand",
            Self::Select => "$select",
        }
    }
}

impl fmt::Display for SystemQueryOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validate and attach all `$`-prefixed query parameters to the parse result
pub(crate) fn apply_query_options(
    info: &mut UriInfo,
    options: &[(String, String)],
    provider: &dyn EdmProvider,
    container: &EntityContainer,
    target_entity_type: Option<&EntityType>,
) -> UriResult<()> {
    let mut seen: HashSet<SystemQueryOption> = HashSet::new();

    for (name, value) in options {
        let option = SystemQueryOption::from_name(name).ok_or_else(|| {
            UriSyntaxError::InvalidSystemQueryOption {
                option: name.clone(),
            }
        })?;

        if !seen.insert(option) {
            return Err(UriSyntaxError::DuplicateSystemQueryParameters {
                option: option.as_str().to_string(),
            }
            .into());
        }

        if value.is_empty() {
            return Err(UriSyntaxError::InvalidNullValue {
                option: option.as_str().to_string(),
            }
            .into());
        }
        if value.len() > MAX_OPTION_VALUE_LENGTH {
            return Err(UriSyntaxError::InvalidValue {
                option: option.as_str().to_string(),
                value: format!("<{} bytes>", value.len()),
            }
            .into());
        }

        if !info.uri_type.is_compatible(option) {
            return Err(UriSyntaxError::IncompatibleSystemQueryOption {
                option: option.as_str().to_string(),
            }
            .into());
        }

        // $value forces a raw response; $format is refused there even though
        // the shape's whitelist otherwise carries it
        if option == SystemQueryOption::Format
            && info.is_value
            && info.uri_type.is_raw_value_candidate()
        {
            return Err(UriSyntaxError::IncompatibleSystemQueryOption {
                option: option.as_str().to_string(),
            }
            .into());
        }

        apply_option(info, option, value, provider, container, target_entity_type)?;
    }

    if !info.select.is_empty() || !info.expand.is_empty() {
        info.expand_select_tree = Some(build_expand_select_tree(&info.select, &info.expand));
    }

    Ok(())
}

fn apply_option(
    info: &mut UriInfo,
    option: SystemQueryOption,
    value: &str,
    provider: &dyn EdmProvider,
    container: &EntityContainer,
    target_entity_type: Option<&EntityType>,
) -> UriResult<()> {
    match option {
        SystemQueryOption::Format => {
            info.format = Some(value.to_string());
        }
        SystemQueryOption::SkipToken => {
            info.skip_token = Some(value.to_string());
        }
        SystemQueryOption::InlineCount => {
            info.inline_count =
                Some(
                    InlineCount::from_value(value).ok_or_else(|| UriSyntaxError::InvalidValue {
                        option: option.as_str().to_string(),
                        value: value.to_string(),
                    })?,
                );
        }
        SystemQueryOption::Skip => {
            info.skip = Some(parse_non_negative(option, value)?);
        }
        SystemQueryOption::Top => {
            info.top = Some(parse_non_negative(option, value)?);
        }
        SystemQueryOption::Filter => {
            let entity_type = expect_entity_target(target_entity_type)?;
            info.filter = Some(parse_filter(provider, entity_type, value)?);
        }
        SystemQueryOption::OrderBy => {
            let entity_type = expect_entity_target(target_entity_type)?;
            info.order_by = Some(parse_orderby(provider, entity_type, value)?);
        }
        SystemQueryOption::Select => {
            let entity_type = expect_entity_target(target_entity_type)?;
            info.select = parse_select(value, entity_type, provider)?;
        }
        SystemQueryOption::Expand => {
            let entity_type = expect_entity_target(target_entity_type)?;
            info.expand = parse_expand(value, entity_type, container, provider)?;
        }
    }
    Ok(())
}

/// Whitelisted expression options always have an entity target; a miss is a
/// model/classification defect, not a user error
fn expect_entity_target(target: Option<&EntityType>) -> Result<&EntityType, EdmError> {
    target.ok_or_else(|| {
        EdmError::inconsistent("expression query option on a shape without an entity target")
    })
}

/// Digit-only non-negative integer; explicit signs are rejected even though
/// they would parse
fn parse_non_negative(option: SystemQueryOption, value: &str) -> Result<u32, UriSyntaxError> {
    if value.starts_with('-') {
        return Err(UriSyntaxError::InvalidNegativeValue {
            option: option.as_str().to_string(),
            value: value.to_string(),
        });
    }
    if value.starts_with('+') || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(UriSyntaxError::InvalidValue {
            option: option.as_str().to_string(),
            value: value.to_string(),
        });
    }
    value.parse().map_err(|_| UriSyntaxError::InvalidValue {
        option: option.as_str().to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::uri::error::UriParseError;
    use crate::uri::uri_type::UriType;
    use assert_matches::assert_matches;
    use odata_edm::EdmProvider;

    fn entity_set_info() -> UriInfo {
        let mut info = UriInfo::new("Container1".to_string());
        info.uri_type = UriType::EntitySet;
        info.start_entity_set = Some("Employees".to_string());
        info.target_entity_set = Some("Employees".to_string());
        info
    }

    fn apply(info: &mut UriInfo, options: &[(&str, &str)]) -> UriResult<()> {
        let provider = fixtures::provider();
        let container = provider.default_entity_container().unwrap();
        let employee = fixtures::entity_type(&provider, "Employee");
        let owned: Vec<(String, String)> = options
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        apply_query_options(info, &owned, &provider, container, Some(employee))
    }

    #[test]
    fn test_option_name_lookup() {
        assert_eq!(
            SystemQueryOption::from_name("$filter"),
            Some(SystemQueryOption::Filter)
        );
        assert_eq!(SystemQueryOption::from_name("$Filter"), None);
        assert_eq!(SystemQueryOption::from_name("filter"), None);
    }

    #[test]
    fn test_unknown_system_option_rejected() {
        let mut info = entity_set_info();
        assert_matches!(
            apply(&mut info, &[("$foo", "bar")]),
            Err(UriParseError::Syntax(UriSyntaxError::InvalidSystemQueryOption { option }))
                if option == "$foo"
        );
    }

    #[test]
    fn test_duplicate_option_rejected_regardless_of_values() {
        let mut info = entity_set_info();
        assert_matches!(
            apply(&mut info, &[("$top", "2"), ("$top", "3")]),
            Err(UriParseError::Syntax(
                UriSyntaxError::DuplicateSystemQueryParameters { option }
            )) if option == "$top"
        );
    }

    #[test]
    fn test_empty_value_rejected() {
        let mut info = entity_set_info();
        assert_matches!(
            apply(&mut info, &[("$format", "")]),
            Err(UriParseError::Syntax(UriSyntaxError::InvalidNullValue { .. }))
        );
    }

    #[test]
    fn test_incompatible_option_for_shape() {
        let mut info = entity_set_info();
        info.uri_type = UriType::Entity;
        assert_matches!(
            apply(&mut info, &[("$top", "3")]),
            Err(UriParseError::Syntax(
                UriSyntaxError::IncompatibleSystemQueryOption { option }
            )) if option == "$top"
        );
    }

    #[test]
    fn test_whitelist_table_exhaustive() {
        // every (shape, option) pair behaves per the declared whitelist
        let all_options = [
            SystemQueryOption::Format,
            SystemQueryOption::Filter,
            SystemQueryOption::InlineCount,
            SystemQueryOption::OrderBy,
            SystemQueryOption::SkipToken,
            SystemQueryOption::Skip,
            SystemQueryOption::Top,
            SystemQueryOption::Expand,
            SystemQueryOption::Select,
        ];
        let sample_value = |option: SystemQueryOption| match option {
            SystemQueryOption::Filter => "Age gt 1",
            SystemQueryOption::OrderBy => "Age",
            SystemQueryOption::InlineCount => "allpages",
            SystemQueryOption::Skip | SystemQueryOption::Top => "5",
            SystemQueryOption::Expand => "ne_Team",
            SystemQueryOption::Select => "EmployeeId",
            _ => "json",
        };

        for &uri_type in UriType::all() {
            for option in all_options {
                let mut info = entity_set_info();
                info.uri_type = uri_type;
                let result = apply(&mut info, &[(option.as_str(), sample_value(option))]);
                if uri_type.is_compatible(option) {
                    assert!(
                        result.is_ok(),
                        "{:?} should accept {}",
                        uri_type,
                        option
                    );
                } else {
                    assert_matches!(
                        result,
                        Err(UriParseError::Syntax(
                            UriSyntaxError::IncompatibleSystemQueryOption { .. }
                        )),
                        "{:?} should reject {}",
                        uri_type,
                        option
                    );
                }
            }
        }
    }

    #[test]
    fn test_format_with_value_flag_rejected() {
        let mut info = entity_set_info();
        info.uri_type = UriType::SimpleProperty;
        info.is_value = true;
        assert_matches!(
            apply(&mut info, &[("$format", "json")]),
            Err(UriParseError::Syntax(
                UriSyntaxError::IncompatibleSystemQueryOption { .. }
            ))
        );

        // without the $value flag, $format passes
        let mut info = entity_set_info();
        info.uri_type = UriType::SimpleProperty;
        apply(&mut info, &[("$format", "json")]).unwrap();
        assert_eq!(info.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_inline_count_values() {
        let mut info = entity_set_info();
        apply(&mut info, &[("$inlinecount", "allpages")]).unwrap();
        assert_eq!(info.inline_count, Some(InlineCount::AllPages));

        let mut info = entity_set_info();
        assert_matches!(
            apply(&mut info, &[("$inlinecount", "most")]),
            Err(UriParseError::Syntax(UriSyntaxError::InvalidValue { .. }))
        );
    }

    #[test]
    fn test_skip_top_signs_rejected() {
        let mut info = entity_set_info();
        assert_matches!(
            apply(&mut info, &[("$skip", "-1")]),
            Err(UriParseError::Syntax(UriSyntaxError::InvalidNegativeValue { .. }))
        );

        let mut info = entity_set_info();
        assert_matches!(
            apply(&mut info, &[("$top", "+5")]),
            Err(UriParseError::Syntax(UriSyntaxError::InvalidValue { .. }))
        );

        let mut info = entity_set_info();
        assert_matches!(
            apply(&mut info, &[("$top", "1a")]),
            Err(UriParseError::Syntax(UriSyntaxError::InvalidValue { .. }))
        );

        let mut info = entity_set_info();
        apply(&mut info, &[("$skip", "0"), ("$top", "42")]).unwrap();
        assert_eq!(info.skip, Some(0));
        assert_eq!(info.top, Some(42));
    }

    #[test]
    fn test_filter_attaches_parsed_expression() {
        let mut info = entity_set_info();
        apply(&mut info, &[("$filter", "Age gt 30")]).unwrap();
        assert!(info.filter.is_some());
        assert_eq!(
            info.filter.as_ref().unwrap().expression_string,
            "Age gt 30"
        );
    }

    #[test]
    fn test_select_expand_build_tree() {
        let mut info = entity_set_info();
        apply(
            &mut info,
            &[("$select", "EmployeeId,ne_Team"), ("$expand", "ne_Team")],
        )
        .unwrap();
        assert_eq!(info.select.len(), 2);
        assert_eq!(info.expand.len(), 1);
        let tree = info.expand_select_tree.as_ref().unwrap();
        assert!(tree.links.contains_key("ne_Team"));
    }

    #[test]
    fn test_skiptoken_passthrough() {
        let mut info = entity_set_info();
        apply(&mut info, &[("$skiptoken", "opaque-123")]).unwrap();
        assert_eq!(info.skip_token.as_deref(), Some("opaque-123"));
    }
}
