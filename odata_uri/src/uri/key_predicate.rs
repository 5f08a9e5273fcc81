//! Key predicate splitting and resolution
//!
//! `split_key_predicate` is a single-pass character scanner: top-level commas
//! separate components, quote-delimited runs are opaque and a doubled quote
//! inside a run is one literal quote. `parse_key_predicate` resolves each
//! component against the entity type's declared key properties and checks
//! the literal against the property type.

use crate::log_success;
use crate::logging::codes;
use crate::types::{lattice, parse_literal};
use crate::uri::error::{UriResult, UriSyntaxError};
use crate::uri::info::KeyPredicate;
use crate::utils::percent::decode_percent;
use odata_edm::{declared_key_properties, EntityType};

/// Split a key predicate on top-level commas, respecting quoted runs
pub fn split_key_predicate(text: &str) -> Result<Vec<String>, UriSyntaxError> {
    let mut components = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    let mut in_quotes = false;

    while let Some(ch) = chars.next() {
        match ch {
            '\'' => {
                if in_quotes && chars.peek() == Some(&'\'') {
                    // doubled quote stays inside the run
                    current.push('\'');
                    current.push(chars.next().unwrap());
                } else {
                    in_quotes = !in_quotes;
                    current.push('\'');
                }
            }
            ',' if !in_quotes => {
                components.push(std::mem::take(&mut current));
            }
            other => current.push(other),
        }
    }

    if in_quotes {
        return Err(UriSyntaxError::InvalidKeyPredicate {
            predicate: text.to_string(),
        });
    }

    components.push(current);
    Ok(components)
}

/// Parse and resolve a key predicate against an entity type
pub fn parse_key_predicate(
    text: &str,
    entity_type: &EntityType,
) -> UriResult<Vec<KeyPredicate>> {
    let invalid = || UriSyntaxError::InvalidKeyPredicate {
        predicate: text.to_string(),
    };

    let key_properties = declared_key_properties(entity_type)?;
    let components = split_key_predicate(text)?;

    let mut resolved: Vec<KeyPredicate> = Vec::with_capacity(components.len());

    for component in &components {
        if component.is_empty() {
            return Err(invalid().into());
        }

        // NAME=VALUE, or a bare VALUE when the type has exactly one key.
        // '=' inside a quoted run belongs to the value.
        let eq = find_top_level_eq(component);
        let (raw_name, raw_value) = match eq {
            Some(idx) => (Some(&component[..idx]), &component[idx + 1..]),
            None => (None, component.as_str()),
        };

        let name = match raw_name {
            Some(name) => decode_percent(name).map_err(|e| UriSyntaxError::MalformedEscape {
                text: e.text,
            })?,
            None => {
                if key_properties.len() != 1 {
                    return Err(invalid().into());
                }
                key_properties[0].name.clone()
            }
        };

        let property = match key_properties.iter().find(|p| p.name == name) {
            Some(p) => *p,
            None => return Err(invalid().into()),
        };

        if resolved.iter().any(|k| k.property_name == name) {
            return Err(UriSyntaxError::DuplicateKeyProperty { name }.into());
        }

        let value = decode_percent(raw_value)
            .map_err(|e| UriSyntaxError::MalformedEscape { text: e.text })?;
        let literal = parse_literal(&value)?;

        let expected = property.simple_type().ok_or_else(invalid)?;
        if !lattice::is_compatible(literal.kind, expected) {
            return Err(UriSyntaxError::IncompatibleLiteral {
                literal: literal.text.clone(),
                property: name,
                expected,
                found: literal.kind,
            }
            .into());
        }

        resolved.push(KeyPredicate {
            property_name: property.name.clone(),
            simple_type: expected,
            literal: literal.text,
        });
    }

    // under- or over-specified composite keys fail on the count
    if resolved.len() != key_properties.len() {
        return Err(invalid().into());
    }

    log_success!(codes::success::KEY_PARSE_COMPLETE, "Key predicate parsed",
        "entity_type" => entity_type.name,
        "keys" => resolved.len()
    );

    Ok(resolved)
}

/// Position of the first `=` outside any quoted run
fn find_top_level_eq(component: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (idx, ch) in component.char_indices() {
        match ch {
            '\'' => in_quotes = !in_quotes,
            '=' if !in_quotes => return Some(idx),
            _ => {}
        }
    }
    None
}
