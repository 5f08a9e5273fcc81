//! Path-segment shape matching
//!
//! The segment grammar has three capture groups: an optional container
//! qualifier (initial segment only), a name, and either a parenthesized key
//! predicate or an empty-parentheses marker. Matching happens on the still
//! percent-encoded text so that structural characters can be told apart from
//! encoded ones; the caller decodes the captured pieces afterwards.

use crate::uri::error::UriNotMatchingError;

/// Captures of one matched path segment
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentMatch {
    /// `Container.` qualifier, initial segments only
    pub container: Option<String>,
    pub name: String,
    /// Text between the parentheses, when non-empty parentheses are present
    pub key_text: Option<String>,
    /// `()` was present
    pub empty_parens: bool,
}

fn match_problem(segment: &str) -> UriNotMatchingError {
    UriNotMatchingError::MatchProblem {
        segment: segment.to_string(),
    }
}

/// Split off a trailing parentheses group. Returns (head, key_text,
/// empty_parens); fails when parentheses are present but unbalanced or the
/// head is empty.
fn split_parens(segment: &str) -> Result<(&str, Option<String>, bool), UriNotMatchingError> {
    if !segment.ends_with(')') {
        // no group; any parenthesis elsewhere is a shape violation
        if segment.contains('(') || segment.contains(')') {
            return Err(match_problem(segment));
        }
        return Ok((segment, None, false));
    }

    let open = match segment.find('(') {
        Some(idx) => idx,
        None => return Err(match_problem(segment)),
    };
    let head = &segment[..open];
    let inner = &segment[open + 1..segment.len() - 1];

    if head.is_empty() || head.contains(')') {
        return Err(match_problem(segment));
    }
    if inner.is_empty() {
        Ok((head, None, true))
    } else {
        // anything goes inside the group; the key predicate parser validates
        Ok((head, Some(inner.to_string()), false))
    }
}

/// Match the initial path segment: `(container.)?name(key)?` or `name()`
pub fn match_initial_segment(segment: &str) -> Result<SegmentMatch, UriNotMatchingError> {
    if segment.is_empty() {
        return Err(match_problem(segment));
    }

    let (head, key_text, empty_parens) = split_parens(segment)?;

    // the last dot separates the container qualifier from the name
    let (container, name) = match head.rfind('.') {
        Some(idx) => {
            let container = &head[..idx];
            let name = &head[idx + 1..];
            if container.is_empty() || container.contains('.') {
                // nested qualifiers are not part of the segment grammar
                return Err(match_problem(segment));
            }
            (Some(container.to_string()), name)
        }
        None => (None, head),
    };

    if name.is_empty() {
        return Err(match_problem(segment));
    }

    Ok(SegmentMatch {
        container,
        name: name.to_string(),
        key_text,
        empty_parens,
    })
}

/// Match a navigation/property segment: `name(key)?`. Dots stay part of the
/// name here.
pub fn match_navigation_segment(segment: &str) -> Result<SegmentMatch, UriNotMatchingError> {
    if segment.is_empty() {
        return Err(match_problem(segment));
    }

    let (head, key_text, empty_parens) = split_parens(segment)?;
    if head.is_empty() {
        return Err(match_problem(segment));
    }

    Ok(SegmentMatch {
        container: None,
        name: head.to_string(),
        key_text,
        empty_parens,
    })
}
