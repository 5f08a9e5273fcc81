//! Consolidated error codes and classification system
//!
//! Single source of truth for all error and success codes used by the engine,
//! together with their behavioral metadata. Error enums map themselves onto
//! these codes via `error_code()`; the rendered message stays with the error
//! value, the code is the stable machine-readable identity.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const MODEL_INCONSISTENCY: Code = Code::new("ERR003");
}

/// Literal parsing error codes
pub mod literal {
    use super::Code;

    pub const UNKNOWN_LITERAL: Code = Code::new("E020");
    pub const LITERAL_FORMAT: Code = Code::new("E021");
    pub const EMPTY_LITERAL: Code = Code::new("E022");
}

/// Key predicate error codes
pub mod key {
    use super::Code;

    pub const INVALID_KEY_PREDICATE: Code = Code::new("E030");
    pub const DUPLICATE_KEY_PROPERTY: Code = Code::new("E031");
    pub const INCOMPATIBLE_LITERAL: Code = Code::new("E032");
}

/// Filter/orderby expression error codes
pub mod expression {
    use super::Code;

    pub const INVALID_TOKEN: Code = Code::new("E040");
    pub const UNEXPECTED_END: Code = Code::new("E041");
    pub const UNBALANCED_PARENTHESES: Code = Code::new("E042");
    pub const PROPERTY_NOT_FOUND: Code = Code::new("E043");
    pub const TYPE_EXPECTED: Code = Code::new("E044");
    pub const INVALID_BINARY_TYPES: Code = Code::new("E045");
    pub const INVALID_UNARY_TYPE: Code = Code::new("E046");
    pub const INVALID_MULTIPLICITY: Code = Code::new("E047");
    pub const UNKNOWN_METHOD: Code = Code::new("E048");
    pub const TOO_FEW_PARAMETERS: Code = Code::new("E049");
    pub const TOO_MANY_PARAMETERS: Code = Code::new("E050");
    pub const NO_APPLICABLE_METHOD: Code = Code::new("E051");
    pub const EXPRESSION_TOO_DEEP: Code = Code::new("E052");
    pub const EXPRESSION_TOO_LONG: Code = Code::new("E053");
    pub const INVALID_SORT_ORDER: Code = Code::new("E054");
}

/// Resource path resolution error codes
pub mod uri {
    use super::Code;

    pub const EMPTY_SEGMENT: Code = Code::new("E060");
    pub const MATCH_PROBLEM: Code = Code::new("E061");
    pub const CONTAINER_NOT_FOUND: Code = Code::new("E062");
    pub const RESOURCE_NOT_FOUND: Code = Code::new("E063");
    pub const PROPERTY_NOT_FOUND: Code = Code::new("E064");
    pub const MUST_BE_LAST_SEGMENT: Code = Code::new("E065");
    pub const INVALID_SEGMENT: Code = Code::new("E066");
    pub const ENTITY_SET_INSTEAD_OF_ENTITY: Code = Code::new("E067");
    pub const MISSING_PARAMETER: Code = Code::new("E068");
    pub const MALFORMED_ESCAPE: Code = Code::new("E069");
    pub const INVALID_ENTITY_LINK: Code = Code::new("E070");
    pub const NO_MEDIA_RESOURCE: Code = Code::new("E071");
    pub const TOO_MANY_SEGMENTS: Code = Code::new("E072");
}

/// System query option error codes
pub mod option {
    use super::Code;

    pub const INVALID_SYSTEM_QUERY_OPTION: Code = Code::new("E080");
    pub const DUPLICATE_SYSTEM_QUERY_OPTION: Code = Code::new("E081");
    pub const INVALID_NULL_VALUE: Code = Code::new("E082");
    pub const INCOMPATIBLE_SYSTEM_QUERY_OPTION: Code = Code::new("E083");
    pub const INVALID_VALUE: Code = Code::new("E084");
    pub const INVALID_NEGATIVE_VALUE: Code = Code::new("E085");
}

/// Select/expand tree error codes
pub mod expand {
    use super::Code;

    pub const MUST_BE_NAVIGATION_PROPERTY: Code = Code::new("E090");
    pub const EMPTY_SELECT_ITEM: Code = Code::new("E091");
    pub const EXPAND_TOO_DEEP: Code = Code::new("E092");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("S001");
    pub const URI_PARSE_COMPLETE: Code = Code::new("S010");
    pub const EXPRESSION_PARSE_COMPLETE: Code = Code::new("S011");
    pub const KEY_PARSE_COMPLETE: Code = Code::new("S012");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

fn registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    static REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map = HashMap::new();

        let mut add = |code: &'static str,
                       category: &'static str,
                       severity: Severity,
                       recoverable: bool,
                       requires_halt: bool,
                       description: &'static str| {
            map.insert(
                code,
                ErrorMetadata {
                    code,
                    category,
                    severity,
                    recoverable,
                    requires_halt,
                    description,
                },
            );
        };

        // System
        add("ERR001", "system", Severity::Critical, false, true, "Internal invariant violation");
        add("ERR002", "system", Severity::Critical, false, true, "Logging initialization failed");
        add("ERR003", "system", Severity::Critical, false, true, "EDM model is inconsistent");

        // Literals
        add("E020", "literal", Severity::Medium, true, false, "Literal matches no EDM simple type syntax");
        add("E021", "literal", Severity::Medium, true, false, "Literal body malformed for its detected type");
        add("E022", "literal", Severity::Medium, true, false, "Empty literal where a value is required");

        // Key predicates
        add("E030", "key", Severity::Medium, true, false, "Key predicate does not match the entity type's keys");
        add("E031", "key", Severity::Medium, true, false, "Key property supplied more than once");
        add("E032", "key", Severity::Medium, true, false, "Key literal incompatible with key property type");

        // Expressions
        add("E040", "expression", Severity::Medium, true, false, "Unexpected token in expression");
        add("E041", "expression", Severity::Medium, true, false, "Expression ended unexpectedly");
        add("E042", "expression", Severity::Medium, true, false, "Unbalanced parentheses");
        add("E043", "expression", Severity::Medium, true, false, "Property not found on the target type");
        add("E044", "expression", Severity::Medium, true, false, "Expression of a different type expected here");
        add("E045", "expression", Severity::Medium, true, false, "Operand types invalid for binary operator");
        add("E046", "expression", Severity::Medium, true, false, "Operand type invalid for unary operator");
        add("E047", "expression", Severity::Medium, true, false, "Collection-valued navigation used as scalar");
        add("E048", "expression", Severity::Medium, true, false, "Unknown method name");
        add("E049", "expression", Severity::Medium, true, false, "Too few method parameters");
        add("E050", "expression", Severity::Medium, true, false, "Too many method parameters");
        add("E051", "expression", Severity::Medium, true, false, "No method signature accepts these parameter types");
        add("E052", "expression", Severity::High, true, false, "Expression nesting exceeds configured depth");
        add("E053", "expression", Severity::High, true, false, "Expression exceeds configured length");
        add("E054", "expression", Severity::Medium, true, false, "Sort order keyword must be lowercase asc or desc");

        // Resource path
        add("E060", "uri", Severity::Medium, true, false, "Empty path segment");
        add("E061", "uri", Severity::Medium, true, false, "Segment does not match the expected grammar shape");
        add("E062", "uri", Severity::Medium, true, false, "Entity container not found");
        add("E063", "uri", Severity::Medium, true, false, "Entity set or function import not found");
        add("E064", "uri", Severity::Medium, true, false, "Property not found while walking the path");
        add("E065", "uri", Severity::Medium, true, false, "Segment is only legal as the last segment");
        add("E066", "uri", Severity::Medium, true, false, "Segment not legal at this position");
        add("E067", "uri", Severity::Medium, true, false, "Entity set addressed where an entity is required");
        add("E068", "uri", Severity::Medium, true, false, "Required function import parameter missing");
        add("E069", "uri", Severity::Medium, true, false, "Malformed percent escape");
        add("E070", "uri", Severity::Medium, true, false, "Entity link does not address the expected entity set");
        add("E071", "uri", Severity::Medium, true, false, "$value on an entity without a media stream");
        add("E072", "uri", Severity::High, true, false, "Path exceeds configured segment count");

        // Query options
        add("E080", "option", Severity::Medium, true, false, "Unknown system query option");
        add("E081", "option", Severity::Medium, true, false, "System query option given more than once");
        add("E082", "option", Severity::Medium, true, false, "System query option with empty value");
        add("E083", "option", Severity::Medium, true, false, "System query option not allowed for this URI shape");
        add("E084", "option", Severity::Medium, true, false, "System query option value malformed");
        add("E085", "option", Severity::Medium, true, false, "Negative value where a non-negative integer is required");

        // Select/expand
        add("E090", "expand", Severity::Medium, true, false, "Interior path segment must be a navigation property");
        add("E091", "expand", Severity::Medium, true, false, "Empty select or expand item");
        add("E092", "expand", Severity::High, true, false, "Expand nesting exceeds configured depth");

        // Success
        add("S001", "success", Severity::Low, true, false, "Logging system initialized");
        add("S010", "success", Severity::Low, true, false, "URI parsed");
        add("S011", "success", Severity::Low, true, false, "Expression parsed");
        add("S012", "success", Severity::Low, true, false, "Key predicate parsed");

        map
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    registry().get(code)
}

pub fn get_description(code: &str) -> &'static str {
    get_metadata(code).map_or("Unknown error", |m| m.description)
}

pub fn get_category(code: &str) -> &'static str {
    get_metadata(code).map_or("unknown", |m| m.category)
}

pub fn get_severity(code: &str) -> Severity {
    get_metadata(code).map_or(Severity::Medium, |m| m.severity)
}

pub fn is_recoverable(code: &str) -> bool {
    get_metadata(code).map_or(true, |m| m.recoverable)
}

pub fn requires_halt(code: &str) -> bool {
    get_metadata(code).map_or(false, |m| m.requires_halt)
}
