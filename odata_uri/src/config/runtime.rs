// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Name of the query parameter that switches on form-encoding translation.
/// When this parameter is present with value `true`, a literal `+` in the
/// first value of each query parameter is read as a space. The parameter
/// itself is consumed and never surfaces as a custom query option.
pub const FORMS_ENCODING_MARKER: &str = "odata-accept-forms-encoding";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserPreferences {
    /// Whether the forms-encoding marker parameter is honored at all
    pub accept_forms_encoding: bool,

    /// Whether to log token/segment counts after each parse
    pub log_parse_metrics: bool,

    /// Whether error log events carry spans into the offending string
    pub include_position_in_errors: bool,

    /// Whether unknown non-`$` query parameters are kept as custom options
    /// (`false` rejects them like unknown system options)
    pub keep_custom_query_options: bool,
}

impl Default for ParserPreferences {
    fn default() -> Self {
        Self {
            accept_forms_encoding: env::var("ODATA_URI_ACCEPT_FORMS_ENCODING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_parse_metrics: env::var("ODATA_URI_LOG_PARSE_METRICS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            include_position_in_errors: env::var("ODATA_URI_POSITION_IN_ERRORS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            keep_custom_query_options: env::var("ODATA_URI_KEEP_CUSTOM_OPTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

impl ParserPreferences {
    /// Parse preferences from a TOML document; missing keys keep defaults
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        #[derive(Deserialize, Default)]
        struct Partial {
            accept_forms_encoding: Option<bool>,
            log_parse_metrics: Option<bool>,
            include_position_in_errors: Option<bool>,
            keep_custom_query_options: Option<bool>,
        }

        let partial: Partial =
            toml::from_str(content).map_err(|e| format!("invalid preferences TOML: {}", e))?;

        let mut prefs = Self::default();
        if let Some(v) = partial.accept_forms_encoding {
            prefs.accept_forms_encoding = v;
        }
        if let Some(v) = partial.log_parse_metrics {
            prefs.log_parse_metrics = v;
        }
        if let Some(v) = partial.include_position_in_errors {
            prefs.include_position_in_errors = v;
        }
        if let Some(v) = partial.keep_custom_query_options {
            prefs.keep_custom_query_options = v;
        }
        Ok(prefs)
    }

    /// Load preferences from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content)
    }
}
