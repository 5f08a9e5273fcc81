//! Environment-driven logging configuration
//!
//! Read once per process; tests that need different settings construct a
//! `LoggingService` directly instead of mutating the environment.

use super::events::LogLevel;
use std::env;
use std::sync::OnceLock;

/// Minimum level written by the configured service (default: Info)
pub fn get_min_log_level() -> LogLevel {
    static LEVEL: OnceLock<LogLevel> = OnceLock::new();
    *LEVEL.get_or_init(|| {
        env::var("ODATA_URI_LOG_LEVEL")
            .ok()
            .and_then(|v| LogLevel::from_str(&v))
            .unwrap_or(LogLevel::Info)
    })
}

/// Whether to emit JSON lines instead of plain text (default: false)
pub fn use_structured_logging() -> bool {
    static STRUCTURED: OnceLock<bool> = OnceLock::new();
    *STRUCTURED.get_or_init(|| {
        env::var("ODATA_URI_LOG_STRUCTURED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false)
    })
}

/// Sanity-check the configuration sources
pub fn validate_config() -> Result<(), String> {
    if let Ok(v) = env::var("ODATA_URI_LOG_LEVEL") {
        if LogLevel::from_str(&v).is_none() {
            return Err(format!("unrecognized ODATA_URI_LOG_LEVEL '{}'", v));
        }
    }
    Ok(())
}

/// One-line summary for diagnostics
pub fn get_config_summary() -> String {
    format!(
        "log level: {}, structured: {}",
        get_min_log_level().as_str(),
        use_structured_logging()
    )
}
