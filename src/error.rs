//! Error types for issue-timeline.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (3=not_found, 4=validation, 6=tracker, 7=config, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers
//!
//! Only configuration and transport problems are errors. Per-field anomalies
//! while resolving values or replaying a changelog degrade to `None` or a
//! best-effort value instead (see [`crate::query`]).

use thiserror::Error;

/// Result type alias for issue-timeline operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Not Found (exit 3)
    UnknownField,
    UnknownAttribute,

    // Validation (exit 4)
    InvalidArgument,
    InvalidTimestamp,

    // Tracker (exit 6)
    TrackerError,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::UnknownField => "UNKNOWN_FIELD",
            Self::UnknownAttribute => "UNKNOWN_ATTRIBUTE",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::InvalidTimestamp => "INVALID_TIMESTAMP",
            Self::TrackerError => "TRACKER_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::UnknownField | Self::UnknownAttribute => 3,
            Self::InvalidArgument | Self::InvalidTimestamp => 4,
            Self::TrackerError => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether the caller should retry with corrected input.
    ///
    /// Unknown names are never retried automatically: the configuration has
    /// to be fixed first.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::InvalidArgument | Self::TrackerError)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in issue-timeline operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Tracker field with name `{name}` does not exist (did you try to use the field id instead?)")]
    UnknownField { name: String },

    #[error("Attribute `{name}` is not configured")]
    UnknownAttribute { name: String },

    #[error("Invalid timestamp `{value}`: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Tracker request failed ({status}): {message}")]
    Tracker { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnknownField { .. } => ErrorCode::UnknownField,
            Self::UnknownAttribute { .. } => ErrorCode::UnknownAttribute,
            Self::InvalidTimestamp { .. } => ErrorCode::InvalidTimestamp,
            Self::Tracker { .. } | Self::Http(_) => ErrorCode::TrackerError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::UnknownField { .. } => Some(
                "Attributes map to field display names, not ids. \
                 Use `timeline fields` to list the names the tracker knows."
                    .to_string(),
            ),

            Self::UnknownAttribute { name } => Some(format!(
                "Add `{name}` to `query.attributes` in the configuration file."
            )),

            Self::Tracker { status: 401 | 403, .. } => Some(
                "Check `connection.username` / `connection.token` or set TRACKER_TOKEN."
                    .to_string(),
            ),

            Self::Config(_) => Some(
                "Pass --config <path>, set TIMELINE_CONFIG, or create ~/.issue-timeline/config.json"
                    .to_string(),
            ),

            Self::Tracker { .. }
            | Self::InvalidTimestamp { .. }
            | Self::Http(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_field_is_not_found_category() {
        let err = Error::UnknownField {
            name: "Story Points".to_string(),
        };
        assert_eq!(err.error_code(), ErrorCode::UnknownField);
        assert_eq!(err.exit_code(), 3);
        assert!(!err.error_code().is_retryable());
        assert!(err.to_string().contains("Story Points"));
    }

    #[test]
    fn test_structured_json_includes_hint() {
        let err = Error::UnknownAttribute {
            name: "Team".to_string(),
        };
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "UNKNOWN_ATTRIBUTE");
        assert_eq!(json["error"]["exit_code"], 3);
        assert!(json["error"]["hint"].as_str().unwrap().contains("Team"));
    }

    #[test]
    fn test_tracker_auth_hint() {
        let err = Error::Tracker {
            status: 401,
            message: "Unauthorized".to_string(),
        };
        assert!(err.hint().is_some());
        assert_eq!(err.exit_code(), 6);

        let err = Error::Tracker {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(err.hint().is_none());
    }
}
