use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Broad classification of failures, used for retry decisions and structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed argument schema or action definition (start-up).
    Schema,
    /// A flag value could not be coerced to its declared type.
    Resolution,
    /// The request file could not be read or decoded.
    RequestFile,
    /// A value outside a field's declared choice set.
    InvalidChoice,
    /// A composite field did not contain valid JSON of the declared shape.
    InvalidJson,
    /// Sub-service or operation not found on the service handle.
    Dispatch,
    /// The invoked operation reported a failure.
    Remote,
    /// No usable credentials for the active profile.
    Authentication,
    /// The active profile could not be loaded.
    Profile,
    /// Global configuration problem.
    Config,
    /// The invocation was cancelled before it finished.
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Schema => "Schema Error",
            Self::Resolution => "Argument Error",
            Self::RequestFile => "Request File Error",
            Self::InvalidChoice => "Invalid Choice",
            Self::InvalidJson => "Invalid JSON",
            Self::Dispatch => "Dispatch Error",
            Self::Remote => "Operation Failed",
            Self::Authentication => "Authentication Error",
            Self::Profile => "Profile Error",
            Self::Config => "Configuration Error",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

/// Extra information attached to an internal error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Actionable suggestion printed as a `Hint:` line.
    pub suggestion: Option<String>,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{message}")]
    Internal {
        kind: ErrorKind,
        message: String,
        context: Option<ErrorContext>,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// JSON representation of an error for structured output
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonError {
    pub error_type: String,
    pub message: String,
    pub context: Option<String>,
}

impl Error {
    fn internal(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Internal {
            kind,
            message: message.into(),
            context: None,
        }
    }

    fn internal_with_hint(
        kind: ErrorKind,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Internal {
            kind,
            message: message.into(),
            context: Some(ErrorContext {
                suggestion: Some(suggestion.into()),
            }),
        }
    }

    #[must_use]
    pub fn schema(message: impl Into<String>) -> Self {
        Self::internal(ErrorKind::Schema, message)
    }

    #[must_use]
    pub fn invalid_flag_value(flag: &str, value: &str, expected: &str) -> Self {
        Self::internal(
            ErrorKind::Resolution,
            format!("invalid value '{value}' for flag '--{flag}': expected {expected}"),
        )
    }

    /// A command line the compiled command tree rejected.
    #[must_use]
    pub fn invalid_command(reason: impl fmt::Display) -> Self {
        Self::internal_with_hint(
            ErrorKind::Resolution,
            reason.to_string().trim_end().to_string(),
            "Run 'portico exec --help' to see the available services and operations.",
        )
    }

    #[must_use]
    pub fn invalid_record(type_name: &str, reason: impl fmt::Display) -> Self {
        Self::internal(
            ErrorKind::Resolution,
            format!("could not build {type_name} from the resolved arguments: {reason}"),
        )
    }

    #[must_use]
    pub fn request_file(path: &str, reason: impl fmt::Display) -> Self {
        Self::internal_with_hint(
            ErrorKind::RequestFile,
            format!("failed to load request file '{path}': {reason}"),
            "The request file must be a JSON object whose keys are the operation's field names.",
        )
    }

    #[must_use]
    pub fn invalid_json_flag(flag: &str, reason: impl fmt::Display) -> Self {
        Self::internal_with_hint(
            ErrorKind::InvalidJson,
            format!("flag '--{flag}' does not contain valid JSON: {reason}"),
            format!("Run with '--help' to see the JSON shape expected by '--{flag}'."),
        )
    }

    #[must_use]
    pub fn invalid_choice(flag: &str, value: &str, choices: &[String]) -> Self {
        Self::internal(
            ErrorKind::InvalidChoice,
            format!(
                "invalid value '{value}' for flag '--{flag}', valid choices are: {}",
                choices.join(", ")
            ),
        )
    }

    #[must_use]
    pub fn not_found(what: &str, name: &str) -> Self {
        Self::internal_with_hint(
            ErrorKind::Dispatch,
            format!("{what} '{name}' not found"),
            "The command tree and the service module are out of sync. This is a bug in the service module.",
        )
    }

    #[must_use]
    pub fn remote(err: &anyhow::Error) -> Self {
        Self::internal(ErrorKind::Remote, format!("{err:#}"))
    }

    #[must_use]
    pub fn not_authenticated(profile: &str) -> Self {
        Self::internal_with_hint(
            ErrorKind::Authentication,
            format!("profile '{profile}' has no valid authentication"),
            format!("Log in first so that profile '{profile}' has cached credentials."),
        )
    }

    #[must_use]
    pub fn profile_load(name: &str, reason: impl fmt::Display) -> Self {
        Self::internal_with_hint(
            ErrorKind::Profile,
            format!("failed to load profile '{name}': {reason}"),
            "Check that the profile exists in the profiles directory.",
        )
    }

    #[must_use]
    pub fn invalid_profile_name(name: &str, reason: impl fmt::Display) -> Self {
        Self::internal_with_hint(
            ErrorKind::Profile,
            format!("invalid name '{name}': {reason}"),
            "Names may contain ASCII letters, digits, '.', '-' and '_' and must start with a letter or digit.",
        )
    }

    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::internal(ErrorKind::Config, message)
    }

    #[must_use]
    pub fn cancelled(what: &str) -> Self {
        Self::internal(ErrorKind::Cancelled, format!("{what} was cancelled"))
    }

    /// Returns the error classification, if this is an internal error.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Internal { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Only failures reported by the invoked operation are worth retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), Some(ErrorKind::Remote))
    }

    /// Convert error to JSON representation for structured output
    #[must_use]
    pub fn to_json(&self) -> JsonError {
        let (error_type, message, context) = match self {
            Self::Internal {
                kind,
                message,
                context,
            } => (
                format!("{kind:?}"),
                message.clone(),
                context.as_ref().and_then(|ctx| ctx.suggestion.clone()),
            ),
            Self::Io(io_err) => {
                let context = match io_err.kind() {
                    std::io::ErrorKind::NotFound => {
                        Some("Check that the file path is correct and the file exists.")
                    }
                    std::io::ErrorKind::PermissionDenied => {
                        Some("Check file permissions or run with appropriate privileges.")
                    }
                    _ => None,
                };
                (
                    "FileSystem".to_string(),
                    io_err.to_string(),
                    context.map(str::to_string),
                )
            }
            Self::Json(json_err) => (
                "JSONParsing".to_string(),
                json_err.to_string(),
                Some("Check that the input contains valid JSON.".to_string()),
            ),
            Self::Toml(toml_err) => (
                "TOMLParsing".to_string(),
                toml_err.to_string(),
                Some("Check that your configuration file is valid TOML syntax.".to_string()),
            ),
            Self::Anyhow(err) => (
                "Unexpected".to_string(),
                format!("{err:#}"),
                Some(
                    "This may be a bug. Please report it with the command you were running."
                        .to_string(),
                ),
            ),
        };

        JsonError {
            error_type,
            message,
            context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_remote_errors_are_retryable() {
        assert!(Error::remote(&anyhow::anyhow!("boom")).is_retryable());
        assert!(!Error::not_authenticated("dev").is_retryable());
        assert!(!Error::not_found("operation", "GetWidget").is_retryable());
        assert!(!Error::invalid_json_flag("tags", "eof").is_retryable());
    }

    #[test]
    fn test_invalid_choice_lists_choices() {
        let err = Error::invalid_choice("state", "paused", &["on".to_string(), "off".to_string()]);
        let message = err.to_string();
        assert!(message.contains("--state"));
        assert!(message.contains("paused"));
        assert!(message.contains("on, off"));
    }

    #[test]
    fn test_to_json_carries_hint() {
        let json = Error::not_authenticated("dev").to_json();
        assert_eq!(json.error_type, "Authentication");
        assert!(json.context.unwrap_or_default().contains("Log in first"));
    }

    #[test]
    fn test_remote_error_keeps_cause_chain() {
        let cause = anyhow::anyhow!("connection reset").context("GetWidget failed");
        let err = Error::remote(&cause);
        assert_eq!(err.to_string(), "GetWidget failed: connection reset");
    }
}
