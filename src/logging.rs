//! Dispatch logging with automatic redaction of sensitive arguments.
//!
//! Every invocation logs the dispatched `SubService.Operation` at info level,
//! the resolved argument names at debug level and the redacted record at
//! trace level (truncated). Fields whose names look like credentials are always
//! replaced with `[REDACTED]`.

use crate::constants;
use serde_json::{Map, Value};
use tracing::{debug, info, trace, warn};

/// Redacts sensitive values from strings
#[must_use]
pub fn redact_sensitive_value(value: &str) -> String {
    if value.is_empty() {
        value.to_string()
    } else {
        constants::REDACTED.to_string()
    }
}

/// Checks if an argument field should be redacted
#[must_use]
pub fn should_redact_field(field_name: &str) -> bool {
    let lower = field_name.to_lowercase().replace('-', "_");
    matches!(
        lower.as_str(),
        "password" | "secret" | "client_secret" | "token" | "apikey" | "api_key" | "passcode"
    ) || lower.ends_with("_token")
        || lower.ends_with("_secret")
        || lower.ends_with("_password")
}

/// Returns a copy of the arguments with sensitive top-level values redacted.
#[must_use]
pub fn redact_arguments(args: &Map<String, Value>) -> Map<String, Value> {
    args.iter()
        .map(|(key, value)| {
            let value = if should_redact_field(key) {
                Value::String(redact_sensitive_value(&value.to_string()))
            } else {
                value.clone()
            };
            (key.clone(), value)
        })
        .collect()
}

/// Logs the start of a dispatch with its (redacted) arguments
pub fn log_dispatch(service: &str, target_name: &str, args: Option<&Map<String, Value>>) {
    info!(
        target: "portico::invoker",
        "→ {}.{}",
        service,
        target_name
    );

    let Some(args) = args else {
        return;
    };
    let redacted = Value::Object(redact_arguments(args));
    debug!(
        target: "portico::invoker",
        "Arguments: {}",
        args.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
    );
    trace!(
        target: "portico::invoker",
        "Arguments: {}",
        truncate(&redacted.to_string(), get_max_body_len())
    );
}

/// Logs a completed dispatch
pub fn log_completion(target_name: &str, duration_ms: u128, outcomes: usize) {
    info!(
        target: "portico::invoker",
        "← {} OK ({}ms, {} outcome(s))",
        target_name,
        duration_ms,
        outcomes
    );
}

/// Logs a failed dispatch
pub fn log_failure(target_name: &str, duration_ms: u128, error: &str) {
    warn!(
        target: "portico::invoker",
        "← {} FAILED ({}ms): {}",
        target_name,
        duration_ms,
        error
    );
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{} (truncated at {} chars)", &text[..end], max_len)
}

/// Gets the maximum logged argument length from `PORTICO_LOG_MAX_BODY`
#[must_use]
pub fn get_max_body_len() -> usize {
    std::env::var(constants::ENV_PORTICO_LOG_MAX_BODY)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(constants::DEFAULT_LOG_MAX_BODY)
}
