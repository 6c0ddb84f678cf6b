//! Tracing subscriber setup for the `portico` binary.
//!
//! Every event this crate emits uses a `portico::<component>` target such as
//! `portico::resolver` or `portico::orchestrator`, so
//! `PORTICO_LOG=portico::resolver=debug` narrows output to one stage of an
//! invocation.

use crate::constants;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const FALLBACK_FILTER: &str = "error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Parses `PORTICO_LOG_FORMAT`; `None` means the value was not recognised.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Filter directive for the given `-v` count.
///
/// `-v` enables debug for portico's own targets and `-vv` traces
/// everything. Without `-v`, `PORTICO_LOG` applies as-is.
#[must_use]
pub fn filter_directive(verbosity: u8, env_value: Option<&str>) -> String {
    match verbosity {
        0 => env_value
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(FALLBACK_FILTER)
            .to_string(),
        1 => format!("{FALLBACK_FILTER},portico=debug"),
        _ => "trace".to_string(),
    }
}

/// Log destination: `PORTICO_LOG_FILE` when it can be opened, else stderr.
struct LogSink {
    file: Option<Mutex<File>>,
}

impl LogSink {
    fn from_env() -> Self {
        let Ok(path) = std::env::var(constants::ENV_PORTICO_LOG_FILE) else {
            return Self { file: None };
        };
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Self {
                file: Some(Mutex::new(file)),
            },
            Err(e) => {
                // The subscriber does not exist yet, so this cannot be a tracing event.
                eprintln!("Warning: cannot write logs to '{path}' ({e}); logging to stderr");
                Self { file: None }
            }
        }
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = Box<dyn Write + 'a>;

    fn make_writer(&'a self) -> Self::Writer {
        let cloned = self
            .file
            .as_ref()
            .and_then(|file| file.lock().ok())
            .and_then(|file| file.try_clone().ok());
        match cloned {
            Some(file) => Box::new(file),
            None => Box::new(std::io::stderr()),
        }
    }
}

/// Installs the global subscriber. Call once, before any command runs.
pub fn init_tracing(verbosity: u8) {
    let env_value = std::env::var(constants::ENV_PORTICO_LOG).ok();
    let directive = filter_directive(verbosity, env_value.as_deref());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER));

    let format = match std::env::var(constants::ENV_PORTICO_LOG_FORMAT) {
        Ok(value) => LogFormat::parse(&value).unwrap_or_else(|| {
            eprintln!(
                "Warning: unknown {} '{value}', expected 'text' or 'json'",
                constants::ENV_PORTICO_LOG_FORMAT
            );
            LogFormat::Text
        }),
        Err(_) => LogFormat::Text,
    };

    let sink = LogSink::from_env();
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_span_list(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(sink),
            )
            .init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true)
                    .with_writer(sink),
            )
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_overrides_env_filter() {
        assert_eq!(filter_directive(1, Some("warn")), "error,portico=debug");
        assert_eq!(filter_directive(3, None), "trace");
    }

    #[test]
    fn test_env_filter_used_without_verbosity() {
        assert_eq!(
            filter_directive(0, Some("portico::resolver=debug")),
            "portico::resolver=debug"
        );
        assert_eq!(filter_directive(0, Some("  ")), "error");
        assert_eq!(filter_directive(0, None), "error");
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse(" text "), Some(LogFormat::Text));
        assert_eq!(LogFormat::parse("yaml"), None);
    }
}
