//! CLI-agnostic invocation model for the execution engine.
//!
//! These types decouple the resolver, invoker and orchestrator from clap.
//! The CLI layer translates `ArgMatches` into [`ParsedFlags`] and
//! [`ExecOptions`]; tests and other frontends can construct them directly.

use crate::constants;
use indexmap::IndexMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Flags the user explicitly supplied, keyed by wire name.
///
/// Flags that only carry their declared default are absent, which is what
/// lets the resolver tell "omitted" apart from "set to the zero value".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFlags {
    values: IndexMap<String, Vec<String>>,
}

impl ParsedFlags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a single raw value for a flag, replacing earlier values.
    #[must_use]
    pub fn with(mut self, wire_name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(wire_name, vec![value.into()]);
        self
    }

    pub fn insert(&mut self, wire_name: impl Into<String>, values: Vec<String>) {
        self.values.insert(wire_name.into(), values);
    }

    #[must_use]
    pub fn get(&self, wire_name: &str) -> Option<&[String]> {
        self.values.get(wire_name).map(Vec::as_slice)
    }

    #[must_use]
    pub fn is_supplied(&self, wire_name: &str) -> bool {
        self.values.contains_key(wire_name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Where a compiled leaf command dispatches to on the service handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPath {
    /// Top-level action (service module) name.
    pub service: String,
    /// Sub-service accessor name (`PascalCase` action name).
    pub sub_service: String,
    /// Operation name (schema map key).
    pub operation: String,
    /// Leaf command name, used for the generic success message.
    pub command_name: String,
}

/// Persistent options of the `exec` command group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOptions {
    pub profile_name: Option<String>,
    /// Reserved for writing results to a file; accepted but not used yet.
    pub output_path: Option<PathBuf>,
    pub request_file: Option<PathBuf>,
    /// Total attempts for the remote call; values below 1 are treated as 1.
    pub retry_count: u32,
    pub refresh_auth: bool,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            profile_name: None,
            output_path: None,
            request_file: None,
            retry_count: 1,
            refresh_auth: false,
        }
    }
}

/// Ambient settings handed to the orchestrator explicitly.
#[derive(Debug, Clone)]
pub struct ExecSettings {
    /// Interactive sessions get warnings and retry notices on stderr.
    pub interactive: bool,
    /// Fixed delay between retry attempts.
    pub retry_delay: Duration,
    /// Cancels an in-flight invocation, including paginated drains.
    pub cancel: CancellationToken,
    /// Profile used when `--profile-name` is absent.
    pub default_profile: String,
}

impl Default for ExecSettings {
    fn default() -> Self {
        Self {
            interactive: true,
            retry_delay: Duration::from_secs(constants::DEFAULT_RETRY_DELAY_SECS),
            cancel: CancellationToken::new(),
            default_profile: constants::DEFAULT_PROFILE.to_string(),
        }
    }
}
