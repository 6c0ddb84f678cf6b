use crate::constants;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Profile used when `--profile-name` is not given
    #[serde(default = "default_profile_value")]
    pub default_profile: String,
    /// Fixed delay between retry attempts, in seconds
    #[serde(default = "default_retry_delay_secs_value")]
    pub retry_delay_secs: u64,
    /// Output errors as JSON by default
    #[serde(default)]
    pub json_errors: bool,
    /// Show warnings and retry notices on stderr
    #[serde(default = "default_interactive_value")]
    pub interactive: bool,
}

fn default_profile_value() -> String {
    constants::DEFAULT_PROFILE.to_string()
}

const fn default_retry_delay_secs_value() -> u64 {
    constants::DEFAULT_RETRY_DELAY_SECS
}

const fn default_interactive_value() -> bool {
    true
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_profile: default_profile_value(),
            retry_delay_secs: default_retry_delay_secs_value(),
            json_errors: false,
            interactive: default_interactive_value(),
        }
    }
}

/// A named set of authenticator configurations.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Profile {
    pub name: String,
    /// Authenticator name -> provider-specific settings, in configured order
    #[serde(default)]
    pub authenticators: IndexMap<String, Value>,
}
