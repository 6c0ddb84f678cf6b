//! Centralized string constants for the Portico CLI
//!
//! This module contains commonly used string literals to:
//! - Reduce string duplication
//! - Keep flag names consistent between the compiler and the translator

// Environment variables
pub const ENV_PORTICO_CONFIG_DIR: &str = "PORTICO_CONFIG_DIR";
pub const ENV_PORTICO_LOG: &str = "PORTICO_LOG";
pub const ENV_PORTICO_LOG_FORMAT: &str = "PORTICO_LOG_FORMAT";
pub const ENV_PORTICO_LOG_FILE: &str = "PORTICO_LOG_FILE";
pub const ENV_PORTICO_LOG_MAX_BODY: &str = "PORTICO_LOG_MAX_BODY";

// Config layout
pub const CONFIG_FILE: &str = "config.toml";
pub const DIR_PROFILES: &str = "profiles";
pub const DIR_CREDENTIALS: &str = "credentials";
pub const FILE_EXT_JSON: &str = "json";

// Command names
pub const CMD_EXEC: &str = "exec";

// Persistent flags of the exec group
pub const FLAG_PROFILE_NAME: &str = "profile-name";
pub const FLAG_OUTPUT_PATH: &str = "output-path";
pub const FLAG_REQUEST_FILE: &str = "request-file";
pub const FLAG_RETRY_COUNT: &str = "retry-count";
pub const FLAG_REFRESH_AUTH: &str = "refresh-auth";

/// Flag names reserved by the exec group; schema fields may not reuse them.
pub const RESERVED_FLAGS: &[&str] = &[
    FLAG_PROFILE_NAME,
    FLAG_OUTPUT_PATH,
    FLAG_REQUEST_FILE,
    FLAG_RETRY_COUNT,
    FLAG_REFRESH_AUTH,
    "help",
    "version",
];

// Defaults
pub const DEFAULT_PROFILE: &str = "default";
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 3;
pub const DEFAULT_PAGE_BUFFER: usize = 16;
pub const DEFAULT_LOG_MAX_BODY: usize = 1000;

// Messages
pub const MSG_FINISHED_SUCCESSFULLY: &str = "finished successfully";
pub const REDACTED: &str = "[REDACTED]";

// Error hints
pub const ERR_FILE_NOT_FOUND: &str = "Check that the file path is correct and the file exists.";
pub const ERR_PERMISSION: &str = "Check file permissions or run with appropriate privileges.";
pub const ERR_JSON_SYNTAX: &str = "Check that the input contains valid JSON.";
pub const ERR_TOML_SYNTAX: &str = "Check that your configuration file is valid TOML syntax.";
