//! Shared test utilities

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Cached binary path for the portico CLI to avoid repeated lookups
#[allow(deprecated)]
pub static PORTICO_BIN: std::sync::LazyLock<PathBuf> =
    std::sync::LazyLock::new(|| assert_cmd::cargo::cargo_bin("portico"));

/// Test helper to create a command with the cached binary
pub fn portico_cmd() -> assert_cmd::Command {
    assert_cmd::Command::new(&*PORTICO_BIN)
}

/// Writes `profiles/<name>.json` with the given authenticator names.
pub fn write_profile(config_dir: &Path, name: &str, authenticators: &[&str]) {
    let profiles = config_dir.join("profiles");
    fs::create_dir_all(&profiles).unwrap();
    let entries: serde_json::Map<String, serde_json::Value> = authenticators
        .iter()
        .map(|auth| ((*auth).to_string(), serde_json::json!({})))
        .collect();
    let profile = serde_json::json!({ "name": name, "authenticators": entries });
    fs::write(
        profiles.join(format!("{name}.json")),
        serde_json::to_string_pretty(&profile).unwrap(),
    )
    .unwrap();
}

/// Writes `credentials/<profile>/<authenticator>.json`.
pub fn write_credential(config_dir: &Path, profile: &str, authenticator: &str, expires_at: &str) {
    let dir = config_dir.join("credentials").join(profile);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join(format!("{authenticator}.json")),
        format!(r#"{{"access_token": "tok-{authenticator}", "expires_at": "{expires_at}"}}"#),
    )
    .unwrap();
}

/// A config directory with profile `default` logged in through `apikey`.
pub fn logged_in_config_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_profile(dir.path(), "default", &["apikey"]);
    write_credential(dir.path(), "default", "apikey", "2999-01-01T00:00:00Z");
    dir
}
