mod common;

use assert_cmd::Command;
use common::{logged_in_config_dir, portico_cmd, write_credential, write_profile};
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn exec(config_dir: &Path) -> Command {
    let mut cmd = portico_cmd();
    cmd.env("PORTICO_CONFIG_DIR", config_dir)
        .env_remove("PORTICO_LOG")
        .arg("exec");
    cmd
}

#[test]
fn test_get_user_renders_record() {
    let config_dir = logged_in_config_dir();

    exec(config_dir.path())
        .args(["directory", "users", "get-user", "--user-name", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"user_name\": \"alice\""))
        .stdout(predicate::str::contains("\"email\": \"alice@example.com\""));
}

#[test]
fn test_operation_without_arguments() {
    let config_dir = logged_in_config_dir();

    exec(config_dir.path())
        .args(["directory", "who-am-i"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default (apikey)"));

    exec(config_dir.path())
        .args(["directory", "users", "count-users"])
        .assert()
        .success()
        .stdout("4\n");
}

#[test]
fn test_empty_result_prints_success_message() {
    let config_dir = logged_in_config_dir();

    exec(config_dir.path())
        .args(["directory", "users", "delete-user", "--user-name", "bob"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Delete User finished successfully"));
}

#[test]
fn test_aliases_reach_the_same_operation() {
    let config_dir = logged_in_config_dir();

    exec(config_dir.path())
        .args(["dir", "user", "count-users"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4"));
}

#[test]
fn test_paginated_listing_is_flattened() {
    let config_dir = logged_in_config_dir();

    let output = exec(config_dir.path())
        .args(["directory", "users", "list-users"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let users: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = users
        .iter()
        .filter_map(|u| u["user_name"].as_str())
        .collect();
    assert_eq!(names, vec!["alice", "bob", "carol", "dave"]);
}

#[test]
fn test_request_file_and_flag_precedence() {
    let config_dir = logged_in_config_dir();
    let request = config_dir.path().join("request.json");
    fs::write(&request, r#"{"Status": "disabled"}"#).unwrap();

    exec(config_dir.path())
        .args(["directory", "users", "list-users", "--request-file"])
        .arg(&request)
        .assert()
        .success()
        .stdout(predicate::str::contains("carol"))
        .stdout(predicate::str::contains("alice").not());

    exec(config_dir.path())
        .args(["directory", "users", "list-users", "--status", "active", "--request-file"])
        .arg(&request)
        .assert()
        .success()
        .stdout(predicate::str::contains("alice"))
        .stdout(predicate::str::contains("carol").not());
}

#[test]
fn test_invalid_choice_fails_before_authentication() {
    // No credentials exist, so reaching authentication would fail differently.
    let config_dir = tempfile::tempdir().unwrap();

    exec(config_dir.path())
        .args(["directory", "users", "list-users", "--status", "bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "invalid value 'bogus' for flag '--status', valid choices are: active, disabled",
        ));
}

#[test]
fn test_invalid_json_flag_names_the_flag() {
    let config_dir = logged_in_config_dir();

    exec(config_dir.path())
        .args([
            "directory",
            "users",
            "create-user",
            "--user-name",
            "erin",
            "--memberships",
            "[{",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "flag '--memberships' does not contain valid JSON",
        ));
}

#[test]
fn test_missing_required_flag() {
    let config_dir = logged_in_config_dir();

    exec(config_dir.path())
        .args(["directory", "users", "get-user"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--user-name"));
}

#[test]
fn test_missing_credentials() {
    let config_dir = tempfile::tempdir().unwrap();
    write_profile(config_dir.path(), "default", &["apikey"]);

    exec(config_dir.path())
        .args(["directory", "users", "count-users"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no valid authentication"))
        .stderr(predicate::str::contains("Log in first"));
}

#[test]
fn test_json_errors_output() {
    let config_dir = tempfile::tempdir().unwrap();
    write_profile(config_dir.path(), "default", &["apikey"]);
    write_credential(config_dir.path(), "default", "apikey", "2000-01-01T00:00:00Z");

    portico_cmd()
        .env("PORTICO_CONFIG_DIR", config_dir.path())
        .args(["--json-errors", "exec", "directory", "users", "count-users"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"error_type\": \"Authentication\""));
}

#[test]
fn test_unknown_profile() {
    let config_dir = logged_in_config_dir();

    exec(config_dir.path())
        .args(["directory", "--profile-name", "staging", "users", "count-users"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load profile 'staging'"));
}

#[test]
fn test_partial_authentication_warns() {
    let config_dir = tempfile::tempdir().unwrap();
    write_profile(config_dir.path(), "default", &["apikey", "sso"]);
    write_credential(config_dir.path(), "default", "apikey", "2999-01-01T00:00:00Z");

    exec(config_dir.path())
        .args(["directory", "who-am-i"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default (apikey)"))
        .stderr(predicate::str::contains(
            "Warning: not authenticated with sso",
        ));
}

#[test]
fn test_quiet_suppresses_warnings() {
    let config_dir = tempfile::tempdir().unwrap();
    write_profile(config_dir.path(), "default", &["apikey", "sso"]);
    write_credential(config_dir.path(), "default", "apikey", "2999-01-01T00:00:00Z");

    portico_cmd()
        .env("PORTICO_CONFIG_DIR", config_dir.path())
        .args(["--quiet", "exec", "directory", "who-am-i"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Warning").not());
}

#[test]
fn test_operation_failure_is_reported() {
    let config_dir = logged_in_config_dir();

    exec(config_dir.path())
        .args(["directory", "users", "create-user", "--user-name", "alice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("user 'alice' already exists"));
}

#[test]
fn test_exec_help_lists_services() {
    let config_dir = tempfile::tempdir().unwrap();

    exec(config_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("directory"));

    exec(config_dir.path())
        .args(["directory", "users", "create-user", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--memberships"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_list_commands() {
    let config_dir = tempfile::tempdir().unwrap();

    portico_cmd()
        .env("PORTICO_CONFIG_DIR", config_dir.path())
        .arg("list-commands")
        .assert()
        .success()
        .stdout(predicate::str::contains("directory users:"))
        .stdout(predicate::str::contains("get-user --user-name"))
        .stdout(predicate::str::contains("(Users.GetUser)"));
}

#[test]
fn test_configured_json_errors_apply_to_every_command() {
    let config_dir = tempfile::tempdir().unwrap();
    write_profile(config_dir.path(), "default", &["apikey", "sso"]);
    write_credential(config_dir.path(), "default", "apikey", "2999-01-01T00:00:00Z");
    fs::write(config_dir.path().join("config.toml"), "json_errors = true\n").unwrap();

    exec(config_dir.path())
        .args(["directory", "who-am-i"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Warning").not());

    portico_cmd()
        .env("PORTICO_CONFIG_DIR", config_dir.path())
        .env_remove("PORTICO_LOG")
        .arg("list-commands")
        .assert()
        .success()
        .stdout(predicate::str::contains("directory users:"))
        .stderr(predicate::str::is_empty());

    exec(config_dir.path())
        .args(["directory", "--profile-name", "staging", "users", "count-users"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"error_type\": \"Profile\""));
}
