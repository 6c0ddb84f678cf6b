use clap::error::ErrorKind as ClapErrorKind;
use clap::parser::ValueSource;
use portico::action::ActionDefinition;
use portico::cli::translate::{matches_to_exec_options, matches_to_leaf, matches_to_parsed_flags};
use portico::engine::generator::{compile, CompiledCommands};
use portico::error::ErrorKind;
use portico::schema::introspect::JSON_INPUT_HINT;
use portico::schema::{ArgumentSchema, FieldKind, FieldSpec, IntWidth};
use portico::services::directory::DirectoryModule;
use portico::services::ServiceModule;
use serde::{Deserialize, Serialize};

fn compiled_directory() -> CompiledCommands {
    compile(&[DirectoryModule.definition()]).unwrap()
}

fn parse(compiled: &CompiledCommands, args: &[&str]) -> Result<clap::ArgMatches, clap::Error> {
    compiled
        .command
        .clone()
        .try_get_matches_from(std::iter::once("exec").chain(args.iter().copied()))
}

fn names(path: &[&str]) -> Vec<String> {
    path.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn test_one_leaf_per_schema_key_with_dispatch_path() {
    let compiled = compiled_directory();
    assert_eq!(compiled.leaf_count(), 12);

    let leaf = compiled
        .leaf(&names(&["directory", "users", "get-user"]))
        .expect("get-user leaf");
    assert_eq!(leaf.path.service, "directory");
    assert_eq!(leaf.path.sub_service, "Users");
    assert_eq!(leaf.path.operation, "GetUser");
    assert_eq!(leaf.path.command_name, "get-user");

    let root_leaf = compiled
        .leaf(&names(&["directory", "who-am-i"]))
        .expect("who-am-i leaf");
    assert_eq!(root_leaf.path.sub_service, "Directory");
    assert!(root_leaf.schema.is_none());
    assert!(root_leaf.descriptors.is_empty());
}

#[test]
fn test_required_fields_are_enforced_by_the_command_tree() {
    let compiled = compiled_directory();
    let err = parse(&compiled, &["directory", "users", "get-user"]).unwrap_err();
    assert_eq!(err.kind(), ClapErrorKind::MissingRequiredArgument);
    assert!(err.to_string().contains("--user-name"));
}

#[test]
fn test_defaults_are_attached_but_not_reported_as_explicit() {
    let compiled = compiled_directory();
    let matches = parse(&compiled, &["directory", "users", "list-users"]).unwrap();
    let (leaf, leaf_matches) = matches_to_leaf(&compiled, &matches).unwrap();

    assert_eq!(
        leaf_matches.value_source("page_size"),
        Some(ValueSource::DefaultValue)
    );
    assert_eq!(
        leaf_matches.get_one::<String>("page_size").map(String::as_str),
        Some("2")
    );
    let flags = matches_to_parsed_flags(leaf_matches, &leaf.descriptors);
    assert!(flags.is_empty());
}

#[test]
fn test_explicit_flags_are_collected_by_wire_name() {
    let compiled = compiled_directory();
    let matches = parse(
        &compiled,
        &[
            "directory",
            "users",
            "create-user",
            "--user-name",
            "erin",
            "--tags",
            "a,b",
            "--tags",
            "c",
            "--dry-run",
        ],
    )
    .unwrap();
    let (leaf, leaf_matches) = matches_to_leaf(&compiled, &matches).unwrap();
    let flags = matches_to_parsed_flags(leaf_matches, &leaf.descriptors);

    assert_eq!(flags.get("user_name"), Some(&["erin".to_string()][..]));
    assert_eq!(
        flags.get("tags"),
        Some(&["a,b".to_string(), "c".to_string()][..])
    );
    assert_eq!(flags.get("dry_run"), Some(&["true".to_string()][..]));
    // status has a default but was not typed
    assert!(!flags.is_supplied("status"));
}

#[test]
fn test_boolean_flag_accepts_explicit_false() {
    let compiled = compiled_directory();
    let matches = parse(
        &compiled,
        &["directory", "users", "delete-user", "--user-name", "bob", "--dry-run=false"],
    )
    .unwrap();
    let (leaf, leaf_matches) = matches_to_leaf(&compiled, &matches).unwrap();
    let flags = matches_to_parsed_flags(leaf_matches, &leaf.descriptors);
    assert_eq!(flags.get("dry_run"), Some(&["false".to_string()][..]));
}

#[test]
fn test_aliases_resolve_to_canonical_leaf() {
    let compiled = compiled_directory();
    let matches = parse(&compiled, &["dir", "user", "count-users"]).unwrap();
    let (leaf, _) = matches_to_leaf(&compiled, &matches).unwrap();
    assert_eq!(leaf.path.operation, "CountUsers");
}

#[test]
fn test_persistent_options_reach_the_leaf() {
    let compiled = compiled_directory();
    let matches = parse(
        &compiled,
        &[
            "directory",
            "--profile-name",
            "ops",
            "users",
            "count-users",
            "--retry-count",
            "3",
            "--refresh-auth",
            "--request-file",
            "req.json",
        ],
    )
    .unwrap();
    let (_, leaf_matches) = matches_to_leaf(&compiled, &matches).unwrap();
    let options = matches_to_exec_options(leaf_matches);
    assert_eq!(options.profile_name.as_deref(), Some("ops"));
    assert_eq!(options.retry_count, 3);
    assert!(options.refresh_auth);
    assert_eq!(
        options.request_file.as_deref(),
        Some(std::path::Path::new("req.json"))
    );
    assert!(options.output_path.is_none());
}

#[test]
fn test_retry_count_below_one_is_rejected() {
    let compiled = compiled_directory();
    let err = parse(
        &compiled,
        &["directory", "users", "count-users", "--retry-count", "0"],
    )
    .unwrap_err();
    assert_eq!(err.kind(), ClapErrorKind::ValueValidation);
}

#[test]
fn test_composite_flags_carry_json_hint() {
    let compiled = compiled_directory();
    let create_user = compiled
        .command
        .find_subcommand("directory")
        .and_then(|c| c.find_subcommand("users"))
        .and_then(|c| c.find_subcommand("create-user"))
        .expect("create-user command");
    let memberships = create_user
        .get_arguments()
        .find(|arg| arg.get_id() == "memberships")
        .expect("memberships flag");
    let help = memberships.get_help().map(ToString::to_string).unwrap_or_default();
    assert!(help.contains(JSON_INPUT_HINT));

    let status = create_user
        .get_arguments()
        .find(|arg| arg.get_id() == "status")
        .expect("status flag");
    let help = status.get_help().map(ToString::to_string).unwrap_or_default();
    assert!(help.contains("[choices: active, disabled]"));
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BrokenDefault {
    count: i8,
}

impl ArgumentSchema for BrokenDefault {
    fn fields() -> Vec<FieldSpec> {
        vec![FieldSpec::new("count", FieldKind::Int(IntWidth::W8)).default_value("300")]
    }
}

#[test]
fn test_schema_error_aborts_compilation() {
    let definition = ActionDefinition::new("widgets")
        .operation_without_args("ListWidgets")
        .child(ActionDefinition::new("parts").operation::<BrokenDefault>("AddPart"));
    let err = compile(&[definition]).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Schema));
    assert!(err.to_string().contains("BrokenDefault.count"));
}

#[test]
fn test_nested_children_extend_the_name_path() {
    let definition = ActionDefinition::new("access-groups").child(
        ActionDefinition::new("service-ids")
            .child(ActionDefinition::new("api-keys").operation_without_args("ListAPIKeys")),
    );
    let compiled = compile(&[definition]).unwrap();
    let leaf = compiled
        .leaf(&names(&["access-groups", "service-ids", "api-keys", "list-api-keys"]))
        .expect("nested leaf");
    assert_eq!(leaf.path.service, "access-groups");
    assert_eq!(leaf.path.sub_service, "ApiKeys");
    assert_eq!(leaf.path.operation, "ListAPIKeys");
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ShiftInput {
    count: i32,
    ratio: f64,
    limit: u16,
}

impl ArgumentSchema for ShiftInput {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("count", FieldKind::Int(IntWidth::W32)),
            FieldSpec::new("ratio", FieldKind::Float),
            FieldSpec::new("limit", FieldKind::Uint(IntWidth::W16)),
        ]
    }
}

#[test]
fn test_numeric_flags_accept_negative_values() {
    let definition = ActionDefinition::new("widgets").operation::<ShiftInput>("ShiftWidget");
    let compiled = compile(&[definition]).unwrap();
    let matches = parse(
        &compiled,
        &[
            "widgets",
            "shift-widget",
            "--count",
            "-5",
            "--ratio",
            "-0.5",
            "--limit",
            "-1",
        ],
    )
    .unwrap();
    let (leaf, leaf_matches) = matches_to_leaf(&compiled, &matches).unwrap();
    let flags = matches_to_parsed_flags(leaf_matches, &leaf.descriptors);

    assert_eq!(flags.get("count"), Some(&["-5".to_string()][..]));
    assert_eq!(flags.get("ratio"), Some(&["-0.5".to_string()][..]));
    // Range checking belongs to the resolver, which rejects this later.
    assert_eq!(flags.get("limit"), Some(&["-1".to_string()][..]));
}
