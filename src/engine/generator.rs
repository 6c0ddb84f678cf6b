use crate::action::ActionDefinition;
use crate::constants;
use crate::error::Error;
use crate::invocation::DispatchPath;
use crate::schema::{introspect, ArgumentDescriptor, FieldKind, SchemaRef};
use crate::utils::{to_kebab_case, to_pascal_case};
use clap::{value_parser, Arg, ArgAction, Command};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::debug;

/// Converts a String to a 'static str by leaking it
///
/// This is necessary for clap's API which requires 'static strings.
/// In a CLI context, this is acceptable as the program runs once and exits.
fn to_static_str(s: String) -> &'static str {
    Box::leak(s.into_boxed_str())
}

/// Everything the dispatcher needs to run one compiled leaf command.
#[derive(Debug, Clone)]
pub struct CompiledLeaf {
    pub path: DispatchPath,
    /// `None` for operations without an argument schema.
    pub schema: Option<SchemaRef>,
    pub descriptors: Vec<ArgumentDescriptor>,
}

/// The compiled `exec` command tree and its leaf dispatch table.
#[derive(Debug, Clone)]
pub struct CompiledCommands {
    pub command: Command,
    /// Keyed by the canonical subcommand names below `exec`.
    leaves: IndexMap<Vec<String>, CompiledLeaf>,
}

impl CompiledCommands {
    /// Looks up a leaf by its subcommand name path, e.g. `["directory", "users", "get-user"]`.
    #[must_use]
    pub fn leaf(&self, names: &[String]) -> Option<&CompiledLeaf> {
        self.leaves.get(names)
    }

    pub fn leaves(&self) -> impl Iterator<Item = (&[String], &CompiledLeaf)> {
        self.leaves.iter().map(|(names, leaf)| (names.as_slice(), leaf))
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }
}

/// Compiles action definitions into the `exec` command tree.
///
/// Each top-level definition becomes one service command group:
/// - Group commands: one per action definition, nested like the definitions
/// - Leaf commands: one per schema map key, named in kebab-case
/// - Flags: one per public schema field, named after its wire name
///
/// # Example
/// For a `directory` definition with a `users` child declaring `GetUser`:
/// ```text
/// exec directory users get-user --user-name alice
/// ```
///
/// # Errors
///
/// Returns a schema error if any schema is malformed, a field flag collides
/// with a persistent `exec` option, or two commands in the same group share a
/// name. Errors are fatal: the whole tree is rejected.
pub fn compile(definitions: &[ActionDefinition]) -> Result<CompiledCommands, Error> {
    let mut root = Command::new(constants::CMD_EXEC)
        .about("Run an operation of a service module")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .args(persistent_args());

    let mut leaves = IndexMap::new();
    let mut seen = HashSet::new();
    for definition in definitions {
        ensure_unique(&mut seen, constants::CMD_EXEC, &definition.name)?;
        let group = compile_action(definition, &definition.name, &[], &mut leaves)?;
        root = root.subcommand(group);
    }

    debug!(
        target: "portico::generator",
        "compiled {} service(s) into {} commands",
        definitions.len(),
        leaves.len()
    );
    Ok(CompiledCommands {
        command: root,
        leaves,
    })
}

/// Builds the command group for one definition and, recursively, its children.
///
/// `parents` holds the subcommand names between `exec` and this group.
fn compile_action(
    definition: &ActionDefinition,
    service: &str,
    parents: &[String],
    leaves: &mut IndexMap<Vec<String>, CompiledLeaf>,
) -> Result<Command, Error> {
    if definition.name.is_empty() {
        return Err(Error::schema("action definition has no name"));
    }
    let mut names = parents.to_vec();
    names.push(definition.name.clone());

    let mut group = Command::new(to_static_str(definition.name.clone()))
        .about(definition.description.clone());
    if !definition.version.is_empty() {
        group = group.version(to_static_str(definition.version.clone()));
    }
    for alias in &definition.aliases {
        group = group.visible_alias(to_static_str(alias.clone()));
    }
    if !definition.schemas.is_empty() || !definition.children.is_empty() {
        group = group.subcommand_required(true).arg_required_else_help(true);
    }

    let sub_service = to_pascal_case(&definition.name);
    let mut seen = HashSet::new();

    for (operation, schema) in &definition.schemas {
        let command_name = to_kebab_case(operation);
        if command_name.is_empty() {
            return Err(Error::schema(format!(
                "{}: operation '{operation}' has no usable command name",
                names.join(" ")
            )));
        }
        ensure_unique(&mut seen, &definition.name, &command_name)?;

        let descriptors = match schema {
            Some(schema) => introspect(schema)?,
            None => Vec::new(),
        };
        let leaf = build_leaf_command(&command_name, &sub_service, operation, &descriptors)?;
        group = group.subcommand(leaf);

        let mut leaf_names = names.clone();
        leaf_names.push(command_name.clone());
        leaves.insert(
            leaf_names,
            CompiledLeaf {
                path: DispatchPath {
                    service: service.to_string(),
                    sub_service: sub_service.clone(),
                    operation: operation.clone(),
                    command_name,
                },
                schema: *schema,
                descriptors,
            },
        );
    }

    for child in &definition.children {
        ensure_unique(&mut seen, &definition.name, &child.name)?;
        let child_group = compile_action(child, service, &names, leaves)?;
        group = group.subcommand(child_group);
    }

    Ok(group)
}

fn ensure_unique(seen: &mut HashSet<String>, parent: &str, name: &str) -> Result<(), Error> {
    if seen.insert(name.to_string()) {
        return Ok(());
    }
    Err(Error::schema(format!(
        "{parent}: more than one command is named '{name}'"
    )))
}

fn build_leaf_command(
    command_name: &str,
    sub_service: &str,
    operation: &str,
    descriptors: &[ArgumentDescriptor],
) -> Result<Command, Error> {
    let mut command = Command::new(to_static_str(command_name.to_string()))
        .about(format!("Call {sub_service}.{operation}"));

    for descriptor in descriptors {
        if constants::RESERVED_FLAGS.contains(&descriptor.flag_name.as_str()) {
            return Err(Error::schema(format!(
                "{sub_service}.{operation}: field '{}' collides with the reserved flag '--{}'",
                descriptor.wire_name, descriptor.flag_name
            )));
        }
        command = command.arg(create_arg_from_descriptor(descriptor));
    }
    Ok(command)
}

/// Creates a clap Arg from an [`ArgumentDescriptor`]
///
/// The arg id is the wire name, so the translator can map matches back
/// without a lookup table. Choice sets are validated by the resolver rather
/// than clap, so request-file values get the same treatment.
fn create_arg_from_descriptor(descriptor: &ArgumentDescriptor) -> Arg {
    let mut arg = Arg::new(to_static_str(descriptor.wire_name.clone()))
        .long(to_static_str(descriptor.flag_name.clone()))
        .help(descriptor.help_text())
        .required(descriptor.required);

    arg = match descriptor.kind {
        FieldKind::Bool => arg
            .value_name("BOOL")
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .action(ArgAction::Set),
        FieldKind::StringList => arg.value_name("VALUES").action(ArgAction::Append),
        FieldKind::StringMap => arg.value_name("KEY=VALUE").action(ArgAction::Append),
        FieldKind::RecordMap | FieldKind::RecordList => {
            arg.value_name("JSON").action(ArgAction::Set)
        }
        // Unsigned fields also take `-N` so the resolver reports the range error.
        FieldKind::Int(_) | FieldKind::Uint(_) => arg
            .value_name("INT")
            .allow_negative_numbers(true)
            .action(ArgAction::Set),
        FieldKind::Float => arg
            .value_name("NUMBER")
            .allow_negative_numbers(true)
            .action(ArgAction::Set),
        FieldKind::String | FieldKind::Embedded(_) => {
            arg.value_name("STRING").action(ArgAction::Set)
        }
    };

    if let Some(default) = &descriptor.default {
        arg = arg.default_value(to_static_str(default.clone()));
    }
    arg
}

/// Options shared by every command under `exec`.
fn persistent_args() -> [Arg; 5] {
    [
        Arg::new(constants::FLAG_PROFILE_NAME)
            .long(constants::FLAG_PROFILE_NAME)
            .global(true)
            .value_name("NAME")
            .help("Profile to authenticate with (defaults to the configured default profile)")
            .action(ArgAction::Set),
        Arg::new(constants::FLAG_OUTPUT_PATH)
            .long(constants::FLAG_OUTPUT_PATH)
            .global(true)
            .value_name("PATH")
            .value_parser(value_parser!(PathBuf))
            .help("Reserved for writing results to a file")
            .action(ArgAction::Set),
        Arg::new(constants::FLAG_REQUEST_FILE)
            .long(constants::FLAG_REQUEST_FILE)
            .global(true)
            .value_name("PATH")
            .value_parser(value_parser!(PathBuf))
            .help("JSON file supplying operation arguments; explicit flags take precedence")
            .action(ArgAction::Set),
        Arg::new(constants::FLAG_RETRY_COUNT)
            .long(constants::FLAG_RETRY_COUNT)
            .global(true)
            .value_name("N")
            .value_parser(value_parser!(u32).range(1..))
            .default_value("1")
            .help("Total attempts for the operation call")
            .action(ArgAction::Set),
        Arg::new(constants::FLAG_REFRESH_AUTH)
            .long(constants::FLAG_REFRESH_AUTH)
            .global(true)
            .help("Refresh cached credentials before calling the operation")
            .action(ArgAction::SetTrue),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ArgumentSchema, FieldSpec};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct ClashingInput {
        retry_count: u32,
    }

    impl ArgumentSchema for ClashingInput {
        fn fields() -> Vec<FieldSpec> {
            vec![FieldSpec::new("retry_count", FieldKind::Uint(crate::schema::IntWidth::W32))]
        }
    }

    #[test]
    fn test_reserved_flag_collision_is_rejected() {
        let definition = ActionDefinition::new("widgets").operation::<ClashingInput>("AddWidget");
        let err = compile(&[definition]).unwrap_err();
        assert!(err.to_string().contains("--retry-count"));
    }

    #[test]
    fn test_duplicate_command_names_are_rejected() {
        let definition = ActionDefinition::new("widgets")
            .operation_without_args("ListWidgets")
            .operation_without_args("listWidgets");
        let err = compile(&[definition]).unwrap_err();
        assert!(err.to_string().contains("list-widgets"));
    }

    #[test]
    fn test_tree_passes_clap_debug_asserts() {
        let definition = ActionDefinition::new("widgets")
            .alias("w")
            .version("1.2.3")
            .operation_without_args("ListWidgets")
            .child(ActionDefinition::new("parts").operation_without_args("CountParts"));
        let compiled = compile(&[definition]).unwrap();
        compiled.command.clone().debug_assert();
        assert_eq!(compiled.leaf_count(), 2);
    }
}
