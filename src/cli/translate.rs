//! CLI translation layer: converts clap `ArgMatches` into domain types.
//!
//! This module bridges the clap-specific parsing world with the
//! CLI-agnostic [`ParsedFlags`] and [`ExecOptions`] types used
//! by the execution engine.

use crate::constants;
use crate::engine::generator::{CompiledCommands, CompiledLeaf};
use crate::error::Error;
use crate::invocation::{ExecOptions, ParsedFlags};
use crate::schema::ArgumentDescriptor;
use clap::parser::ValueSource;
use clap::ArgMatches;
use std::path::PathBuf;

/// Walks the matched subcommand chain below `exec` down to its leaf.
///
/// Returns the compiled leaf together with the leaf's own matches, which
/// carry both its field flags and the propagated persistent options.
///
/// # Errors
///
/// Returns a resolution error if the matched path does not end at a
/// compiled leaf command.
pub fn matches_to_leaf<'c, 'm>(
    compiled: &'c CompiledCommands,
    matches: &'m ArgMatches,
) -> Result<(&'c CompiledLeaf, &'m ArgMatches), Error> {
    let mut names = Vec::new();
    let mut current = matches;
    while let Some((name, sub_matches)) = current.subcommand() {
        names.push(name.to_string());
        current = sub_matches;
    }

    compiled
        .leaf(&names)
        .map(|leaf| (leaf, current))
        .ok_or_else(|| {
            Error::invalid_command(format!("'{}' is not an operation", names.join(" ")))
        })
}

/// Collects only the flags the user explicitly set on the command line.
///
/// Values coming from a flag's declared default are left out, so the
/// resolver can apply defaults below request-file values.
#[must_use]
pub fn matches_to_parsed_flags(
    matches: &ArgMatches,
    descriptors: &[ArgumentDescriptor],
) -> ParsedFlags {
    let mut flags = ParsedFlags::new();
    for descriptor in descriptors {
        let id = descriptor.wire_name.as_str();
        if matches.value_source(id) != Some(ValueSource::CommandLine) {
            continue;
        }
        let values: Vec<String> = matches
            .get_many::<String>(id)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        flags.insert(id, values);
    }
    flags
}

/// Extracts the persistent `exec` options.
#[must_use]
pub fn matches_to_exec_options(matches: &ArgMatches) -> ExecOptions {
    ExecOptions {
        profile_name: matches
            .get_one::<String>(constants::FLAG_PROFILE_NAME)
            .cloned(),
        output_path: matches
            .get_one::<PathBuf>(constants::FLAG_OUTPUT_PATH)
            .cloned(),
        request_file: matches
            .get_one::<PathBuf>(constants::FLAG_REQUEST_FILE)
            .cloned(),
        retry_count: matches
            .get_one::<u32>(constants::FLAG_RETRY_COUNT)
            .copied()
            .unwrap_or(1),
        refresh_auth: matches.get_flag(constants::FLAG_REFRESH_AUTH),
    }
}
