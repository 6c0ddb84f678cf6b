use crate::auth::CachedTokenProvider;
use crate::cli::translate;
use crate::config::manager::{get_config_dir, ConfigManager};
use crate::config::models::GlobalConfig;
use crate::constants;
use crate::engine::generator;
use crate::engine::orchestrator::Orchestrator;
use crate::engine::resolver;
use crate::error::Error;
use crate::fs::OsFileSystem;
use crate::invocation::ExecSettings;
use crate::output::Output;
use crate::services::ModuleRegistry;
use clap::error::ErrorKind as ClapErrorKind;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Parses `args` against the compiled command tree and runs the selected operation.
pub async fn execute_exec_command(
    args: Vec<String>,
    registry: &ModuleRegistry,
    output: &Output,
) -> Result<(), Error> {
    let manager = ConfigManager::with_fs(OsFileSystem, get_config_dir()?);
    let global_config = manager.load_global_config()?;

    let compiled = generator::compile(&registry.definitions())?;
    let matches = match compiled
        .command
        .clone()
        .try_get_matches_from(std::iter::once(constants::CMD_EXEC.to_string()).chain(args))
    {
        Ok(matches) => matches,
        Err(e)
            if matches!(
                e.kind(),
                ClapErrorKind::DisplayHelp
                    | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                    | ClapErrorKind::DisplayVersion
            ) =>
        {
            e.print()?;
            return Ok(());
        }
        Err(e) => return Err(Error::invalid_command(e)),
    };

    // Translate ArgMatches → domain types
    let (leaf, leaf_matches) = translate::matches_to_leaf(&compiled, &matches)?;
    let flags = translate::matches_to_parsed_flags(leaf_matches, &leaf.descriptors);
    let options = translate::matches_to_exec_options(leaf_matches);

    // Arguments are resolved before authentication so bad input fails fast
    let resolved = match leaf.schema {
        Some(_) => Some(resolver::resolve(
            &OsFileSystem,
            &flags,
            options.request_file.as_deref(),
            &leaf.descriptors,
        )?),
        None => {
            if let Some(path) = &options.request_file {
                debug!(
                    target: "portico::cli",
                    "{} takes no arguments, ignoring request file {}",
                    leaf.path.command_name,
                    path.display()
                );
            }
            None
        }
    };

    let settings = exec_settings(&global_config);
    let cancel = settings.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!(target: "portico::cli", "received Ctrl+C, cancelling");
            cancel.cancel();
        }
    });

    let module = registry.module_named(&leaf.path.service)?;
    let authenticators = CachedTokenProvider::new(manager.config_dir());
    let orchestrator = Orchestrator::new(&manager, &authenticators, settings);

    let rendered = orchestrator
        .execute(module, &leaf.path, resolved.as_ref(), &options, output)
        .await?;
    output.data(rendered);
    Ok(())
}

/// Builds the explicit settings value handed to the orchestrator.
#[must_use]
pub fn exec_settings(config: &GlobalConfig) -> ExecSettings {
    ExecSettings {
        interactive: config.interactive,
        retry_delay: Duration::from_secs(config.retry_delay_secs),
        cancel: CancellationToken::new(),
        default_profile: config.default_profile.clone(),
    }
}
