use clap::Parser;
use portico::cli::commands::{exec, list};
use portico::cli::errors::print_error_with_json;
use portico::cli::tracing_init::init_tracing;
use portico::cli::{Cli, Commands};
use portico::config::manager::{get_config_dir, ConfigManager};
use portico::error::Error;
use portico::fs::OsFileSystem;
use portico::output::Output;
use portico::services::builtin_modules;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);
    let json_errors = cli.json_errors || configured_json_errors();

    if let Err(e) = run_command(cli, json_errors).await {
        print_error_with_json(&e, json_errors);
        std::process::exit(1);
    }
}

/// `json_errors` from config.toml, shared by every subcommand.
///
/// Unreadable configuration is reported later by the command that needs it.
fn configured_json_errors() -> bool {
    get_config_dir()
        .ok()
        .map(|dir| ConfigManager::with_fs(OsFileSystem, dir))
        .and_then(|manager| manager.load_global_config().ok())
        .is_some_and(|config| config.json_errors)
}

async fn run_command(cli: Cli, json_errors: bool) -> Result<(), Error> {
    let registry = builtin_modules();
    let output = Output::new(cli.quiet, json_errors);
    match cli.command {
        Commands::Exec { args } => {
            exec::execute_exec_command(args, &registry, &output).await?;
        }
        Commands::ListCommands => {
            list::execute_list_commands(&registry, &output)?;
        }
    }
    Ok(())
}
