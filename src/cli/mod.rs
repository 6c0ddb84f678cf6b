pub mod commands;
pub mod errors;
pub mod tracing_init;
pub mod translate;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Portico: dynamic CLI for identity and access service modules",
    long_about = "Portico compiles the action definitions of its service modules into commands.\n\
                  Every operation a module declares becomes a command whose flags are derived\n\
                  from the operation's argument schema.\n\n\
                  Examples:\n  \
                  portico exec directory users get-user --user-name alice\n  \
                  portico exec directory users list-users --status active --retry-count 3\n  \
                  portico exec directory groups create-group --request-file group.json\n\n\
                  Agent-friendly features:\n  \
                  portico --json-errors exec ...  # Structured error output"
)]
pub struct Cli {
    /// Output all errors as structured JSON to stderr
    #[arg(long, global = true, help = "Output errors in JSON format")]
    pub json_errors: bool,

    /// Suppress non-essential output (warnings, retry notices)
    /// Only outputs requested data and errors
    #[arg(
        long,
        short = 'q',
        global = true,
        help = "Suppress informational output"
    )]
    pub quiet: bool,

    /// Increase logging verbosity
    #[arg(
        short = 'v',
        global = true,
        action = ArgAction::Count,
        help = "Increase logging verbosity (-v for debug, -vv for trace)"
    )]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an operation of a service module
    #[command(
        long_about = "Run an operation of a registered service module.\n\n\
                      Commands are generated from each module's action definitions:\n\
                      one group per action, one command per operation, one flag per\n\
                      argument field. Arguments are resolved from field defaults, then\n\
                      the request file, then explicit flags.\n\n\
                      Examples:\n  \
                      portico exec directory users get-user --user-name alice\n  \
                      portico exec directory --help  # See available operations",
        disable_help_flag = true
    )]
    Exec {
        /// Remaining arguments are parsed by the compiled command tree
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// List the commands compiled from every service module
    ListCommands,
}
