pub mod migrate;
pub mod serve;
pub mod version;

// Local crates
use crate::cmd::serve::ServeArgs;

// External crates
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root command of the Walle CLI.
///
/// The two persistent flags are global: they survive into every subcommand
/// and are additionally pre-parsed eagerly at bootstrap time so the
/// application context exists before dispatch. The auto-generated `help`
/// subcommand is disabled; only the `--help` flag stays active.
#[derive(Debug, Parser)]
#[command(
    name = "walle",
    about = "Walle CLI",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// the app data directory (defaults to "<base dir>/data")
    #[arg(long, global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// enable dev mode, aka. printing logs to the console
    /// (defaults to true when launched via a source runner)
    #[arg(
        long,
        global = true,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub dev: Option<bool>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Starts the web server (default to 127.0.0.1:8090 if no domain is specified)
    Serve(ServeArgs),

    /// Runs the pending data migrations
    Migrate,

    /// Displays the application version
    Version,
}
