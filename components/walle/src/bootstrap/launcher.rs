// Local crates
use crate::app::app::App;
use crate::app::base::{BaseApp, BaseAppConfig};
use crate::bootstrap::runtime::inspect_runtime;
use crate::cmd::{self, Cli, Commands};
use crate::instrumentation;

// External crates
use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Bootstrap-time configuration seed.
///
/// Only used to pre-fill the defaults of the global flags; discarded once
/// the [`BaseApp`] is constructed.
#[derive(Debug, Clone, Default)]
pub struct LaunchConfig {
    /// Default app data directory; falls back to `<base dir>/data`.
    pub data_dir: Option<PathBuf>,

    /// Default dev-mode flag; falls back to the inspected launch mode
    /// (a source-runner launch implies dev mode).
    pub dev: Option<bool>,
}

/// Errors surfaced by the bootstrap itself, before any subcommand runs.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("invalid value for --{flag}: {message}")]
    InvalidFlag { flag: &'static str, message: String },
}

/// Launcher owns the root command and the single application context.
///
/// Construction eagerly pre-parses the global `--dir` and `--dev` flags from
/// the raw argument list so the context is fully resolved before the normal
/// command-line execution dispatches to a subcommand.
#[derive(Debug)]
pub struct Launcher {
    app: BaseApp,
}

impl Launcher {
    /// Creates a launcher with defaults inferred from the launch mode.
    pub fn new() -> Result<Self, BootstrapError> {
        Self::with_config(LaunchConfig::default())
    }

    /// Creates a launcher seeded with the given config.
    pub fn with_config(config: LaunchConfig) -> Result<Self, BootstrapError> {
        Self::with_config_from(config, env::args_os())
    }

    /// Same as [`Launcher::with_config`], but reading an explicit argument
    /// vector so the bootstrap path stays testable.
    pub fn with_config_from<I, T>(config: LaunchConfig, argv: I) -> Result<Self, BootstrapError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let runtime = inspect_runtime();
        let default_data_dir = config
            .data_dir
            .unwrap_or_else(|| runtime.base_dir.join("data"));
        let default_dev = config.dev.unwrap_or(runtime.ephemeral_run);

        let (data_dir, is_dev) = eager_parse_flags(argv, default_data_dir, default_dev)?;

        instrumentation::tracing::init_tracing(is_dev);

        let app = BaseApp::new(BaseAppConfig { data_dir, is_dev });
        debug!(
            data_dir = %app.data_dir().display(),
            dev = app.is_dev(),
            ephemeral_run = runtime.ephemeral_run,
            "application context ready"
        );

        Ok(Self { app })
    }

    /// Returns the application context owned by the launcher.
    pub fn app(&self) -> &BaseApp {
        &self.app
    }

    /// Starts the application, aka. runs the system commands
    /// (serve, migrate, version) through [`Launcher::execute`].
    pub async fn start(&self) -> Result<()> {
        self.execute().await
    }

    /// Performs the full command-line parse and dispatches to the matched
    /// subcommand. Usage errors propagate to the caller for reporting
    /// through the colored error sink; `--help`/`--version` render to
    /// stdout and count as success.
    pub async fn execute(&self) -> Result<()> {
        self.execute_from(env::args_os()).await
    }

    /// Same as [`Launcher::execute`], but reading an explicit argument vector.
    pub async fn execute_from<I, T>(&self, argv: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => return handle_usage_error(err),
        };

        match cli.command {
            Some(Commands::Serve(args)) => cmd::serve::run(&self.app, args).await,
            Some(Commands::Migrate) => cmd::migrate::run(&self.app).await,
            Some(Commands::Version) => {
                cmd::version::run();
                Ok(())
            }
            None => {
                let mut root = Cli::command();
                root.print_help()?;
                Ok(())
            }
        }
    }
}

/// Parses the global app flags ahead of the full command-line parse, so the
/// application context is ready for use on initialization.
///
/// This is an incremental token scan rather than a full parse: tokens it
/// does not recognize (unknown flags, subcommand arguments) are skipped
/// over, values seen for `--dir`/`--dev` are kept no matter what surrounds
/// them, and `--` ends the scan. Full validation happens in `execute`. The
/// one error that escapes is a malformed boolean for `--dev`, since
/// silently flipping the launch mode would be worse than refusing to start.
fn eager_parse_flags<I, T>(
    argv: I,
    default_data_dir: PathBuf,
    default_dev: bool,
) -> Result<(PathBuf, bool), BootstrapError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let tokens: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    let mut data_dir = default_data_dir;
    let mut dev = default_dev;

    // tokens[0] is the program name
    let mut index = 1;
    while index < tokens.len() {
        match tokens[index].to_str() {
            Some("--") => break,
            Some("--dir") => {
                if let Some(value) = tokens.get(index + 1) {
                    data_dir = PathBuf::from(value);
                    index += 1;
                }
            }
            Some(token) if token.starts_with("--dir=") => {
                data_dir = PathBuf::from(&token["--dir=".len()..]);
            }
            Some("--dev") => dev = true,
            Some(token) if token.starts_with("--dev=") => {
                let value = &token["--dev=".len()..];
                dev = parse_bool(value).ok_or_else(|| BootstrapError::InvalidFlag {
                    flag: "dev",
                    message: format!("expected true or false, got {value:?}"),
                })?;
            }
            _ => {}
        }
        index += 1;
    }

    Ok((data_dir, dev))
}

/// Boolean syntax accepted for `--dev`, kept in sync with the full parser.
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn handle_usage_error(err: clap::Error) -> Result<()> {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            print!("{err}");
            Ok(())
        }
        _ => Err(err.into()),
    }
}
