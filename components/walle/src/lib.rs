//! Walle is a command-line application launcher: it bootstraps an
//! application context from global flags and launch-mode inspection, then
//! dispatches to the registered subcommands (`serve`, `migrate`, `version`).
//!
//! The crate is structured as a library so embedders (and tests) can drive
//! the bootstrap without spawning the binary:
//!
//! - [`bootstrap`] owns the root command, the eager flag pre-parse and the
//!   subcommand dispatch;
//! - [`app`] defines the application context passed to every subcommand;
//! - [`cmd`] declares the subcommand surface and its defaulting policies;
//! - [`api`] hosts the web-server launcher consumed by `serve`.

pub mod api;
pub mod app;
pub mod bootstrap;
pub mod cmd;
pub mod helpers;
pub mod instrumentation;
