// External crates
use std::path::Path;
use tracing::Span;

/// App defines the capability set every application implementation exposes
/// to the command layer.
///
/// Subcommands receive the context by shared reference and must not extend
/// its lifetime beyond command execution. Test doubles implement this trait
/// to run commands against a synthetic context.
pub trait App {
    /// Returns the app data directory path.
    ///
    /// Guaranteed non-empty once bootstrap completes; the launcher falls
    /// back to `<base dir>/data` when no `--dir` override is given.
    fn data_dir(&self) -> &Path;

    /// Returns whether the app is running in dev mode.
    fn is_dev(&self) -> bool;

    /// Returns the active app logger span.
    ///
    /// All diagnostics emitted on behalf of the application attach to this
    /// span, so log lines carry the resolved data directory and dev flag.
    fn logger(&self) -> &Span;
}
