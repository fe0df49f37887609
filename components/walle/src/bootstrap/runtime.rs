// External crates
use std::env;
use std::path::{Path, PathBuf};

/// How the current process was launched and where its base directory lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInfo {
    /// Directory the executable considers its home: the binary's parent
    /// directory for a built-binary launch, the working directory for an
    /// ephemeral source-runner launch.
    pub base_dir: PathBuf,

    /// True when the process was staged by a source-level runner
    /// (the executable path sits under the platform temp directory).
    pub ephemeral_run: bool,
}

/// Tries to find the base executable directory and how the process was run.
///
/// Never fails: resolution problems degrade to an empty path so the caller
/// can still fall back to sensible defaults.
pub fn inspect_runtime() -> RuntimeInfo {
    let argv0 = env::args_os().next().map(PathBuf::from).unwrap_or_default();
    let cwd = env::current_dir().unwrap_or_default();

    classify(&argv0, &env::temp_dir(), &cwd)
}

/// Pure launch-mode classification, split out of [`inspect_runtime`] so the
/// policy is testable without touching real process state.
pub fn classify(argv0: &Path, temp_dir: &Path, cwd: &Path) -> RuntimeInfo {
    if !temp_dir.as_os_str().is_empty() && argv0.starts_with(temp_dir) {
        // probably staged by a source runner
        RuntimeInfo {
            base_dir: cwd.to_path_buf(),
            ephemeral_run: true,
        }
    } else {
        // probably a built binary
        RuntimeInfo {
            base_dir: argv0.parent().map(Path::to_path_buf).unwrap_or_default(),
            ephemeral_run: false,
        }
    }
}
