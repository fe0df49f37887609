// Local crates
use crate::app::app::App;

// External crates
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Errors raised by the migration runner.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("failed to prepare data directory {path}: {source}")]
    DataDir { path: PathBuf, source: io::Error },
}

/// Applies the migrations that have not yet run against the data directory
/// and returns how many were applied.
///
/// The registry is currently empty; the runner still makes sure the data
/// directory exists so future migrations (and the settings store) have a
/// place to write. Any failure aborts the caller before traffic is served.
pub async fn run_pending(app: &dyn App) -> Result<usize, MigrateError> {
    let data_dir = app.data_dir().to_path_buf();

    tokio::fs::create_dir_all(&data_dir)
        .await
        .map_err(|source| MigrateError::DataDir {
            path: data_dir.clone(),
            source,
        })?;

    debug!(data_dir = %data_dir.display(), "no pending migrations");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::base::{BaseApp, BaseAppConfig};

    #[tokio::test]
    async fn run_pending_creates_the_data_directory() {
        let root = tempfile::tempdir().expect("tempdir");
        let data_dir = root.path().join("data");
        let app = BaseApp::new(BaseAppConfig {
            data_dir: data_dir.clone(),
            is_dev: true,
        });

        let applied = run_pending(&app).await.expect("runner should succeed");

        assert_eq!(applied, 0);
        assert!(data_dir.is_dir());
    }
}
