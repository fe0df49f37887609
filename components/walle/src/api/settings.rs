// Local crates
use crate::app::app::App;

// External crates
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

const SETTINGS_FILE: &str = "settings.json";

/// Persisted application settings, reloaded from the data directory before
/// the server starts accepting traffic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Display name of the application, surfaced in startup logs.
    pub app_name: String,

    /// Public URL of the application, if one has been configured.
    pub app_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "Walle".to_string(),
            app_url: None,
        }
    }
}

/// Errors raised while reloading the persisted settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("malformed settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Reloads the settings stored under the app data directory.
///
/// A missing file is not an error; the defaults apply until something is
/// persisted. A present but unreadable or malformed file aborts the caller,
/// matching the run-to-completion-or-fail contract of the pre-serve steps.
pub async fn reload(app: &dyn App) -> Result<Settings, SettingsError> {
    let path = app.data_dir().join(SETTINGS_FILE);

    let raw = match tokio::fs::read(&path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no persisted settings, using defaults");
            return Ok(Settings::default());
        }
        Err(source) => return Err(SettingsError::Read { path, source }),
    };

    let settings = serde_json::from_slice(&raw)
        .map_err(|source| SettingsError::Parse { path: path.clone(), source })?;

    debug!(path = %path.display(), "persisted settings reloaded");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::base::{BaseApp, BaseAppConfig};

    fn test_app(data_dir: PathBuf) -> BaseApp {
        BaseApp::new(BaseAppConfig {
            data_dir,
            is_dev: true,
        })
    }

    #[tokio::test]
    async fn missing_settings_file_yields_defaults() {
        let root = tempfile::tempdir().expect("tempdir");
        let app = test_app(root.path().to_path_buf());

        let settings = reload(&app).await.expect("reload should succeed");

        assert_eq!(settings.app_name, "Walle");
        assert_eq!(settings.app_url, None);
    }

    #[tokio::test]
    async fn persisted_settings_are_loaded() {
        let root = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            root.path().join(SETTINGS_FILE),
            r#"{"app_name":"Acme","app_url":"https://acme.test"}"#,
        )
        .expect("write settings");
        let app = test_app(root.path().to_path_buf());

        let settings = reload(&app).await.expect("reload should succeed");

        assert_eq!(settings.app_name, "Acme");
        assert_eq!(settings.app_url.as_deref(), Some("https://acme.test"));
    }

    #[tokio::test]
    async fn malformed_settings_abort_the_reload() {
        let root = tempfile::tempdir().expect("tempdir");
        std::fs::write(root.path().join(SETTINGS_FILE), b"{not json")
            .expect("write settings");
        let app = test_app(root.path().to_path_buf());

        let err = reload(&app).await.expect_err("reload should fail");
        assert!(matches!(err, SettingsError::Parse { .. }));
    }
}
