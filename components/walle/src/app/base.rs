// Local crates
use crate::app::app::App;

// External crates
use std::path::{Path, PathBuf};
use tracing::Span;

/// BaseApp implements [`App`] and defines the default app structure.
///
/// Created once at process bootstrap and immutable afterwards.
#[derive(Debug)]
pub struct BaseApp {
    // configurable parameters
    data_dir: PathBuf,
    is_dev: bool,

    // internals
    logger: Span,
}

/// BaseAppConfig defines the [`BaseApp`] configuration options.
#[derive(Debug, Clone, Default)]
pub struct BaseAppConfig {
    pub data_dir: PathBuf,
    pub is_dev: bool,
}

impl BaseApp {
    /// Creates a new `BaseApp` instance.
    ///
    /// The logger span is constructed eagerly here, so concurrent tasks can
    /// never race a first-access initialization.
    pub fn new(config: BaseAppConfig) -> Self {
        let logger = tracing::info_span!(
            "app",
            data_dir = %config.data_dir.display(),
            dev = config.is_dev,
        );

        Self {
            data_dir: config.data_dir,
            is_dev: config.is_dev,
            logger,
        }
    }
}

impl App for BaseApp {
    fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn is_dev(&self) -> bool {
        self.is_dev
    }

    fn logger(&self) -> &Span {
        &self.logger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_base_app_keeps_configured_values() {
        let app = BaseApp::new(BaseAppConfig {
            data_dir: PathBuf::from("./base_app_test_data_dir"),
            is_dev: true,
        });

        assert_eq!(app.data_dir(), Path::new("./base_app_test_data_dir"));
        assert!(app.is_dev());
    }

    #[test]
    fn construction_is_deterministic() {
        let config = BaseAppConfig {
            data_dir: PathBuf::from("/tmp/walle_data"),
            is_dev: false,
        };

        let first = BaseApp::new(config.clone());
        let second = BaseApp::new(config);

        assert_eq!(first.data_dir(), second.data_dir());
        assert_eq!(first.is_dev(), second.is_dev());
    }
}
