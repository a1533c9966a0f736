//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and service creation
//! so command handlers stay small.

use std::path::{Path, PathBuf};

use radartiles::config::{config_file_path, ConfigFile};
use radartiles::logging::{init_logging, LoggingGuard};
use radartiles::service::{ServiceConfig, TileService};
use tracing::info;

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
    /// Where the configuration was loaded from
    config_path: PathBuf,
}

impl CliRunner {
    /// Load the configuration and initialize logging.
    ///
    /// `config_path` overrides `~/.radartiles/config.ini`. A missing file
    /// means defaults.
    pub fn new(config_path: Option<&Path>) -> Result<Self, CliError> {
        let config_path = resolve_config_path(config_path);
        let config = ConfigFile::load_from(&config_path)?;

        let logging_guard = init_logging(&config.logging.directory, &config.logging.file)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            config_path,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("radartiles v{}", radartiles::VERSION);
        info!(
            config = %self.config_path.display(),
            "radartiles CLI: {} command", command
        );
    }

    /// Create the tile service from the loaded configuration.
    pub fn create_service(&self) -> Result<TileService, CliError> {
        let config = ServiceConfig::from_config_file(&self.config);
        TileService::new(config).map_err(CliError::ServiceCreation)
    }
}

/// The config file to use: the override if given, else the default location.
pub fn resolve_config_path(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path)
}
