//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Base file and tile cache locations
    pub paths: PathsSettings,
    /// Rendering program settings
    pub renderer: RendererSettings,
    /// Generation coordination settings
    pub coordinator: CoordinatorSettings,
    /// HTTP server settings
    pub server: ServerSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Filesystem layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsSettings {
    /// Directory holding `<site>.base` files
    pub base_prefix: PathBuf,
    /// Directory holding rendered `<site>_<z>_<x>-<y>.png` tiles
    pub tile_prefix: PathBuf,
}

/// Rendering program configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererSettings {
    /// Path to the rendering program
    pub program: PathBuf,
    /// Extra arguments placed before the tile arguments
    pub args: Vec<String>,
    /// Timeout in seconds for a single render
    pub timeout: u64,
}

/// Generation coordination configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorSettings {
    /// Hold an advisory lock file per tile while rendering (multi-process deployments)
    pub file_lock: bool,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Address the server listens on
    pub listen: SocketAddr,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Directory for log files
    pub directory: PathBuf,
    /// Log file name
    pub file: String,
}
