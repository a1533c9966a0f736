//! Default values and constants for all configuration settings.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;

/// Default directory for site base files.
pub const DEFAULT_BASE_PREFIX: &str = "/var/lib/radartiles/basefiles";

/// Default directory for rendered tiles.
pub const DEFAULT_TILE_PREFIX: &str = "/var/cache/radartiles/tiles";

/// Default rendering program.
pub const DEFAULT_RENDERER_PROGRAM: &str = "/usr/local/bin/gen-one";

/// Default render timeout in seconds.
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 30;

/// Default HTTP listen port.
pub const DEFAULT_LISTEN_PORT: u16 = 8080;

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "radartiles.log";

/// Default listen address (loopback; the front end proxies to it).
pub fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_LISTEN_PORT))
}

/// Default log directory (`~/.radartiles/logs`).
pub fn default_log_directory() -> PathBuf {
    config_directory().join("logs")
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            paths: PathsSettings {
                base_prefix: PathBuf::from(DEFAULT_BASE_PREFIX),
                tile_prefix: PathBuf::from(DEFAULT_TILE_PREFIX),
            },
            renderer: RendererSettings {
                program: PathBuf::from(DEFAULT_RENDERER_PROGRAM),
                args: Vec::new(),
                timeout: DEFAULT_RENDER_TIMEOUT_SECS,
            },
            coordinator: CoordinatorSettings { file_lock: false },
            server: ServerSettings {
                listen: default_listen_addr(),
            },
            logging: LoggingSettings {
                directory: default_log_directory(),
                file: DEFAULT_LOG_FILE.to_string(),
            },
        }
    }
}
