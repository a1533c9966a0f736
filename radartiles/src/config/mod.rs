//! Configuration file handling for `~/.radartiles/config.ini`.
//!
//! - [`settings`] holds one struct per INI section
//! - [`defaults`] holds the `DEFAULT_*` constants and `ConfigFile::default()`
//! - parsing and serialization live in private `parser` / `writer` modules
//!
//! # Example
//!
//! ```
//! use radartiles::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! assert_eq!(config.renderer.timeout, radartiles::config::DEFAULT_RENDER_TIMEOUT_SECS);
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, CoordinatorSettings, LoggingSettings, PathsSettings, RendererSettings,
    ServerSettings,
};
