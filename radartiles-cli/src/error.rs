//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::io;
use std::process;

use radartiles::config::ConfigFileError;
use radartiles::service::ServiceError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be read or written
    Config(ConfigFileError),
    /// Failed to create the tile service
    ServiceCreation(ServiceError),
    /// Failed to build the async runtime
    Runtime(io::Error),
    /// HTTP server error
    Serve(io::Error),
    /// A single tile request ended with an error status
    TileRequest { status: u16 },
    /// Failed to write command output
    Output(io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::ServiceCreation(ServiceError::TileDirectory { .. }) => {
                eprintln!();
                eprintln!("Check that [paths] tile_prefix in the config file points to a");
                eprintln!("directory this user can create and write.");
            }
            CliError::Serve(e) if e.kind() == io::ErrorKind::AddrInUse => {
                eprintln!();
                eprintln!("Another process is listening on that address.");
                eprintln!("Use --listen or set [server] listen in the config file.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::ServiceCreation(e) => write!(f, "Failed to create service: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Serve(e) => write!(f, "HTTP server error: {}", e),
            CliError::TileRequest { status } => {
                write!(f, "Tile request failed with status {}", status)
            }
            CliError::Output(e) => write!(f, "Failed to write output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::ServiceCreation(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Serve(e) => Some(e),
            CliError::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        CliError::ServiceCreation(e)
    }
}
