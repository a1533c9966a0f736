//! Service error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while constructing a [`super::TileService`].
///
/// Per-request problems never surface here; they are part of the
/// [`crate::response::TileResponse`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The tile cache directory could not be created
    #[error("Cannot create tile directory {}: {source}", path.display())]
    TileDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_directory_display() {
        let err = ServiceError::TileDirectory {
            path: PathBuf::from("/srv/tiles"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        let msg = err.to_string();
        assert!(msg.contains("/srv/tiles"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_config_display() {
        let err = ServiceError::Config("render timeout must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: render timeout must be positive"
        );
    }
}
