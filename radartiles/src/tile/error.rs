//! Error taxonomy for tile requests.

use thiserror::Error;

use super::ValidationError;
use crate::renderer::DIAG_NO_OUTPUT;

/// Errors that end a tile request without a tile.
///
/// A tile outside the radar's coverage is not an error; it is reported as
/// [`GenerationOutcome::NoCoverage`](crate::renderer::GenerationOutcome::NoCoverage).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    /// Malformed input. Never reaches the filesystem or the renderer.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// The renderer failed, timed out, or could not be launched.
    /// The diagnostic is passed through verbatim.
    #[error("{0}")]
    RendererFailure(String),

    /// The renderer reported success but the tile file does not exist.
    #[error("renderer reported success but produced no output")]
    FilesystemInconsistency,
}

impl TileError {
    /// Classify the diagnostic of a failed generation.
    pub fn from_diagnostic(diagnostic: &str) -> Self {
        if diagnostic == DIAG_NO_OUTPUT {
            TileError::FilesystemInconsistency
        } else {
            TileError::RendererFailure(diagnostic.to_string())
        }
    }

    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            TileError::InvalidRequest(_) => 400,
            TileError::RendererFailure(_) | TileError::FilesystemInconsistency => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let invalid = TileError::from(ValidationError::InvalidSite("XXXX".to_string()));
        assert_eq!(invalid.status(), 400);
        assert_eq!(TileError::RendererFailure("boom".to_string()).status(), 500);
        assert_eq!(TileError::FilesystemInconsistency.status(), 500);
    }

    #[test]
    fn test_from_diagnostic() {
        assert_eq!(
            TileError::from_diagnostic(DIAG_NO_OUTPUT),
            TileError::FilesystemInconsistency
        );
        assert_eq!(
            TileError::from_diagnostic("generation timed out"),
            TileError::RendererFailure("generation timed out".to_string())
        );
    }

    #[test]
    fn test_renderer_failure_display_is_verbatim() {
        let err = TileError::RendererFailure("Error: out of memory".to_string());
        assert_eq!(err.to_string(), "Error: out of memory");
    }

    #[test]
    fn test_invalid_request_display() {
        let err = TileError::from(ValidationError::InvalidSite("Kabc".to_string()));
        assert!(err.to_string().contains("Kabc"));
    }
}
