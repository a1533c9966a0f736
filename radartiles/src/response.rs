//! Mapping of tile results onto the HTTP response contract.
//!
//! | Condition         | Status | Headers                                          | Body        |
//! |-------------------|--------|--------------------------------------------------|-------------|
//! | Invalid input     | 400    |                                                  | empty       |
//! | Cache hit         | 200    | `X-Sendfile`, `Content-Type`, `X-Radar-Status: cached`    | delegated |
//! | Generated         | 200    | `X-Sendfile`, `Content-Type`, `X-Radar-Status: generated` | delegated |
//! | No coverage       | 404    | `X-Radar-Status: no-coverage`                    | empty       |
//! | Failure           | 500    |                                                  | diagnostic  |
//!
//! Successful responses never carry tile bytes; the front end streams the
//! file named by `X-Sendfile`.

use crate::renderer::GenerationOutcome;
use crate::tile::{CachePaths, TileError};

/// Header naming the file the front end should stream.
pub const SENDFILE_HEADER: &str = "X-Sendfile";

/// Header reporting how the tile was obtained.
pub const STATUS_HEADER: &str = "X-Radar-Status";

/// Content type of every tile.
pub const TILE_CONTENT_TYPE: &str = "image/png";

/// Description of the response to send for a tile request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers in emission order.
    pub headers: Vec<(&'static str, String)>,
    /// Response body; empty unless the request failed.
    pub body: String,
}

impl TileResponse {
    /// 400 for a request that failed validation.
    pub fn invalid_request() -> Self {
        Self::empty(400)
    }

    /// 200 for a fresh cached tile.
    pub fn cached(paths: &CachePaths) -> Self {
        Self::sendfile(paths, "cached")
    }

    /// Response for the outcome of a generation attempt.
    pub fn from_outcome(outcome: &GenerationOutcome, paths: &CachePaths) -> Self {
        match outcome {
            GenerationOutcome::Generated => Self::sendfile(paths, "generated"),
            GenerationOutcome::NoCoverage => Self {
                status: 404,
                headers: vec![(STATUS_HEADER, "no-coverage".to_string())],
                body: String::new(),
            },
            GenerationOutcome::Failed(diagnostic) => {
                Self::from_error(&TileError::from_diagnostic(diagnostic))
            }
        }
    }

    /// Response for a request that ended in an error.
    pub fn from_error(error: &TileError) -> Self {
        match error {
            TileError::InvalidRequest(_) => Self::invalid_request(),
            TileError::RendererFailure(_) | TileError::FilesystemInconsistency => Self {
                status: error.status(),
                headers: Vec::new(),
                body: error.to_string(),
            },
        }
    }

    /// Look up a header value (case-insensitive name).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    fn sendfile(paths: &CachePaths, how: &str) -> Self {
        Self {
            status: 200,
            headers: vec![
                (
                    SENDFILE_HEADER,
                    paths.tile_path.to_string_lossy().into_owned(),
                ),
                ("Content-Type", TILE_CONTENT_TYPE.to_string()),
                (STATUS_HEADER, how.to_string()),
            ],
            body: String::new(),
        }
    }
}
