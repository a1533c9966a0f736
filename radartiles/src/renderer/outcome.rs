//! Render outcomes and renderer output parsing.

use crate::tile::TileError;

/// Diagnostic for a render that exceeded its time budget.
pub const DIAG_TIMED_OUT: &str = "generation timed out";

/// Diagnostic for a renderer program that could not be launched.
pub const DIAG_UNAVAILABLE: &str = "renderer unavailable";

/// Diagnostic for a reported success without a tile file on disk.
pub const DIAG_NO_OUTPUT: &str = "renderer reported success but produced no output";

/// Diagnostic for a generation task that ended without publishing a result.
pub const DIAG_ABORTED: &str = "generation aborted";

/// Terminal result of one generation attempt.
///
/// Every request that shared the attempt observes the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The tile was rendered and is in the cache.
    Generated,
    /// The tile lies outside the radar's coverage; nothing was written.
    NoCoverage,
    /// The attempt failed; the diagnostic is human-readable.
    Failed(String),
}

impl GenerationOutcome {
    /// Create a failure outcome.
    pub fn failed(diagnostic: impl Into<String>) -> Self {
        GenerationOutcome::Failed(diagnostic.into())
    }

    /// Returns true if the tile is available after this outcome.
    pub fn is_generated(&self) -> bool {
        matches!(self, GenerationOutcome::Generated)
    }

    /// Error for a failed outcome, `None` otherwise.
    pub fn error(&self) -> Option<TileError> {
        match self {
            GenerationOutcome::Failed(diagnostic) => Some(TileError::from_diagnostic(diagnostic)),
            GenerationOutcome::Generated | GenerationOutcome::NoCoverage => None,
        }
    }

    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            GenerationOutcome::Generated => "generated",
            GenerationOutcome::NoCoverage => "no-coverage",
            GenerationOutcome::Failed(_) => "failed",
        }
    }
}

/// Interpret the renderer's standard output.
///
/// Surrounding whitespace is trimmed, then the token is compared exactly:
/// `200` means generated, `404` means no coverage, and anything else
/// (including empty output) is returned verbatim as a failure diagnostic.
pub fn parse_renderer_output(output: &str) -> GenerationOutcome {
    match output.trim() {
        "200" => GenerationOutcome::Generated,
        "404" => GenerationOutcome::NoCoverage,
        other => GenerationOutcome::Failed(other.to_string()),
    }
}
