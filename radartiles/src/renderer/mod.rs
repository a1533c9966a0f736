//! Rendering collaborator abstraction.
//!
//! The `TileRenderer` trait is the narrow capability the rest of the crate
//! depends on: render one tile and report a [`GenerationOutcome`]. The
//! production implementation is [`ProcessRenderer`], which shells out to a
//! `gen-one` style program; tests substitute in-memory fakes.
//!
//! # Collaborator contract
//!
//! The program is invoked as `<program> <base_path> <x> <y> <z> <output>`.
//! On success it writes a PNG to `<output>` and prints `200`. When the tile
//! lies outside the radar's coverage it prints `404` and writes nothing.
//! Anything else on standard output is a failure diagnostic.

mod outcome;
mod process;

pub use outcome::{
    parse_renderer_output, GenerationOutcome, DIAG_ABORTED, DIAG_NO_OUTPUT, DIAG_TIMED_OUT,
    DIAG_UNAVAILABLE,
};
pub use process::{ProcessRenderer, DEFAULT_RENDER_TIMEOUT};

use std::future::Future;
use std::pin::Pin;

use crate::tile::{CachePaths, TileKey};

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One unit of rendering work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    /// Tile being rendered.
    pub key: TileKey,
    /// Where the base data lives and where the tile must end up.
    pub paths: CachePaths,
}

impl RenderJob {
    /// Create a job for `key` with its resolved paths.
    pub fn new(key: TileKey, paths: CachePaths) -> Self {
        Self { key, paths }
    }
}

/// Trait for tile rendering strategies.
///
/// Implementations must be thread-safe (`Send + Sync`) since renders for
/// unrelated tiles run concurrently. A successful render must leave a
/// complete file at `job.paths.tile_path`; partial output must never be
/// visible at that path.
///
/// Renderers report every failure as [`GenerationOutcome::Failed`] rather
/// than panicking or returning an error type.
pub trait TileRenderer: Send + Sync {
    /// Render the tile described by `job`.
    fn render<'a>(&'a self, job: &'a RenderJob) -> BoxFuture<'a, GenerationOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::CacheLayout;
    use std::sync::Arc;

    /// Renderer that always returns a fixed outcome.
    struct FixedRenderer(GenerationOutcome);

    impl TileRenderer for FixedRenderer {
        fn render<'a>(&'a self, _job: &'a RenderJob) -> BoxFuture<'a, GenerationOutcome> {
            Box::pin(async move { self.0.clone() })
        }
    }

    fn job() -> RenderJob {
        let key = TileKey::new("KTLX", 5, 10, 12).unwrap();
        let paths = CacheLayout::new("/base", "/tiles").resolve(&key);
        RenderJob::new(key, paths)
    }

    #[tokio::test]
    async fn test_trait_object_render() {
        let renderer: Arc<dyn TileRenderer> = Arc::new(FixedRenderer(GenerationOutcome::NoCoverage));
        let outcome = renderer.render(&job()).await;
        assert_eq!(outcome, GenerationOutcome::NoCoverage);
    }

    #[test]
    fn test_trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn TileRenderer>();
    }
}
