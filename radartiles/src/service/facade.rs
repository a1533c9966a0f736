//! Tile service facade.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::config::ServiceConfig;
use super::error::ServiceError;
use crate::coordinator::GenerationCoordinator;
use crate::renderer::{ProcessRenderer, RenderJob, TileRenderer};
use crate::response::TileResponse;
use crate::tile::{check_freshness, CacheLayout, TileError, TileKey, TileRequest};

/// Entry point for tile requests.
///
/// One instance lives for the lifetime of the process; its coordinator is
/// the registry every request for a cold tile goes through.
pub struct TileService {
    layout: CacheLayout,
    coordinator: GenerationCoordinator,
}

impl TileService {
    /// Create a service that renders with an external program.
    ///
    /// Creates the tile directory if it does not exist. A missing base
    /// directory is only warned about; requests for its sites fail until
    /// base files appear.
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        if config.render_timeout().is_zero() {
            return Err(ServiceError::Config(
                "render timeout must be positive".to_string(),
            ));
        }

        std::fs::create_dir_all(config.tile_prefix()).map_err(|source| {
            ServiceError::TileDirectory {
                path: config.tile_prefix().to_path_buf(),
                source,
            }
        })?;

        if !config.base_prefix().is_dir() {
            warn!(
                path = %config.base_prefix().display(),
                "Base file directory does not exist"
            );
        }

        let renderer = ProcessRenderer::new(config.renderer_program())
            .with_args(config.renderer_args().iter().cloned())
            .with_timeout(config.render_timeout());

        info!(
            base_prefix = %config.base_prefix().display(),
            tile_prefix = %config.tile_prefix().display(),
            renderer = %config.renderer_program().display(),
            timeout_secs = config.render_timeout().as_secs(),
            file_lock = config.file_lock(),
            "Tile service ready"
        );

        Ok(Self::with_renderer(
            config.layout(),
            Arc::new(renderer),
            config.file_lock(),
        ))
    }

    /// Create a service around any renderer.
    ///
    /// Performs no filesystem access.
    pub fn with_renderer(
        layout: CacheLayout,
        renderer: Arc<dyn TileRenderer>,
        file_lock: bool,
    ) -> Self {
        Self {
            layout,
            coordinator: GenerationCoordinator::new(renderer).with_file_lock(file_lock),
        }
    }

    /// Handle a raw request.
    ///
    /// Invalid input is answered with 400 before any filesystem or process
    /// access.
    pub async fn handle(&self, request: &TileRequest) -> TileResponse {
        match TileKey::parse(request).map_err(TileError::from) {
            Ok(key) => self.resolve(&key).await,
            Err(e) => {
                debug!(error = %e, "Rejected tile request");
                TileResponse::from_error(&e)
            }
        }
    }

    /// Serve or generate the tile for an already validated key.
    pub async fn resolve(&self, key: &TileKey) -> TileResponse {
        let paths = self.layout.resolve(key);

        if check_freshness(&paths).is_hit() {
            debug!(tile = %key, "Cache hit");
            return TileResponse::cached(&paths);
        }

        debug!(tile = %key, "Cache miss");
        let start = Instant::now();
        let outcome = self
            .coordinator
            .obtain(RenderJob::new(key.clone(), paths.clone()))
            .await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome.error() {
            Some(error) => {
                warn!(
                    site = key.site(),
                    z = key.z(),
                    x = key.x(),
                    y = key.y(),
                    duration_ms,
                    status = error.status(),
                    error = %error,
                    "Tile generation failed"
                );
                TileResponse::from_error(&error)
            }
            None => {
                debug!(
                    tile = %key,
                    outcome = outcome.label(),
                    duration_ms,
                    "Tile request resolved"
                );
                TileResponse::from_outcome(&outcome, &paths)
            }
        }
    }

    /// Cache layout in use.
    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    /// The generation coordinator, for statistics.
    pub fn coordinator(&self) -> &GenerationCoordinator {
        &self.coordinator
    }
}
