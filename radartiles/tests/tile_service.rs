//! Integration tests for the tile request flow.
//!
//! These tests drive `TileService` end to end:
//! - cache hits served without rendering
//! - renderer outcomes mapped onto responses (fake and real process renderers)
//! - many concurrent requests for one cold tile sharing a single render
//! - invalid input rejected before any rendering
//!
//! Run with: `cargo test --test tile_service`

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use filetime::FileTime;
use futures::future::join_all;
use tempfile::TempDir;
use tokio::sync::Semaphore;

use radartiles::renderer::{BoxFuture, GenerationOutcome, RenderJob, TileRenderer};
use radartiles::response::TileResponse;
use radartiles::service::TileService;
use radartiles::tile::{CacheLayout, TileKey, TileRequest};

// ============================================================================
// Helpers
// ============================================================================

/// Renderer that waits for a permit, then writes the tile when successful.
struct GatedRenderer {
    calls: AtomicUsize,
    gate: Semaphore,
    outcome: GenerationOutcome,
}

impl GatedRenderer {
    fn new(outcome: GenerationOutcome) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            gate: Semaphore::new(0),
            outcome,
        })
    }

    /// A renderer that never blocks.
    fn open(outcome: GenerationOutcome) -> Arc<Self> {
        let renderer = Self::new(outcome);
        renderer.gate.add_permits(1024);
        renderer
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TileRenderer for GatedRenderer {
    fn render<'a>(&'a self, job: &'a RenderJob) -> BoxFuture<'a, GenerationOutcome> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _permit = self.gate.acquire().await.unwrap();
            if self.outcome.is_generated() {
                std::fs::write(&job.paths.tile_path, b"PNG").unwrap();
            }
            self.outcome.clone()
        })
    }
}

struct Site {
    dir: TempDir,
    layout: CacheLayout,
}

impl Site {
    /// Base file for KTLX present with an old mtime, tile directory empty.
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let layout = CacheLayout::new(dir.path().join("base"), dir.path().join("tiles"));
        std::fs::create_dir_all(layout.base_prefix()).unwrap();
        std::fs::create_dir_all(layout.tile_prefix()).unwrap();
        let base = layout.base_prefix().join("KTLX.base");
        std::fs::write(&base, b"base").unwrap();
        set_mtime(&base, 1_000);
        Self { dir, layout }
    }

    fn service(&self, renderer: Arc<dyn TileRenderer>) -> TileService {
        TileService::with_renderer(self.layout.clone(), renderer, false)
    }

    fn tile_path(&self) -> std::path::PathBuf {
        self.layout.tile_prefix().join("KTLX_5_10-12.png")
    }
}

fn set_mtime(path: &Path, secs: i64) {
    filetime::set_file_mtime(path, FileTime::from_unix_time(secs, 0)).unwrap();
}

fn request() -> TileRequest {
    TileRequest::new("KTLX", "10", "12", "5")
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_fresh_tile_is_served_from_cache() {
    let site = Site::new();
    std::fs::write(site.tile_path(), b"PNG").unwrap();
    set_mtime(&site.tile_path(), 2_000);
    let renderer = GatedRenderer::open(GenerationOutcome::Generated);
    let service = site.service(renderer.clone());

    let response = service.handle(&request()).await;

    assert_eq!(response.status, 200);
    let expected = site.tile_path().to_string_lossy().into_owned();
    assert_eq!(response.header("X-Sendfile"), Some(expected.as_str()));
    assert!(expected.ends_with("KTLX_5_10-12.png"));
    assert_eq!(response.header("Content-Type"), Some("image/png"));
    assert_eq!(response.header("X-Radar-Status"), Some("cached"));
    assert_eq!(renderer.calls(), 0);
}

#[tokio::test]
async fn test_missing_tile_is_generated() {
    let site = Site::new();
    let renderer = GatedRenderer::open(GenerationOutcome::Generated);
    let service = site.service(renderer.clone());

    let response = service.handle(&request()).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.header("X-Radar-Status"), Some("generated"));
    assert!(site.tile_path().exists());
    assert_eq!(renderer.calls(), 1);
}

#[tokio::test]
async fn test_stale_tile_is_regenerated() {
    let site = Site::new();
    std::fs::write(site.tile_path(), b"OLD").unwrap();
    set_mtime(&site.tile_path(), 500);
    let renderer = GatedRenderer::open(GenerationOutcome::Generated);
    let service = site.service(renderer.clone());

    let response = service.handle(&request()).await;

    assert_eq!(response.header("X-Radar-Status"), Some("generated"));
    assert_eq!(std::fs::read(site.tile_path()).unwrap(), b"PNG");
    assert_eq!(renderer.calls(), 1);
}

#[tokio::test]
async fn test_no_coverage_is_not_cached() {
    let site = Site::new();
    let renderer = GatedRenderer::open(GenerationOutcome::NoCoverage);
    let service = site.service(renderer.clone());

    let first = service.handle(&request()).await;
    let second = service.handle(&request()).await;

    assert_eq!(first.status, 404);
    assert_eq!(first.header("X-Radar-Status"), Some("no-coverage"));
    assert!(first.body.is_empty());
    assert_eq!(first, second);
    assert_eq!(renderer.calls(), 2);
}

#[tokio::test]
async fn test_failure_body_is_diagnostic() {
    let site = Site::new();
    let renderer = GatedRenderer::open(GenerationOutcome::failed("Error: out of memory"));
    let service = site.service(renderer);

    let response = service.handle(&request()).await;

    assert_eq!(response.status, 500);
    assert_eq!(response.body, "Error: out of memory");
    assert!(response.headers.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fifty_concurrent_requests_share_one_render() {
    let site = Site::new();
    let renderer = GatedRenderer::new(GenerationOutcome::Generated);
    let service = Arc::new(site.service(renderer.clone()));

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.handle(&request()).await })
        })
        .collect();

    while service.coordinator().stats().total_requests < 50 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    renderer.gate.add_permits(64);

    let responses: Vec<TileResponse> = join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(renderer.calls(), 1);
    assert_eq!(responses.len(), 50);
    assert!(responses.iter().all(|r| r == &responses[0]));
    assert_eq!(responses[0].header("X-Radar-Status"), Some("generated"));

    let stats = service.coordinator().stats();
    assert_eq!(stats.new_requests, 1);
    assert_eq!(stats.coalesced_requests, 49);
    assert_eq!(service.coordinator().in_flight_count(), 0);
}

#[tokio::test]
async fn test_invalid_requests_are_rejected_without_rendering() {
    let site = Site::new();
    let renderer = GatedRenderer::open(GenerationOutcome::Generated);
    let service = site.service(renderer.clone());

    let invalid = [
        TileRequest::new("XXXX", "10", "12", "5"),
        TileRequest::new("Kabc", "10", "12", "5"),
        TileRequest::new("KTLXX", "10", "12", "5"),
        TileRequest::new("KTLX", "abc", "12", "5"),
        TileRequest::new("KTLX", "10", "1.5e3", "5"),
        TileRequest::new("KTLX", "10", "12", ""),
    ];

    for request in &invalid {
        let response = service.handle(request).await;
        assert_eq!(response, TileResponse::invalid_request(), "{:?}", request);
    }

    assert_eq!(renderer.calls(), 0);
    assert_eq!(service.coordinator().stats().total_requests, 0);
    assert_eq!(std::fs::read_dir(site.layout.tile_prefix()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_next_request_retries_after_failure() {
    let site = Site::new();
    let renderer = GatedRenderer::open(GenerationOutcome::failed("transient"));
    let service = site.service(renderer.clone());

    service.handle(&request()).await;
    service.handle(&request()).await;

    assert_eq!(renderer.calls(), 2);
    assert_eq!(service.coordinator().in_flight_count(), 0);
}

#[tokio::test]
async fn test_typed_entry_point_matches_raw_request() {
    let site = Site::new();
    let service = site.service(GatedRenderer::open(GenerationOutcome::NoCoverage));
    let key = TileKey::new("KTLX", 5, 10, 12).unwrap();

    let typed = service.resolve(&key).await;
    let raw = service.handle(&request()).await;

    assert_eq!(typed, raw);
}

// ============================================================================
// External program
// ============================================================================

#[cfg(unix)]
mod process {
    use super::*;
    use radartiles::renderer::ProcessRenderer;

    fn script_renderer(site: &Site, body: &str) -> Arc<ProcessRenderer> {
        let script = site.dir.path().join("gen-one.sh");
        std::fs::write(&script, body).unwrap();
        Arc::new(ProcessRenderer::new("/bin/sh").with_args([script.to_string_lossy().into_owned()]))
    }

    #[tokio::test]
    async fn test_program_generates_tile() {
        let site = Site::new();
        let service = site.service(script_renderer(&site, "printf 'PNG' > \"$5\"\necho 200\n"));

        let response = service.handle(&request()).await;

        assert_eq!(response.status, 200);
        assert_eq!(response.header("X-Radar-Status"), Some("generated"));
        assert_eq!(std::fs::read(site.tile_path()).unwrap(), b"PNG");

        let again = service.handle(&request()).await;
        assert_eq!(again.header("X-Radar-Status"), Some("cached"));
    }

    #[tokio::test]
    async fn test_program_reports_no_coverage() {
        let site = Site::new();
        let service = site.service(script_renderer(&site, "echo 404\n"));

        let response = service.handle(&request()).await;

        assert_eq!(response.status, 404);
        assert_eq!(response.header("X-Radar-Status"), Some("no-coverage"));
        assert!(!site.tile_path().exists());
    }

    #[tokio::test]
    async fn test_program_diagnostic_is_returned() {
        let site = Site::new();
        let service = site.service(script_renderer(&site, "echo 'Error: out of memory'\n"));

        let response = service.handle(&request()).await;

        assert_eq!(response.status, 500);
        assert_eq!(response.body, "Error: out of memory");
    }

    #[tokio::test]
    async fn test_program_success_without_output_is_an_error() {
        let site = Site::new();
        let service = site.service(script_renderer(&site, "echo 200\n"));

        let response = service.handle(&request()).await;

        assert_eq!(response.status, 500);
        assert_eq!(
            response.body,
            "renderer reported success but produced no output"
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let site = Site::new();
        let renderer = Arc::new(ProcessRenderer::new(site.dir.path().join("no-such-program")));
        let service = site.service(renderer);

        let response = service.handle(&request()).await;

        assert_eq!(response.status, 500);
        assert_eq!(response.body, "renderer unavailable");
    }
}
