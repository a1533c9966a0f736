//! External process renderer.
//!
//! Runs the rendering program once per job with a bounded timeout. The
//! program writes to a unique hidden staging file next to the tile; the
//! staging file is renamed onto the tile path only when the program reports
//! `200`, and removed in every other case. Readers therefore never observe a
//! partially written tile, even when a render is killed on timeout.
//!
//! The process exit status is not used to classify the outcome: only the
//! printed token counts. A non-zero exit is logged.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::fs;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::outcome::{
    parse_renderer_output, GenerationOutcome, DIAG_NO_OUTPUT, DIAG_TIMED_OUT, DIAG_UNAVAILABLE,
};
use super::{BoxFuture, RenderJob, TileRenderer};

/// Default upper bound on a single render.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(30);

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Renderer backed by an external program.
#[derive(Debug, Clone)]
pub struct ProcessRenderer {
    program: PathBuf,
    leading_args: Vec<String>,
    timeout: Duration,
}

impl ProcessRenderer {
    /// Create a renderer for `program` with the default timeout.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            timeout: DEFAULT_RENDER_TIMEOUT,
        }
    }

    /// Arguments placed before the five tile arguments (e.g. an interpreter script).
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the render timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the rendering program.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Render timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn run(&self, job: &RenderJob) -> GenerationOutcome {
        let start = Instant::now();
        let staging = staging_path(&job.paths.tile_path);

        if let Some(parent) = job.paths.tile_path.parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                warn!(
                    directory = %parent.display(),
                    error = %e,
                    "Failed to create tile directory"
                );
            }
        }

        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .arg(&job.paths.base_path)
            .arg(job.key.x().to_string())
            .arg(job.key.y().to_string())
            .arg(job.key.z().to_string())
            .arg(&staging)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(
                    program = %self.program.display(),
                    error = %e,
                    "Failed to launch renderer"
                );
                return GenerationOutcome::failed(DIAG_UNAVAILABLE);
            }
        };

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(tile = %job.key, error = %e, "Failed to collect renderer output");
                discard_staging(&staging).await;
                return GenerationOutcome::failed(format!("renderer i/o error: {}", e));
            }
            Err(_) => {
                warn!(
                    tile = %job.key,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Renderer timed out"
                );
                discard_staging(&staging).await;
                return GenerationOutcome::failed(DIAG_TIMED_OUT);
            }
        };

        if !output.status.success() {
            warn!(
                tile = %job.key,
                status = %output.status,
                "Renderer exited with non-zero status"
            );
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!(tile = %job.key, stderr = %stderr.trim(), "Renderer stderr");
        }

        let outcome = parse_renderer_output(&String::from_utf8_lossy(&output.stdout));
        let outcome = match outcome {
            GenerationOutcome::Generated => publish(&staging, &job.paths.tile_path).await,
            other => {
                discard_staging(&staging).await;
                other
            }
        };

        debug!(
            tile = %job.key,
            outcome = outcome.label(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Renderer finished"
        );

        outcome
    }
}

impl TileRenderer for ProcessRenderer {
    fn render<'a>(&'a self, job: &'a RenderJob) -> BoxFuture<'a, GenerationOutcome> {
        Box::pin(self.run(job))
    }
}

/// Hidden, process-unique sibling of the tile path.
fn staging_path(tile_path: &Path) -> PathBuf {
    let stem = tile_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tile".to_string());
    let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
    tile_path.with_file_name(format!(".{}.{}-{}.png", stem, std::process::id(), seq))
}

/// Move a finished render into place.
async fn publish(staging: &Path, tile_path: &Path) -> GenerationOutcome {
    match fs::rename(staging, tile_path).await {
        Ok(()) => GenerationOutcome::Generated,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(tile = %tile_path.display(), "Renderer reported success without writing output");
            GenerationOutcome::failed(DIAG_NO_OUTPUT)
        }
        Err(e) => {
            warn!(tile = %tile_path.display(), error = %e, "Failed to move rendered tile into place");
            discard_staging(staging).await;
            GenerationOutcome::failed(format!("failed to publish tile: {}", e))
        }
    }
}

async fn discard_staging(staging: &Path) {
    match fs::remove_file(staging).await {
        Ok(()) => debug!(path = %staging.display(), "Discarded staging file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %staging.display(), error = %e, "Failed to discard staging file"),
    }
}
