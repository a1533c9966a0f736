//! Generation coordination for cold tiles.
//!
//! When many requests arrive for the same uncached tile, only one render
//! runs; every other request waits for that render and receives the same
//! [`GenerationOutcome`].
//!
//! # Architecture
//!
//! ```text
//! Request A ─┐                                    spawned task
//!            │                                  ┌──────────────┐
//! Request B ─┼──► registry (one lock) ──owner──►│ TileRenderer │
//!            │        │                         └──────┬───────┘
//! Request C ─┘        │ waiters subscribe              │ publish
//!                     ▼                                ▼
//!               [A, B, C all receive the same outcome via broadcast]
//! ```
//!
//! # Implementation
//!
//! The registry maps each in-flight [`TileKey`] to a broadcast sender. The
//! lookup-or-insert is a single critical section; the render itself runs in
//! a spawned task outside any lock, so slow renders never block unrelated
//! tiles. Because the render is spawned, a requester going away does not
//! cancel a generation other requests are waiting on.
//!
//! The spawned task owns an [`InFlightGuard`]. Publishing through the guard
//! removes the registry entry and then broadcasts; if the task ends any
//! other way (panic, runtime shutdown) the guard's `Drop` publishes
//! [`DIAG_ABORTED`] so later requests can retry.
//!
//! A request can see a stale tile, then register just after the previous
//! owner removed its entry. The owner therefore re-checks freshness before
//! rendering and reports [`GenerationOutcome::Generated`] without invoking
//! the renderer when the tile is already fresh.
//!
//! # Cross-process lock
//!
//! With [`GenerationCoordinator::with_file_lock`] the render also holds an
//! exclusive lock on `<tile>.lock`. Caveats:
//! - a tile produced by another process while this one waited is reported
//!   as `Generated`, so the response says `generated` although this process
//!   rendered nothing
//! - lock files are never removed (deleting them would race with processes
//!   blocked on the old inode), so the tile directory holds one `.lock` file
//!   per tile ever rendered

mod file_lock;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::renderer::{
    GenerationOutcome, RenderJob, TileRenderer, DIAG_ABORTED, DIAG_NO_OUTPUT,
};
use crate::tile::{check_freshness, TileKey};
use file_lock::TileFileLock;

/// Statistics for monitoring coalescing effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    /// Total generation requests received
    pub total_requests: u64,
    /// Requests that waited on an existing generation
    pub coalesced_requests: u64,
    /// Requests that started a generation
    pub new_requests: u64,
}

impl CoordinatorStats {
    /// Returns the coalescing ratio (0.0 to 1.0)
    pub fn coalescing_ratio(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.coalesced_requests as f64 / self.total_requests as f64
        }
    }
}

#[derive(Default)]
struct Registry {
    in_flight: HashMap<TileKey, broadcast::Sender<GenerationOutcome>>,
    stats: CoordinatorStats,
}

/// Serializes generation per tile key.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct GenerationCoordinator {
    renderer: Arc<dyn TileRenderer>,
    registry: Arc<Mutex<Registry>>,
    file_lock: bool,
}

/// Role assigned to a request by the registry.
enum Registration {
    /// First request for the key; must start the generation.
    Owner(
        broadcast::Sender<GenerationOutcome>,
        broadcast::Receiver<GenerationOutcome>,
    ),
    /// A generation is already running; wait for it.
    Waiter(broadcast::Receiver<GenerationOutcome>),
}

impl GenerationCoordinator {
    /// Create a coordinator that renders with `renderer`.
    pub fn new(renderer: Arc<dyn TileRenderer>) -> Self {
        Self {
            renderer,
            registry: Arc::new(Mutex::new(Registry::default())),
            file_lock: false,
        }
    }

    /// Also hold an advisory file lock per tile while rendering.
    ///
    /// Needed when several independent processes share one tile directory;
    /// the in-memory registry only covers this process.
    pub fn with_file_lock(mut self, enabled: bool) -> Self {
        self.file_lock = enabled;
        self
    }

    /// Obtain the outcome of generating `job.key`.
    ///
    /// Starts a render if none is running for the key, otherwise waits for
    /// the running one. A `Generated` outcome is re-checked against the
    /// filesystem before it is returned.
    pub async fn obtain(&self, job: RenderJob) -> GenerationOutcome {
        let mut rx = match self.register(&job.key) {
            Registration::Owner(tx, rx) => {
                self.spawn_generation(job.clone(), tx);
                rx
            }
            Registration::Waiter(rx) => rx,
        };

        let outcome = match rx.recv().await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(tile = %job.key, error = %e, "Generation channel closed without a result");
                GenerationOutcome::failed(DIAG_ABORTED)
            }
        };

        if outcome.is_generated() && !job.paths.tile_path.exists() {
            warn!(
                tile = %job.key,
                path = %job.paths.tile_path.display(),
                "Generated tile missing on disk"
            );
            return GenerationOutcome::failed(DIAG_NO_OUTPUT);
        }

        outcome
    }

    /// Returns a snapshot of the current statistics.
    pub fn stats(&self) -> CoordinatorStats {
        self.registry.lock().stats
    }

    /// Returns the number of tiles currently being generated.
    pub fn in_flight_count(&self) -> usize {
        self.registry.lock().in_flight.len()
    }

    /// Logs current statistics.
    pub fn log_stats(&self) {
        let registry = self.registry.lock();
        let stats = registry.stats;

        info!(
            total_requests = stats.total_requests,
            coalesced = stats.coalesced_requests,
            new_requests = stats.new_requests,
            in_flight = registry.in_flight.len(),
            coalescing_ratio = format!("{:.1}%", stats.coalescing_ratio() * 100.0),
            "Generation coalescing statistics"
        );
    }

    /// Atomic lookup-or-insert for `key`.
    fn register(&self, key: &TileKey) -> Registration {
        let mut guard = self.registry.lock();
        let registry = &mut *guard;
        registry.stats.total_requests += 1;

        if let Some(tx) = registry.in_flight.get(key) {
            let rx = tx.subscribe();
            registry.stats.coalesced_requests += 1;
            debug!(
                tile = %key,
                waiters = tx.receiver_count(),
                "Coalescing request - waiting for in-flight generation"
            );
            Registration::Waiter(rx)
        } else {
            // One message is ever sent per channel.
            let (tx, rx) = broadcast::channel(1);
            registry.in_flight.insert(key.clone(), tx.clone());
            registry.stats.new_requests += 1;
            debug!(
                tile = %key,
                in_flight_count = registry.in_flight.len(),
                "New generation - starting render"
            );
            Registration::Owner(tx, rx)
        }
    }

    fn spawn_generation(&self, job: RenderJob, sender: broadcast::Sender<GenerationOutcome>) {
        let guard = InFlightGuard {
            registry: Arc::clone(&self.registry),
            key: job.key.clone(),
            sender: Some(sender),
        };
        let renderer = Arc::clone(&self.renderer);
        let file_lock = self.file_lock;

        tokio::spawn(async move {
            let mut guard = guard;
            let start = Instant::now();

            let outcome = if file_lock {
                render_exclusive(renderer.as_ref(), &job).await
            } else {
                render_if_stale(renderer.as_ref(), &job).await
            };

            info!(
                tile = %job.key,
                outcome = outcome.label(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Generation complete"
            );

            guard.publish(outcome);
        });
    }
}

/// Render while holding the tile's cross-process lock.
///
/// Another process may have produced the tile while this one waited for
/// the lock; in that case the render is skipped.
async fn render_exclusive(renderer: &dyn TileRenderer, job: &RenderJob) -> GenerationOutcome {
    let lock_path = job.paths.lock_path();
    let _lock = match TileFileLock::acquire(lock_path.clone()).await {
        Ok(lock) => lock,
        Err(e) => {
            warn!(
                tile = %job.key,
                path = %lock_path.display(),
                error = %e,
                "Failed to acquire tile lock"
            );
            return GenerationOutcome::failed(format!("failed to lock tile: {}", e));
        }
    };

    render_if_stale(renderer, job).await
}

/// Render unless the tile became fresh since the caller checked it.
async fn render_if_stale(renderer: &dyn TileRenderer, job: &RenderJob) -> GenerationOutcome {
    if check_freshness(&job.paths).is_hit() {
        debug!(tile = %job.key, "Tile already fresh, skipping render");
        return GenerationOutcome::Generated;
    }

    renderer.render(job).await
}

/// Ownership of one registry entry.
///
/// Guarantees the entry is removed and waiters are released exactly once.
struct InFlightGuard {
    registry: Arc<Mutex<Registry>>,
    key: TileKey,
    sender: Option<broadcast::Sender<GenerationOutcome>>,
}

impl InFlightGuard {
    fn publish(&mut self, outcome: GenerationOutcome) {
        let Some(sender) = self.sender.take() else {
            return;
        };

        // Remove before sending: anyone who subscribed did so under the lock,
        // i.e. before this removal, and will see the message.
        self.registry.lock().in_flight.remove(&self.key);

        let waiters = sender.receiver_count();
        if sender.send(outcome).is_err() {
            debug!(tile = %self.key, "No requests left waiting for generation");
        } else {
            debug!(tile = %self.key, waiters, "Broadcast outcome to waiters");
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.sender.is_some() {
            warn!(tile = %self.key, "Generation ended without an outcome");
            self.publish(GenerationOutcome::failed(DIAG_ABORTED));
        }
    }
}
