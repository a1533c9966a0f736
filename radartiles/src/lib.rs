//! radartiles - On-demand radar tile cache
//!
//! This library sits between an HTTP front end and an external tile
//! rendering program. Each request names a radar site and a tile
//! coordinate; the library validates it, serves the cached PNG when it is
//! newer than the site's base data file, and otherwise asks the renderer to
//! produce it. Concurrent requests for the same cold tile share a single
//! render.
//!
//! # Architecture
//!
//! ```text
//! TileRequest ──► TileKey ──► CachePaths ──► Freshness ──Hit──────────────┐
//!  (raw query)   (validated)                     │                        │
//!                                               Miss                      ▼
//!                                                │                  TileResponse
//!                                                ▼                        ▲
//!                                   GenerationCoordinator ──► TileRenderer┘
//!                                   (one render per key)      (gen-one process)
//! ```
//!
//! Tile bytes are never read here: successful responses carry an
//! `X-Sendfile` directive for the front end.

pub mod config;
pub mod coordinator;
pub mod logging;
pub mod renderer;
pub mod response;
pub mod service;
pub mod tile;

/// Crate version, reported by the CLI at startup.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
