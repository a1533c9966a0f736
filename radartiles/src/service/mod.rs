//! High-level service facade for tile requests.
//!
//! [`TileService`] owns the cache layout and the generation coordinator and
//! runs the whole request flow: validate, resolve paths, check freshness,
//! coordinate generation, map to a response.
//!
//! # Example
//!
//! ```ignore
//! use radartiles::service::{ServiceConfig, TileService};
//! use radartiles::tile::TileRequest;
//!
//! let config = ServiceConfig::builder()
//!     .base_prefix("/var/lib/radartiles/basefiles")
//!     .tile_prefix("/var/cache/radartiles/tiles")
//!     .renderer_program("/usr/local/bin/gen-one")
//!     .build();
//!
//! let service = TileService::new(config)?;
//! let response = service.handle(&TileRequest::new("KTLX", "10", "12", "5")).await;
//! ```

mod config;
mod error;
mod facade;

pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use error::ServiceError;
pub use facade::TileService;
