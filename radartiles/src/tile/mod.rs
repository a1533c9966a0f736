//! Tile identity, cache layout and freshness.
//!
//! - [`key`] turns raw query strings into a validated [`TileKey`]
//! - [`paths`] maps a key onto the base file and tile cache file
//! - [`freshness`] decides whether the cached tile can be served as-is

mod error;
mod freshness;
mod key;
mod paths;

pub use error::TileError;
pub use freshness::{check_freshness, FreshnessState};
pub use key::{TileKey, TileRequest, ValidationError};
pub use paths::{CacheLayout, CachePaths};
