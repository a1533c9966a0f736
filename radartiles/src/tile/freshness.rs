//! Cache freshness based on file modification times.
//!
//! A tile is fresh when it exists and was modified strictly after its
//! site's base file. Any update to the base file therefore invalidates
//! every tile of that site.
//!
//! Filesystems with whole-second timestamps report equal mtimes for a base
//! update and a render within the same second; the strict comparison then
//! classifies the tile as stale, which costs a render but never serves
//! outdated data.

use std::path::Path;
use std::time::SystemTime;

use super::CachePaths;

/// Cache state of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreshnessState {
    /// Tile exists and is newer than the base file.
    Hit,
    /// Tile is missing, stale, or could not be inspected.
    Miss,
}

impl FreshnessState {
    /// Returns true for [`FreshnessState::Hit`].
    pub fn is_hit(self) -> bool {
        self == FreshnessState::Hit
    }
}

/// Classify the cached tile for `paths`.
///
/// Never fails: a file that is missing or vanishes between calls is a miss.
pub fn check_freshness(paths: &CachePaths) -> FreshnessState {
    let Some(tile_mtime) = modified(&paths.tile_path) else {
        return FreshnessState::Miss;
    };
    let Some(base_mtime) = modified(&paths.base_path) else {
        return FreshnessState::Miss;
    };

    if tile_mtime > base_mtime {
        FreshnessState::Hit
    } else {
        FreshnessState::Miss
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
