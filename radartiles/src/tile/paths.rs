//! Filesystem layout of base data files and cached tiles.
//!
//! ```text
//! <base_prefix>/<site>.base
//! <tile_prefix>/<site>_<z>_<x>-<y>.png
//! ```

use std::path::{Path, PathBuf};

use super::TileKey;

/// Base data and tile cache locations for one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    /// Source data file shared by every tile of the site.
    pub base_path: PathBuf,
    /// Rendered PNG for this tile.
    pub tile_path: PathBuf,
}

impl CachePaths {
    /// Advisory lock file used when generation is coordinated across processes.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .tile_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.tile_path.with_file_name(name)
    }
}

/// Directory prefixes for base files and tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
    base_prefix: PathBuf,
    tile_prefix: PathBuf,
}

impl CacheLayout {
    /// Create a layout from the two directory prefixes.
    pub fn new(base_prefix: impl Into<PathBuf>, tile_prefix: impl Into<PathBuf>) -> Self {
        Self {
            base_prefix: base_prefix.into(),
            tile_prefix: tile_prefix.into(),
        }
    }

    /// Directory holding `<site>.base` files.
    pub fn base_prefix(&self) -> &Path {
        &self.base_prefix
    }

    /// Directory holding rendered tiles.
    pub fn tile_prefix(&self) -> &Path {
        &self.tile_prefix
    }

    /// Resolve the paths for a tile. Pure and deterministic.
    pub fn resolve(&self, key: &TileKey) -> CachePaths {
        CachePaths {
            base_path: self.base_prefix.join(format!("{}.base", key.site())),
            tile_path: self.tile_prefix.join(format!(
                "{}_{}_{}-{}.png",
                key.site(),
                key.z(),
                key.x(),
                key.y()
            )),
        }
    }
}
