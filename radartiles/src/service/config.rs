//! Service configuration types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{
    ConfigFile, DEFAULT_BASE_PREFIX, DEFAULT_RENDERER_PROGRAM, DEFAULT_RENDER_TIMEOUT_SECS,
    DEFAULT_TILE_PREFIX,
};
use crate::tile::CacheLayout;

/// Configuration for the tile service.
///
/// # Example
///
/// ```
/// use radartiles::service::ServiceConfig;
/// use std::time::Duration;
///
/// let config = ServiceConfig::builder()
///     .tile_prefix("/srv/tiles")
///     .render_timeout(Duration::from_secs(10))
///     .file_lock(true)
///     .build();
///
/// assert!(config.file_lock());
/// assert_eq!(config.render_timeout(), Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    base_prefix: PathBuf,
    tile_prefix: PathBuf,
    renderer_program: PathBuf,
    renderer_args: Vec<String>,
    render_timeout: Duration,
    file_lock: bool,
}

impl ServiceConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Build the service configuration from a loaded config file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        Self::builder()
            .base_prefix(config.paths.base_prefix.clone())
            .tile_prefix(config.paths.tile_prefix.clone())
            .renderer_program(config.renderer.program.clone())
            .renderer_args(config.renderer.args.clone())
            .render_timeout(Duration::from_secs(config.renderer.timeout))
            .file_lock(config.coordinator.file_lock)
            .build()
    }

    /// Directory holding `<site>.base` files.
    pub fn base_prefix(&self) -> &Path {
        &self.base_prefix
    }

    /// Directory holding rendered tiles.
    pub fn tile_prefix(&self) -> &Path {
        &self.tile_prefix
    }

    /// Rendering program.
    pub fn renderer_program(&self) -> &Path {
        &self.renderer_program
    }

    /// Extra arguments placed before the tile arguments.
    pub fn renderer_args(&self) -> &[String] {
        &self.renderer_args
    }

    /// Upper bound on a single render.
    pub fn render_timeout(&self) -> Duration {
        self.render_timeout
    }

    /// Whether renders also hold a per-tile lock file.
    pub fn file_lock(&self) -> bool {
        self.file_lock
    }

    /// Cache layout for these prefixes.
    pub fn layout(&self) -> CacheLayout {
        CacheLayout::new(self.base_prefix.clone(), self.tile_prefix.clone())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for ServiceConfig.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfigBuilder {
    base_prefix: Option<PathBuf>,
    tile_prefix: Option<PathBuf>,
    renderer_program: Option<PathBuf>,
    renderer_args: Option<Vec<String>>,
    render_timeout: Option<Duration>,
    file_lock: Option<bool>,
}

impl ServiceConfigBuilder {
    /// Set the base file directory.
    pub fn base_prefix(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_prefix = Some(path.into());
        self
    }

    /// Set the tile cache directory.
    pub fn tile_prefix(mut self, path: impl Into<PathBuf>) -> Self {
        self.tile_prefix = Some(path.into());
        self
    }

    /// Set the rendering program.
    pub fn renderer_program(mut self, path: impl Into<PathBuf>) -> Self {
        self.renderer_program = Some(path.into());
        self
    }

    /// Set extra leading arguments for the rendering program.
    pub fn renderer_args(mut self, args: Vec<String>) -> Self {
        self.renderer_args = Some(args);
        self
    }

    /// Set the render timeout.
    pub fn render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = Some(timeout);
        self
    }

    /// Enable or disable the per-tile lock file.
    pub fn file_lock(mut self, enabled: bool) -> Self {
        self.file_lock = Some(enabled);
        self
    }

    /// Build the configuration, filling unset values with defaults.
    pub fn build(self) -> ServiceConfig {
        ServiceConfig {
            base_prefix: self
                .base_prefix
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_PREFIX)),
            tile_prefix: self
                .tile_prefix
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TILE_PREFIX)),
            renderer_program: self
                .renderer_program
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RENDERER_PROGRAM)),
            renderer_args: self.renderer_args.unwrap_or_default(),
            render_timeout: self
                .render_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_RENDER_TIMEOUT_SECS)),
            file_lock: self.file_lock.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.base_prefix(), Path::new(DEFAULT_BASE_PREFIX));
        assert_eq!(config.tile_prefix(), Path::new(DEFAULT_TILE_PREFIX));
        assert_eq!(config.renderer_program(), Path::new(DEFAULT_RENDERER_PROGRAM));
        assert!(config.renderer_args().is_empty());
        assert_eq!(
            config.render_timeout(),
            Duration::from_secs(DEFAULT_RENDER_TIMEOUT_SECS)
        );
        assert!(!config.file_lock());
    }

    #[test]
    fn test_from_config_file() {
        let mut file = ConfigFile::default();
        file.paths.base_prefix = PathBuf::from("/data/base");
        file.paths.tile_prefix = PathBuf::from("/data/tiles");
        file.renderer.args = vec!["-v".to_string()];
        file.renderer.timeout = 7;
        file.coordinator.file_lock = true;

        let config = ServiceConfig::from_config_file(&file);

        assert_eq!(config.base_prefix(), Path::new("/data/base"));
        assert_eq!(config.tile_prefix(), Path::new("/data/tiles"));
        assert_eq!(config.renderer_args(), ["-v".to_string()]);
        assert_eq!(config.render_timeout(), Duration::from_secs(7));
        assert!(config.file_lock());
    }

    #[test]
    fn test_layout_uses_prefixes() {
        let config = ServiceConfig::builder()
            .base_prefix("/b")
            .tile_prefix("/t")
            .build();
        let layout = config.layout();
        assert_eq!(layout.base_prefix(), Path::new("/b"));
        assert_eq!(layout.tile_prefix(), Path::new("/t"));
    }
}
