//! INI serialization logic for converting `ConfigFile` → INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[paths]
; Directory holding one <site>.base file per radar site
base_prefix = {}
; Directory receiving rendered <site>_<z>_<x>-<y>.png tiles
tile_prefix = {}

[renderer]
; Program invoked as: <program> [args] <basefile> <x> <y> <z> <outfile>
; It must print 200 (tile written) or 404 (no coverage) on stdout
program = {}
; Extra arguments placed before the tile arguments (whitespace separated)
args = {}
; Seconds before a render is abandoned
timeout = {}

[coordinator]
; Hold a <tile>.lock file while rendering so several server processes
; sharing one tile directory never render the same tile twice
file_lock = {}

[server]
; Address for `radartiles serve`
listen = {}

[logging]
directory = {}
file = {}
"#,
        path_to_string(&config.paths.base_prefix),
        path_to_string(&config.paths.tile_prefix),
        path_to_string(&config.renderer.program),
        config.renderer.args.join(" "),
        config.renderer.timeout,
        config.coordinator.file_lock,
        config.server.listen,
        path_to_string(&config.logging.directory),
        config.logging.file,
    )
}

/// Render a path for the config file, abbreviating the home directory to `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
