//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [paths] section
    if let Some(section) = ini.section(Some("paths")) {
        if let Some(v) = non_empty(section.get("base_prefix")) {
            config.paths.base_prefix = expand_tilde(v);
        }
        if let Some(v) = non_empty(section.get("tile_prefix")) {
            config.paths.tile_prefix = expand_tilde(v);
        }
    }

    // [renderer] section
    if let Some(section) = ini.section(Some("renderer")) {
        if let Some(v) = non_empty(section.get("program")) {
            config.renderer.program = expand_tilde(v);
        }
        if let Some(v) = section.get("args") {
            config.renderer.args = v.split_whitespace().map(str::to_string).collect();
        }
        if let Some(v) = section.get("timeout") {
            config.renderer.timeout = match v.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(invalid(
                        "renderer",
                        "timeout",
                        v,
                        "must be a positive number of seconds",
                    ))
                }
            };
        }
    }

    // [coordinator] section
    if let Some(section) = ini.section(Some("coordinator")) {
        if let Some(v) = section.get("file_lock") {
            config.coordinator.file_lock = parse_bool(v)
                .ok_or_else(|| invalid("coordinator", "file_lock", v, "expected true or false"))?;
        }
    }

    // [server] section
    if let Some(section) = ini.section(Some("server")) {
        if let Some(v) = section.get("listen") {
            config.server.listen = v.trim().parse().map_err(|_| {
                invalid("server", "listen", v, "expected address like '127.0.0.1:8080'")
            })?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section.get("directory")) {
            config.logging.directory = expand_tilde(v);
        }
        if let Some(v) = non_empty(section.get("file")) {
            if v.contains('/') {
                return Err(invalid("logging", "file", v, "must be a file name, not a path"));
            }
            config.logging.file = v.to_string();
        }
    }

    Ok(config)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a boolean config value.
pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
