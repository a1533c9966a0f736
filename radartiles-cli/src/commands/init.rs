//! Init command - write the default configuration file.

use std::path::Path;

use radartiles::config::ConfigFile;

use crate::error::CliError;
use crate::runner::resolve_config_path;

/// Run the init command.
pub fn run(config_path: Option<&Path>) -> Result<(), CliError> {
    let path = resolve_config_path(config_path);

    if ConfigFile::ensure_exists_at(&path)? {
        println!("Created configuration file: {}", path.display());
    } else {
        println!("Configuration file already exists: {}", path.display());
    }
    println!();
    println!("Edit [paths] and [renderer] to match this host before running `radartiles serve`.");
    Ok(())
}
