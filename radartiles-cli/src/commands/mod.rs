//! CLI command implementations.
//!
//! - [`init`] - Configuration initialization
//! - [`serve`] - HTTP front end
//! - [`tile`] - Resolve a single tile from the command line

pub mod init;
pub mod serve;
pub mod tile;
