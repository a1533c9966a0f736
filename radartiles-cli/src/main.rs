//! radartiles CLI - Command-line interface
//!
//! Runs the HTTP front end for the radar tile cache and offers one-off
//! tools for operating it.

mod commands;
mod error;
mod http;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::serve::ServeArgs;
use commands::tile::TileArgs;

#[derive(Parser)]
#[command(name = "radartiles")]
#[command(version, about = "On-demand radar tile cache", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.radartiles/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve tiles over HTTP
    ///
    /// Answers `/tile?site=&x=&y=&z=` and `/tile/{site}/{z}/{x}/{y}` with an
    /// X-Sendfile directive for the fronting proxy.
    Serve(ServeArgs),

    /// Resolve one tile and print the response
    Tile(TileArgs),

    /// Write the default configuration file if none exists
    Init,
}

fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::run(args, config),
        Commands::Tile(args) => commands::tile::run(args, config),
        Commands::Init => commands::init::run(config),
    };

    if let Err(e) = result {
        e.exit();
    }
}
