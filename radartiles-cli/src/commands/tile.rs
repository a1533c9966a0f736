//! Tile command - resolve one tile and print the response.

use std::io::{self, Write};
use std::path::Path;

use clap::Args;
use radartiles::response::TileResponse;
use radartiles::tile::TileRequest;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for `radartiles tile`.
///
/// Values are passed through unvalidated so the command reports exactly
/// what the HTTP front end would.
#[derive(Debug, Args)]
pub struct TileArgs {
    /// Radar site code (e.g. KTLX)
    #[arg(long)]
    pub site: String,

    /// Tile column
    #[arg(long, allow_hyphen_values = true)]
    pub x: String,

    /// Tile row
    #[arg(long, allow_hyphen_values = true)]
    pub y: String,

    /// Zoom level
    #[arg(long, allow_hyphen_values = true)]
    pub z: String,
}

/// Run the tile command.
///
/// Succeeds for 2xx and 404 (no coverage is a normal answer).
pub fn run(args: TileArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path)?;
    runner.log_startup("tile");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let request = TileRequest::new(args.site, args.x, args.y, args.z);
    let response = runtime.block_on(async {
        let service = runner.create_service()?;
        Ok::<_, CliError>(service.handle(&request).await)
    })?;

    print_response(&mut io::stdout().lock(), &response)?;

    if response.is_success() || response.status == 404 {
        Ok(())
    } else {
        Err(CliError::TileRequest {
            status: response.status,
        })
    }
}

/// Write the response, tolerating a reader that closed the pipe early
/// (e.g. `radartiles tile ... | head -1`).
fn print_response(out: &mut impl Write, response: &TileResponse) -> Result<(), CliError> {
    match write_response(out, response).and_then(|()| out.flush()) {
        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(CliError::Output(e)),
        _ => Ok(()),
    }
}

/// Print a response in HTTP-like form: status line, headers, blank line, body.
fn write_response(out: &mut impl Write, response: &TileResponse) -> io::Result<()> {
    writeln!(out, "Status: {}", response.status)?;
    for (name, value) in &response.headers {
        writeln!(out, "{}: {}", name, value)?;
    }
    if !response.body.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", response.body)?;
    }
    Ok(())
}
