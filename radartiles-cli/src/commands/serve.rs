//! Serve command - run the HTTP front end.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::CliError;
use crate::http;
use crate::runner::CliRunner;

/// Arguments for `radartiles serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides [server] listen)
    #[arg(long)]
    pub listen: Option<SocketAddr>,
}

/// Run the serve command.
pub fn run(args: ServeArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path)?;
    runner.log_startup("serve");

    let listen = args.listen.unwrap_or(runner.config().server.listen);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let service = Arc::new(runner.create_service()?);

    let shutdown = CancellationToken::new();
    let shutdown_handler = shutdown.clone();
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Received shutdown signal, stopping server...");
        shutdown_handler.cancel();
    })
    .map_err(|e| CliError::Serve(std::io::Error::other(e.to_string())))?;

    let app = http::router(Arc::clone(&service));

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(listen)
            .await
            .map_err(CliError::Serve)?;
        info!(listen = %listen, "Listening for tile requests");
        println!("Serving tiles on http://{}/tile", listen);
        println!("Press Ctrl+C to stop");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await
            .map_err(CliError::Serve)
    })?;

    service.coordinator().log_stats();
    info!("Server stopped");
    Ok(())
}
