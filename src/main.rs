use clap::Parser;
use graceful_server::config::Cli;
use graceful_server::logging;
use graceful_server::server::{GracefulServer, OsInterrupt};
use tracing::error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = Cli::parse().into_config();

    let server = match GracefulServer::new(config).bind().await {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "HTTP server failed");
            return Err(e.into());
        }
    };

    // Registered after the listener exists so shutdown never precedes serving
    let interrupt = OsInterrupt::install()?;

    if let Err(e) = server.run(interrupt).await {
        error!(error = %e, "HTTP server failed");
        return Err(e.into());
    }
    Ok(())
}
