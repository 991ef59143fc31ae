//! Two-tier demo stack.
//!
//! One binary, two services:
//!
//! ```text
//!   platform-demo data-service   JSON over PostgreSQL   (/health /ready /data /footballClub)
//!   platform-demo gateway        proxy to data-service  (/health /ready / /clubs)
//! ```
//!
//! Configuration comes from an optional TOML file (`--config`) overlaid with
//! environment variables (`DB_HOST`, `BACKEND_BASE_URL`, `REQUEST_TIMEOUT`, ...).

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use platform_demo::config::{load_config, StackConfig};
use platform_demo::data_service::{DataServer, PgCatalogStore};
use platform_demo::gateway::GatewayServer;
use platform_demo::lifecycle::{signals, Shutdown};
use platform_demo::observability::logging;

#[derive(Parser)]
#[command(name = "platform-demo", version)]
#[command(about = "Data service and gateway for the platform demo", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; environment variables override it.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the items and football clubs tables as JSON
    DataService,
    /// Proxy browser requests to the data service
    Gateway,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "platform-demo starting");

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        trigger.trigger();
    });

    match cli.command {
        Commands::DataService => run_data_service(config, &shutdown).await?,
        Commands::Gateway => run_gateway(config, &shutdown).await?,
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn run_data_service(
    config: StackConfig,
    shutdown: &Shutdown,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(database = ?config.database, "Configuration loaded");

    let store = PgCatalogStore::connect(&config.database).await?;
    let server = DataServer::new(&config, Arc::new(store));

    let listener = TcpListener::bind(&config.data_service.bind_address).await?;
    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}

async fn run_gateway(
    config: StackConfig,
    shutdown: &Shutdown,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        backend_url = %config.gateway.backend_base_url,
        request_timeout_secs = config.gateway.request_timeout_secs,
        max_attempts = config.retries.max_attempts,
        "Configuration loaded"
    );

    let server = GatewayServer::new(&config)?;

    let listener = TcpListener::bind(&config.gateway.bind_address).await?;
    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
