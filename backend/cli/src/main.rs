mod config;
mod history_cmd;
mod output;
mod status_cmd;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use specscan_gateway::{start_server, GatewayState, SpecPipeline};
use specscan_inference::HttpInferenceClient;
use specscan_logging::{init_console_logger, init_logger};
use specscan_store::SqlitePredictionStore;

use config::Config;

#[derive(Parser)]
#[command(name = "specscan")]
#[command(about = "specscan: extract product specifications from package photos")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the upload gateway
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Check the gateway and the inference service
    Status,
    /// Show the most recent stored predictions
    History {
        /// Number of records to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    match &config.log_dir {
        Some(dir) => init_logger(dir, &config.log_level),
        None => init_console_logger(&config.log_level),
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                ..config
            };
            run_server(config).await?;
        }
        Commands::Status => status_cmd::run(&config).await?,
        Commands::History { limit } => history_cmd::run(&config, limit).await?,
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        db = %config.database_url,
        inference = %config.inference.endpoint(),
        timeout_secs = config.inference.timeout.as_secs(),
        "Starting specscan"
    );

    let store = SqlitePredictionStore::connect(&config.database_url)?;
    let inference =
        HttpInferenceClient::new(&config.inference).context("Failed to build inference client")?;

    let gateway = config.gateway_config();
    let pipeline = SpecPipeline::new(
        Arc::new(inference),
        Arc::new(store),
        gateway.inference_timeout,
    );

    let addr = config.socket_addr()?;
    start_server(addr, GatewayState::new(pipeline), &gateway).await
}
