//! SigmaPips Signal Bot
//!
//! Runs the subscription bot and the signal fan-out HTTP API in one process.

use dotenvy::dotenv;
use sigmapips::config::{get_environment, Config};
use sigmapips::core::ServiceRuntime;
use sigmapips::logging;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    info!("Starting SigmaPips Signal Bot");
    info!(environment = %get_environment(), "Environment");
    info!(port = config.port, "HTTP Server: http://0.0.0.0:{}", config.port);

    let runtime = ServiceRuntime::from_config(&config).await?;
    runtime.run().await?;

    Ok(())
}
