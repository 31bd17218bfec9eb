use anyhow::Context;
use tracing_subscriber::EnvFilter;

use cartuner_api::{config, is_development, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up JWT_SECRET, PARTITION_TABLE_PATH, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Cartuner API in {:?} mode", config.environment);

    if is_development!() && config.security.jwt_secret == config::DEFAULT_JWT_SECRET {
        tracing::warn!("using the development JWT secret; set JWT_SECRET outside local development");
    }

    server::serve(config).await.context("cartuner api failed")
}
