//! Stockroom server binary
//!
//! Reads configuration from `STOCKROOM_CONFIG` (YAML) and the environment,
//! seeds the stores, then serves the API until Ctrl+C or SIGTERM.

use anyhow::Result;
use stockroom::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    let addr = config.server.address();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        address = %addr,
        seed_items = config.seed.items.len(),
        "starting stockroom"
    );

    ServerBuilder::from_config(&config).serve(&addr).await
}
