//! Load orchestrator - reads the intermediate CSV files and inserts them in batches

use anyhow::{Context, Result};
use fdc_import::ingestion::{load, sink};
use fdc_import::LoadConfig;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    info!("Starting FDC load pipeline");

    // Load configuration before touching the network
    dotenvy::dotenv().ok();
    let config = LoadConfig::from_env().context("Invalid load configuration")?;
    info!("Configuration loaded (batch size {})", config.batch_size);

    let target = sink::connect(&config.target)
        .await
        .context("Failed to set up database target")?;
    info!("Database target ready");

    match load::load_all(target.as_ref(), &config.data_dir, config.batch_size).await {
        Ok(stats) => {
            info!("✓ Data import complete: {}", stats);
            Ok(())
        }
        Err(e) => {
            error!("✗ Data import failed: {}", e);
            Err(e.into())
        }
    }
}
