//! Fetch orchestrator - pages through FDC, flattens, writes the intermediate CSV files

use anyhow::{Context, Result};
use fdc_import::ingestion::fetch::FdcClient;
use fdc_import::ingestion::utils::http_client;
use fdc_import::ingestion::{parse, write, FetchStats};
use fdc_import::FetchConfig;
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

    info!("Starting FDC fetch pipeline");

    // Load configuration before touching the network
    dotenvy::dotenv().ok();
    let config = FetchConfig::from_env().context("Invalid fetch configuration")?;
    info!("Configuration loaded");

    match run_fetch(&config).await {
        Ok(stats) => {
            info!("✓ Fetch completed: {}", stats);
            Ok(())
        }
        Err(e) => {
            error!("✗ Fetch failed: {:#}", e);
            Err(e)
        }
    }
}

async fn run_fetch(config: &FetchConfig) -> Result<FetchStats> {
    let client = FdcClient::new(
        http_client()?,
        &config.base_url,
        &config.api_key,
        config.data_types.clone(),
    );

    // Step 1: Fetch raw pages
    info!("Step 1/3: Fetching food data from FDC...");
    let (foods, pages) = client
        .fetch_all(config.page_limit, config.page_size)
        .await
        .context("Failed to fetch food listing")?;
    info!("✓ Fetched {} foods", foods.len());

    // Step 2: Flatten into rows
    info!("Step 2/3: Processing data...");
    let data = parse::flatten_foods(&foods);
    info!("✓ Flattened {} foods", data.foods.len());

    // Step 3: Write intermediate files
    info!("Step 3/3: Writing CSV files to {:?}...", config.data_dir);
    let paths = write::write_all(&config.data_dir, &data).context("Failed to write CSV files")?;
    for path in &paths {
        info!("✓ Wrote {:?}", path);
    }

    Ok(FetchStats {
        pages,
        foods: data.foods.len(),
        portions: data.portions.len(),
        nutrients: data.nutrients.len(),
    })
}
