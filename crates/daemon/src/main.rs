use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skinpress_core::{
    load_config, validate_config, CutTemplates, FulfillmentOrchestrator, Hotfolder, HttpAcquirer,
    Ledger, PrintComposer, RestShopClient, ShopClient, SqliteLedger,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("SKINPRESS_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("skinpress {} starting", VERSION);
    info!("Shop: {}", config.shop.base_url);
    info!("Hotfolder: {:?}", config.hotfolder.path);
    info!("Ledger: {:?}", config.ledger.path);

    // The staging area must exist before the first cycle.
    std::fs::create_dir_all(&config.staging.path)
        .with_context(|| format!("Failed to create staging directory {:?}", config.staging.path))?;

    // Create the order ledger; without it idempotency is gone, so failure
    // here is fatal.
    let ledger: Arc<dyn Ledger> = Arc::new(
        SqliteLedger::new(&config.ledger.path).context("Failed to open order ledger")?,
    );
    info!("Order ledger initialized");

    // Create shop client
    let shop: Arc<dyn ShopClient> = Arc::new(RestShopClient::new(config.shop.clone()));

    // Create asset acquirer
    let acquirer = Arc::new(HttpAcquirer::new(config.acquirer.clone()));

    // Create composer; fonts are loaded here so a broken font setup fails
    // at startup.
    let composer = Arc::new(
        PrintComposer::new(
            config.label.clone(),
            CutTemplates::new(config.cuts.path.clone()),
        )
        .context("Failed to initialize print composer")?,
    );
    info!("Print composer initialized (cuts: {:?})", config.cuts.path);

    let hotfolder = Arc::new(Hotfolder::new(config.hotfolder.path.clone()));

    // Create and start the orchestrator
    let orchestrator = FulfillmentOrchestrator::new(
        config.orchestrator.clone(),
        shop,
        ledger,
        acquirer,
        composer,
        hotfolder,
        config.staging.path.clone(),
    );

    orchestrator.start().await;

    shutdown_signal().await;

    info!("Shutting down...");
    orchestrator.stop().await;
    info!("Fulfillment orchestrator stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
