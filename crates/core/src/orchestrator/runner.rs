//! Fulfillment orchestrator implementation.
//!
//! One polling loop drives everything. Each cycle fetches the order list,
//! filters it against payment status and the ledger, and produces each
//! remaining order end to end: acquire assets, compose documents, deliver to
//! the hotfolder, record the outcome. Orders are processed sequentially; the
//! hotfolder downstream is the bottleneck anyway.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::acquirer::{AcquireError, AssetAcquirer};
use crate::composer::{ComposeRequest, Composer};
use crate::hotfolder::{delivery_name, Hotfolder};
use crate::ledger::{Ledger, Outcome};
use crate::shop::{Order, ShopClient};

use super::config::OrchestratorConfig;
use super::types::{AttemptError, AttemptReport, CycleSummary, OrchestratorError};

/// The fulfillment orchestrator.
pub struct FulfillmentOrchestrator<A, C>
where
    A: AssetAcquirer + 'static,
    C: Composer + 'static,
{
    config: OrchestratorConfig,
    shop: Arc<dyn ShopClient>,
    ledger: Arc<dyn Ledger>,
    acquirer: Arc<A>,
    composer: Arc<C>,
    hotfolder: Arc<Hotfolder>,
    staging_dir: PathBuf,

    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl<A, C> FulfillmentOrchestrator<A, C>
where
    A: AssetAcquirer + 'static,
    C: Composer + 'static,
{
    pub fn new(
        config: OrchestratorConfig,
        shop: Arc<dyn ShopClient>,
        ledger: Arc<dyn Ledger>,
        acquirer: Arc<A>,
        composer: Arc<C>,
        hotfolder: Arc<Hotfolder>,
        staging_dir: PathBuf,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            shop,
            ledger,
            acquirer,
            composer,
            hotfolder,
            staging_dir,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Start the polling loop (spawns a background task).
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Orchestrator already running");
            return;
        }

        info!("Starting fulfillment orchestrator");

        let config = self.config.clone();
        let shop = Arc::clone(&self.shop);
        let ledger = Arc::clone(&self.ledger);
        let acquirer = Arc::clone(&self.acquirer);
        let composer = Arc::clone(&self.composer);
        let hotfolder = Arc::clone(&self.hotfolder);
        let staging_dir = self.staging_dir.clone();
        let running = Arc::clone(&self.running);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Polling loop started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Polling loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        match Self::cycle(
                            &config,
                            &shop,
                            &ledger,
                            &acquirer,
                            &composer,
                            &hotfolder,
                            &staging_dir,
                        ).await {
                            Ok(summary) => {
                                if summary.produced > 0 || summary.failed > 0 {
                                    info!(
                                        orders = summary.orders_listed,
                                        produced = summary.produced,
                                        failed = summary.failed,
                                        "Cycle finished"
                                    );
                                }
                            }
                            Err(e) => warn!("Cycle failed: {}", e),
                        }
                    }
                }
            }
            info!("Polling loop stopped");
        });

        info!("Fulfillment orchestrator started");
    }

    /// Stop the orchestrator gracefully.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Orchestrator not running");
            return;
        }

        info!("Stopping fulfillment orchestrator");

        let _ = self.shutdown_tx.send(());

        // Give the loop a moment to notice.
        tokio::time::sleep(Duration::from_millis(500)).await;

        info!("Fulfillment orchestrator stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Run a single cycle inline. Used by the loop and directly by tests.
    pub async fn run_cycle(&self) -> Result<CycleSummary, OrchestratorError> {
        Self::cycle(
            &self.config,
            &self.shop,
            &self.ledger,
            &self.acquirer,
            &self.composer,
            &self.hotfolder,
            &self.staging_dir,
        )
        .await
    }

    async fn cycle(
        config: &OrchestratorConfig,
        shop: &Arc<dyn ShopClient>,
        ledger: &Arc<dyn Ledger>,
        acquirer: &Arc<A>,
        composer: &Arc<C>,
        hotfolder: &Arc<Hotfolder>,
        staging_dir: &Path,
    ) -> Result<CycleSummary, OrchestratorError> {
        let orders = Self::fetch_orders(config, shop).await?;

        let mut summary = CycleSummary {
            orders_listed: orders.len(),
            ..Default::default()
        };

        for order in &orders {
            Self::process_order(
                order,
                config,
                shop,
                ledger,
                acquirer,
                composer,
                hotfolder,
                staging_dir,
                &mut summary,
            )
            .await;
        }

        Ok(summary)
    }

    /// Fetch the order list, retrying within the cycle's budget.
    ///
    /// Protocol violations count as failed attempts too; a storefront that
    /// answers with an error object instead of a list gets the same retries
    /// as one that times out.
    async fn fetch_orders(
        config: &OrchestratorConfig,
        shop: &Arc<dyn ShopClient>,
    ) -> Result<Vec<Order>, OrchestratorError> {
        let mut last_error = String::new();

        for attempt in 1..=config.api_retry_limit {
            match shop.list_orders().await {
                Ok(orders) => {
                    debug!(count = orders.len(), "Fetched order list");
                    return Ok(orders);
                }
                Err(e) => {
                    warn!(
                        attempt,
                        attempts = config.api_retry_limit,
                        error = %e,
                        "Order listing attempt failed"
                    );
                    last_error = e.to_string();
                }
            }

            if attempt < config.api_retry_limit {
                tokio::time::sleep(Duration::from_millis(config.api_retry_delay_ms)).await;
            }
        }

        Err(OrchestratorError::OrderListing {
            attempts: config.api_retry_limit,
            last_error,
        })
    }

    /// Drive one order to a terminal outcome, or skip it.
    #[allow(clippy::too_many_arguments)]
    async fn process_order(
        order: &Order,
        config: &OrchestratorConfig,
        shop: &Arc<dyn ShopClient>,
        ledger: &Arc<dyn Ledger>,
        acquirer: &Arc<A>,
        composer: &Arc<C>,
        hotfolder: &Arc<Hotfolder>,
        staging_dir: &Path,
        summary: &mut CycleSummary,
    ) {
        if !order.status.is_paid() {
            debug!(order_id = order.id, status = ?order.status, "Skipping unpaid order");
            summary.skipped_unpaid += 1;
            return;
        }

        match ledger.lookup(order.id) {
            Ok(Some(record)) => {
                debug!(
                    order_id = order.id,
                    outcome = record.outcome.as_str(),
                    "Order already recorded, skipping"
                );
                summary.skipped_recorded += 1;
                return;
            }
            Ok(None) => {}
            Err(e) => {
                // Without a readable ledger we cannot tell whether this order
                // was already produced, so leave it for a later cycle.
                warn!(order_id = order.id, error = %e, "Ledger lookup failed, skipping order");
                return;
            }
        }

        let order_staging = staging_dir.join(format!("order{}", order.id));

        let mut attempt = 1;
        loop {
            let result = Self::attempt_order(
                order,
                shop,
                acquirer,
                composer,
                hotfolder,
                &order_staging,
                config.target_dpi,
            )
            .await;

            match result {
                Ok(report) => {
                    if report.items_produced == 0 {
                        info!(order_id = order.id, "Order has no printable items, completing as no-op");
                    } else {
                        info!(
                            order_id = order.id,
                            items = report.items_produced,
                            "Order produced"
                        );
                    }
                    Self::record(ledger, order.id, Outcome::Success);
                    summary.produced += 1;
                    break;
                }
                Err(AttemptError::Permanent(reason)) => {
                    warn!(order_id = order.id, reason = %reason, "Order failed permanently");
                    Self::record(ledger, order.id, Outcome::PermanentFailure);
                    summary.failed += 1;
                    break;
                }
                Err(AttemptError::Retryable(reason)) => {
                    warn!(
                        order_id = order.id,
                        attempt,
                        attempts = config.order_retry_limit,
                        reason = %reason,
                        "Order attempt failed"
                    );

                    if attempt >= config.order_retry_limit {
                        warn!(order_id = order.id, "Retry budget exhausted");
                        Self::record(ledger, order.id, Outcome::PermanentFailure);
                        summary.failed += 1;
                        break;
                    }

                    attempt += 1;
                    tokio::time::sleep(Duration::from_millis(config.order_retry_backoff_ms)).await;
                }
            }
        }

        // Terminal outcome either way; staged files are no longer needed.
        if order_staging.exists() {
            if let Err(e) = std::fs::remove_dir_all(&order_staging) {
                warn!(order_id = order.id, error = %e, "Failed to clean staging directory");
            }
        }
    }

    /// One production attempt: acquire, compose and deliver every printable
    /// item of the order. Fails fast on the first item error.
    async fn attempt_order(
        order: &Order,
        shop: &Arc<dyn ShopClient>,
        acquirer: &Arc<A>,
        composer: &Arc<C>,
        hotfolder: &Arc<Hotfolder>,
        order_staging: &Path,
        target_dpi: u32,
    ) -> Result<AttemptReport, AttemptError> {
        let items: Vec<_> = order.asset_items().collect();
        if items.is_empty() {
            return Ok(AttemptReport { items_produced: 0 });
        }

        std::fs::create_dir_all(order_staging)
            .map_err(|e| AttemptError::Retryable(format!("staging unavailable: {}", e)))?;

        let mut items_produced = 0;

        for item in items {
            let Some(url) = item.asset_url() else {
                continue;
            };

            let source = order_staging.join(staged_file_name(item.id, url));
            acquirer.acquire(url, &source).await.map_err(|e| match e {
                AcquireError::InvalidReference(_) => AttemptError::Permanent(e.to_string()),
                other => AttemptError::Retryable(other.to_string()),
            })?;

            let product = shop
                .get_product(item.product_id)
                .await
                .map_err(|e| AttemptError::Retryable(e.to_string()))?;

            let print_id = product
                .print_id()
                .ok_or_else(|| {
                    AttemptError::Permanent(format!("product {} has no print id", product.id))
                })?
                .to_string();
            let dpi = product.dpi().unwrap_or(target_dpi);

            let request = ComposeRequest {
                source,
                output: order_staging.join(format!("item{}.pdf", item.id)),
                print_id,
                dpi,
                recipient: order.shipping.clone(),
            };

            let document = composer.compose(&request).map_err(|e| {
                if e.is_permanent() {
                    AttemptError::Permanent(e.to_string())
                } else {
                    AttemptError::Retryable(e.to_string())
                }
            })?;

            hotfolder
                .deliver(&document.path, &delivery_name(order.id, item.id))
                .map_err(|e| AttemptError::Retryable(e.to_string()))?;

            items_produced += 1;
        }

        Ok(AttemptReport { items_produced })
    }

    fn record(ledger: &Arc<dyn Ledger>, order_id: u64, outcome: Outcome) {
        if let Err(e) = ledger.upsert(order_id, outcome) {
            warn!(order_id, error = %e, "Failed to record order outcome");
        }
    }
}

/// Staged file name for an item's asset, keeping the URL's extension when it
/// has a plausible one.
fn staged_file_name(item_id: u64, url: &str) -> String {
    let ext = url
        .split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        });

    match ext {
        Some(ext) => format!("item{item_id}.{ext}"),
        None => format!("item{item_id}.bin"),
    }
}
