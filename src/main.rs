use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use checkout_orchestrator::domain::basket::{Basket, LineItem, ServerConfig};
use checkout_orchestrator::domain::checkout::{CheckoutCommand, CheckoutStep};
use checkout_orchestrator::metrics;
use checkout_orchestrator::navigation::RecordingRouter;
use checkout_orchestrator::services::{InMemoryBasketService, ResilientValidationClient};
use checkout_orchestrator::state::InMemoryStore;
use checkout_orchestrator::{CheckoutConfig, CheckoutEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,checkout_orchestrator=debug"))
        )
        .init();

    tracing::info!("🚀 Starting Checkout Orchestration Demo");

    // === 1. Configuration ===
    let config = CheckoutConfig::from_env()?;
    let metrics_port = config.metrics_port;
    let settle = config.settle_delay() + Duration::from_millis(250);

    // === 2. Backend, state container and router ===
    let mut basket = Basket::new("demo-basket");
    basket.line_items = vec![
        LineItem { sku: "SKU-1001".to_string(), quantity: 2 },
        LineItem { sku: "SKU-2002".to_string(), quantity: 1 },
    ];
    basket.invoice_to_address = Some("invoice-address".to_string());
    basket.common_ship_to_address = Some("ship-to-address".to_string());
    basket.common_shipping_method = Some("standard".to_string());

    let backend = Arc::new(InMemoryBasketService::new());
    backend.insert(basket.clone());

    let store = Arc::new(InMemoryStore::new(ServerConfig::with_acceleration(true), Some(basket.clone())));
    let router = Arc::new(RecordingRouter::new());

    // === 3. Engine ===
    let engine = CheckoutEngine::new(
        config,
        Arc::new(ResilientValidationClient::with_defaults(backend.clone())),
        store.clone(),
        router.clone(),
    )?;
    let _store_task = store.attach(engine.bus().subscribe());

    // Start metrics HTTP server in background thread
    let metrics_registry = engine.metrics().registry().clone();
    std::thread::spawn(move || {
        let system = actix_web::rt::System::new();
        if let Err(e) = system.block_on(metrics::start_metrics_server(metrics_registry, metrics_port)) {
            tracing::error!("Metrics server error: {}", e);
        }
    });

    let handle = engine.start();

    // === 4. Accelerated start: lands on the furthest reachable step ===
    handle.dispatch(CheckoutCommand::StartCheckout);
    tokio::time::sleep(settle).await;
    tracing::info!(location = ?router.location(), "✅ Accelerated start finished");

    // === 5. Payment selected, continue to order creation ===
    basket.payment = Some("invoice".to_string());
    backend.insert(basket.clone());
    handle.dispatch(CheckoutCommand::LoadBasketSuccess { basket: basket.clone() });
    handle.dispatch(CheckoutCommand::ContinueCheckout { target_step: CheckoutStep::Review });
    tokio::time::sleep(settle).await;
    tracing::info!(location = ?router.location(), "✅ Review reached");

    let mut orders = handle.subscribe();
    handle.dispatch(CheckoutCommand::ContinueCheckout { target_step: CheckoutStep::Receipt });
    let order = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match orders.recv().await {
                Ok(envelope) if matches!(
                    envelope.command,
                    CheckoutCommand::CreateOrder | CheckoutCommand::SubmitBasket
                ) => return Some(envelope),
                Ok(_) => {}
                Err(_) => return None,
            }
        }
    })
    .await
    .ok()
    .flatten();
    tracing::info!(command = ?order.map(|e| e.command_type()), "✅ Order step emitted");

    // === 6. Basket expires on the server ===
    backend.remove(&basket.id);
    handle.dispatch(CheckoutCommand::ContinueCheckout { target_step: CheckoutStep::Review });
    tokio::time::sleep(settle).await;
    tracing::info!(
        location = ?router.location(),
        basket = ?store.snapshot().basket.map(|b| b.id),
        "✅ Expired basket recovered"
    );

    tracing::info!("📊 Metrics registry holds {} metric families", handle.metrics().registry().gather().len());
    handle.shutdown().await;

    tracing::info!("🎉 Demo complete!");

    Ok(())
}
