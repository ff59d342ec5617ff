//! # Bazaar Market API
//!
//! HTTP service entry point.
//!
//! ## Startup Sequence
//! ```text
//! tracing → config → database (+ migrations) → gateway client
//!     → shared state → stale-payment sweep task → axum serve
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use bazaar_db::{Database, DbConfig};
use bazaar_gateway::{GatewayConfig, HttpPaymentGateway};

use bazaar_market_api::config::MarketConfig;
use bazaar_market_api::services::{PaymentService, TextInvoiceRenderer, TracingNotificationSender};
use bazaar_market_api::{api, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .init();

    info!("Starting Bazaar market API...");

    // Load configuration
    let config = MarketConfig::load()?;
    info!(
        port = config.http_port,
        database = %config.database_path,
        "Configuration loaded"
    );

    // Connect to database (runs migrations)
    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Connected to SQLite");

    // Build the gateway client
    let gateway = HttpPaymentGateway::new(GatewayConfig {
        base_url: config.gateway_base_url.clone(),
        secret_key: config.gateway_secret_key.clone(),
        return_url: config.gateway_return_url.clone(),
        request_timeout: config.gateway_timeout(),
    })?;

    // Create shared state
    let state = Arc::new(AppState {
        db,
        gateway: Arc::new(gateway),
        notifier: Arc::new(TracingNotificationSender),
        renderer: Arc::new(TextInvoiceRenderer),
        config: config.clone(),
    });

    // Background sweep: flag payments stuck Pending beyond the threshold
    spawn_stale_payment_sweep(state.clone());

    // Build and serve the router
    let app = api::router().with_state(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!(%addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Periodically flags payments stuck Pending for manual review.
///
/// The sweep never transitions payments; see
/// [`PaymentService::sweep_stale_pending`].
fn spawn_stale_payment_sweep(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(state.config.sweep_interval());

        loop {
            ticker.tick().await;

            let service = PaymentService::new(
                state.db.clone(),
                state.gateway.clone(),
                state.config.currency.clone(),
                state.config.pending_payment_max_age_secs,
            );

            if let Err(e) = service.sweep_stale_pending().await {
                warn!(error = %e, "Stale-payment sweep failed; will retry next interval");
            }
        }
    });
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
