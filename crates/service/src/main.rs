//! Checkout service entry point.

use read_store::{InMemoryReadStore, PostgresReadStore};
use service::{Checkout, Config, telemetry};
use tokio::signal;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

#[tokio::main]
async fn main() -> service::Result<()> {
    let config = Config::from_env();
    telemetry::init_tracing(&config);
    let metrics_handle = telemetry::install_metrics()?;

    let policy = config.retry_policy();
    match config.database_url.as_deref() {
        Some(url) => {
            let store = PostgresReadStore::connect(url).await?;
            store.run_migrations().await?;
            tracing::info!("Using PostgreSQL read store");
            let checkout = Checkout::new(store, policy);
            service::serve(&config, &checkout, metrics_handle, shutdown_signal()).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory read store");
            let checkout = Checkout::new(InMemoryReadStore::new(), policy);
            service::serve(&config, &checkout, metrics_handle, shutdown_signal()).await
        }
    }
}
