//! Service start-up and run errors.

use metrics_exporter_prometheus::BuildError;
use read_store::StoreError;
use thiserror::Error;

/// Errors that stop the service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The read store could not be opened or migrated.
    #[error("Read store error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to install metrics recorder: {0}")]
    Metrics(#[from] BuildError),

    /// Binding or serving the admin endpoints failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The message consumer task panicked or was cancelled.
    #[error("Message consumer failed: {0}")]
    Consumer(#[from] tokio::task::JoinError),
}

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
