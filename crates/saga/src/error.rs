//! Saga error types.

use domain::{OrderError, PortError};
use thiserror::Error;

/// Errors that can occur during saga operations.
#[derive(Debug, Error)]
pub enum SagaError {
    /// The order refused the transition.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// A port failed to read or enqueue.
    #[error(transparent)]
    Port(#[from] PortError),
}

impl SagaError {
    /// Returns true for failures caused by a duplicate or out-of-order message.
    ///
    /// Those are expected under at-least-once delivery; the message is dropped.
    pub fn is_stale_delivery(&self) -> bool {
        matches!(
            self,
            SagaError::Order(
                OrderError::IllegalOrderState { .. } | OrderError::PreviousOrderStateUpdate { .. }
            )
        )
    }
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
