//! Materializer error types.

use messaging::{MessagingError, Topic};
use read_store::StoreError;
use saga::SagaError;
use thiserror::Error;

/// Errors that can occur while applying a message.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The payload does not match the topic's record.
    #[error("Message decoding error: {0}")]
    Decode(#[from] MessagingError),

    /// The read model could not be read or written.
    #[error("Read store error: {0}")]
    Store(#[from] StoreError),

    /// The order saga failed for a reason other than a stale message.
    #[error("Saga error: {0}")]
    Saga(#[from] SagaError),

    /// A message was routed to a materializer that does not consume its topic.
    #[error("{materializer} does not consume {topic}")]
    UnexpectedTopic {
        materializer: &'static str,
        topic: Topic,
    },
}

/// Result type for materializer operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
