use thiserror::Error;

use crate::Topic;

/// Errors that can occur when publishing or decoding messages.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// A payload could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The transport refused the message.
    #[error("Failed to publish on {topic}: {reason}")]
    Publish { topic: Topic, reason: String },

    /// Every publish attempt failed; the message was moved to the dead-letter queue.
    #[error("Message on {topic} dead-lettered after {attempts} attempts")]
    DeadLettered { topic: Topic, attempts: u32 },

    /// A topic name that is not part of the contract.
    #[error("Unknown topic: {0}")]
    UnknownTopic(String),
}

/// Result type for messaging operations.
pub type Result<T> = std::result::Result<T, MessagingError>;
