//! Port error types.

use thiserror::Error;

/// Errors reported by the command and query ports.
///
/// Command ports only report whether the intent was enqueued; they never report
/// the applied result.
#[derive(Debug, Error)]
pub enum PortError {
    /// The command could not be enqueued on its channel.
    #[error("Failed to enqueue {operation}: {reason}")]
    Publish {
        operation: &'static str,
        reason: String,
    },

    /// The read model could not be queried.
    #[error("Read model query failed: {0}")]
    Query(String),
}
