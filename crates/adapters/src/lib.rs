//! Message-driven repositories.
//!
//! Commands are serialized onto topics and only report whether the bus accepted
//! them; queries read the read model directly.

mod cart;
mod order;

pub use cart::MessagingCartRepository;
pub use order::MessagingOrderRepository;

use domain::PortError;
use messaging::MessagingError;
use read_store::StoreError;

fn publish_error(operation: &'static str, error: MessagingError) -> PortError {
    tracing::error!(operation, %error, "Failed to enqueue command");
    PortError::Publish {
        operation,
        reason: error.to_string(),
    }
}

fn query_error(error: StoreError) -> PortError {
    PortError::Query(error.to_string())
}
