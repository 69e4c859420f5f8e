//! Messaging layer for the checkout system.
//!
//! Commands leave the write side as [`Message`]s on named [`Topic`]s. A
//! [`MessageBus`] carries them to the materializers; [`RetryingBus`] adds
//! backoff and dead-lettering on top of any bus.

pub mod bus;
pub mod contracts;
pub mod error;
pub mod memory;
pub mod message;
pub mod retry;
pub mod topic;

pub use bus::{MessageBus, MessageBusExt, MessageStream};
pub use contracts::{
    CartDeleted, CartRecord, OrderRecord, OrderStateChanged, StockRestoreRequested,
    ValidationRequested,
};
pub use error::{MessagingError, Result};
pub use memory::InMemoryMessageBus;
pub use message::{Message, MessageId};
pub use retry::{DeadLetter, DeadLetterQueue, RetryPolicy, RetryingBus};
pub use topic::Topic;
