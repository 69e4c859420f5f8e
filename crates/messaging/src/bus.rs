use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;
use serde::Serialize;

use crate::{Message, Result, Topic};

/// A stream of delivered messages.
pub type MessageStream = Pin<Box<dyn Stream<Item = Message> + Send>>;

/// Core trait for message transports.
///
/// `publish` returns once the transport has accepted the message; delivery to
/// consumers is asynchronous and at-least-once. All implementations must be
/// thread-safe (Send + Sync).
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publishes a message on its topic.
    async fn publish(&self, message: Message) -> Result<()>;
}

/// Extension trait providing convenience methods for message buses.
#[async_trait]
pub trait MessageBusExt: MessageBus {
    /// Serializes `payload` and publishes it on `topic` under `key`.
    async fn publish_record<T>(&self, topic: Topic, key: String, payload: &T) -> Result<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let message = Message::new(topic, key, payload)?;
        self.publish(message).await
    }
}

// Blanket implementation for all MessageBus implementations
impl<T: MessageBus + ?Sized> MessageBusExt for T {}
