//! Message processor for feeding bus messages to materializers.

use std::future::Future;

use futures_util::StreamExt;
use messaging::{InMemoryMessageBus, Message, MessageStream};

use crate::Result;
use crate::materializer::{Materializer, Outcome};

/// Routes messages to the materializers that consume their topic.
///
/// A single processor consumes a bus, so messages for one key are applied in
/// the order they were published. Messages nobody here consumes (validation
/// and stock-restore requests) belong to external services and are only
/// counted.
#[derive(Default)]
pub struct MessageProcessor {
    materializers: Vec<Box<dyn Materializer>>,
}

impl MessageProcessor {
    /// Creates a processor with no materializers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a materializer with this processor.
    pub fn register(&mut self, materializer: Box<dyn Materializer>) {
        self.materializers.push(materializer);
    }

    /// Returns the number of registered materializers.
    pub fn materializer_count(&self) -> usize {
        self.materializers.len()
    }

    /// Delivers a message to every materializer consuming its topic.
    ///
    /// Returns the outcomes in registration order; empty when nothing consumes
    /// the topic.
    #[tracing::instrument(skip(self, message), fields(topic = %message.topic, key = %message.key))]
    pub async fn process_message(&self, message: &Message) -> Result<Vec<Outcome>> {
        let mut outcomes = Vec::new();

        for materializer in &self.materializers {
            if !materializer.topics().contains(&message.topic) {
                continue;
            }

            let outcome = materializer.handle(message).await?;
            metrics::counter!(
                "materializer_messages_total",
                "materializer" => materializer.name(),
                "outcome" => outcome.as_str()
            )
            .increment(1);
            if let Outcome::Dropped(reason) = outcome {
                tracing::debug!(materializer = materializer.name(), reason, "Message dropped");
            }
            outcomes.push(outcome);
        }

        if outcomes.is_empty() {
            metrics::counter!("messages_unconsumed_total", "topic" => message.topic.as_str())
                .increment(1);
            tracing::debug!("No materializer for topic");
        }

        Ok(outcomes)
    }

    /// Processes a message and logs instead of returning failures.
    ///
    /// Malformed payloads are dropped; the in-process bus never redelivers.
    async fn consume(&self, message: &Message) {
        if let Err(e) = self.process_message(message).await {
            metrics::counter!("materializer_failures_total", "topic" => message.topic.as_str())
                .increment(1);
            tracing::error!(
                topic = %message.topic,
                key = %message.key,
                message_id = %message.message_id,
                error = %e,
                "Failed to apply message"
            );
        }
    }

    /// Drains the bus, including messages published while draining.
    ///
    /// Returns the number of messages consumed.
    pub async fn run_until_idle(&self, bus: &InMemoryMessageBus) -> usize {
        let mut consumed = 0;
        while let Some(message) = bus.try_next().await {
            self.consume(&message).await;
            consumed += 1;
        }
        consumed
    }

    /// Consumes `messages` until `shutdown` resolves or the stream ends.
    pub async fn run<F>(&self, mut messages: MessageStream, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::info!(
            materializers = self.materializers.len(),
            "Message processor started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                next = messages.next() => match next {
                    Some(message) => self.consume(&message).await,
                    None => break,
                },
            }
        }

        tracing::info!("Message processor stopped");
    }
}
