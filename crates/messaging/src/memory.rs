use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Notify, RwLock};

use crate::{Message, MessageBus, MessageStream, MessagingError, Result, Topic};

#[derive(Debug, Default)]
struct BusState {
    pending: VecDeque<Message>,
    history: Option<Vec<Message>>,
    fail_next: usize,
    fail_on_publish: bool,
}

/// In-process message bus.
///
/// Messages are delivered in publish order to a single consumer and dropped once
/// taken. A bus built with [`InMemoryMessageBus::with_history`] also keeps every
/// accepted message, so tests can inspect what was sent, including on topics
/// nothing in-process consumes.
#[derive(Clone, Default)]
pub struct InMemoryMessageBus {
    state: Arc<RwLock<BusState>>,
    notify: Arc<Notify>,
}

impl InMemoryMessageBus {
    /// Creates a new empty bus that keeps no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty bus that records every accepted message.
    pub fn with_history() -> Self {
        let state = BusState {
            history: Some(Vec::new()),
            ..BusState::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
            notify: Arc::default(),
        }
    }

    /// Makes the next `count` publishes fail.
    pub async fn fail_next(&self, count: usize) {
        self.state.write().await.fail_next = count;
    }

    /// Makes every publish fail until reset.
    pub async fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().await.fail_on_publish = fail;
    }

    /// Removes and returns the oldest undelivered message, if any.
    pub async fn try_next(&self) -> Option<Message> {
        self.state.write().await.pending.pop_front()
    }

    /// Waits for the next undelivered message.
    pub async fn next(&self) -> Message {
        loop {
            if let Some(message) = self.try_next().await {
                return message;
            }
            self.notify.notified().await;
        }
    }

    /// Returns a stream of undelivered messages that never ends.
    pub fn stream(&self) -> MessageStream {
        let bus = self.clone();
        Box::pin(futures_util::stream::unfold(bus, |bus| async move {
            let message = bus.next().await;
            Some((message, bus))
        }))
    }

    /// Returns the number of undelivered messages.
    pub async fn pending_count(&self) -> usize {
        self.state.read().await.pending.len()
    }

    /// Returns every message accepted so far, in publish order.
    ///
    /// Always empty unless the bus was built with [`InMemoryMessageBus::with_history`].
    pub async fn history(&self) -> Vec<Message> {
        self.state.read().await.history.clone().unwrap_or_default()
    }

    /// Returns the accepted messages of one topic, in publish order.
    pub async fn published_on(&self, topic: Topic) -> Vec<Message> {
        self.state
            .read()
            .await
            .history
            .iter()
            .flatten()
            .filter(|m| m.topic == topic)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MessageBus for InMemoryMessageBus {
    async fn publish(&self, message: Message) -> Result<()> {
        {
            let mut state = self.state.write().await;

            if state.fail_on_publish || state.fail_next > 0 {
                state.fail_next = state.fail_next.saturating_sub(1);
                return Err(MessagingError::Publish {
                    topic: message.topic,
                    reason: "broker unavailable".to_string(),
                });
            }

            if let Some(history) = state.history.as_mut() {
                history.push(message.clone());
            }
            state.pending.push_back(message);
        }
        self.notify.notify_one();
        Ok(())
    }
}
