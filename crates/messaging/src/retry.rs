//! Publish retry with exponential backoff and dead-lettering.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{Message, MessageBus, MessagingError, Result};

/// Backoff schedule for publish retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound for any single delay.
    pub max_backoff: Duration,
    /// Factor applied to the delay after each failed retry.
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_secs(1),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the default multiplier.
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            max_backoff,
            ..Self::default()
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .checked_pow(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// A message that could not be published.
#[derive(Debug, Clone)]
pub struct DeadLetter {
    pub message: Message,
    pub attempts: u32,
    pub reason: String,
    pub failed_at: DateTime<Utc>,
}

/// Shared store of dead-lettered messages.
#[derive(Debug, Clone, Default)]
pub struct DeadLetterQueue {
    letters: Arc<RwLock<Vec<DeadLetter>>>,
}

impl DeadLetterQueue {
    pub fn new() -> Self {
        Self::default()
    }

    async fn push(&self, letter: DeadLetter) {
        self.letters.write().await.push(letter);
    }

    pub async fn len(&self) -> usize {
        self.letters.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.letters.read().await.is_empty()
    }

    /// Returns a copy of the dead letters, oldest first.
    pub async fn snapshot(&self) -> Vec<DeadLetter> {
        self.letters.read().await.clone()
    }

    /// Removes and returns every dead letter, e.g. for a manual replay.
    pub async fn drain(&self) -> Vec<DeadLetter> {
        std::mem::take(&mut *self.letters.write().await)
    }
}

/// A bus decorator that retries failed publishes.
///
/// When every attempt fails, the message is recorded in the dead-letter queue and
/// [`MessagingError::DeadLettered`] is returned.
#[derive(Clone)]
pub struct RetryingBus<B> {
    inner: B,
    policy: RetryPolicy,
    dead_letters: DeadLetterQueue,
}

impl<B: MessageBus> RetryingBus<B> {
    pub fn new(inner: B, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            dead_letters: DeadLetterQueue::new(),
        }
    }

    /// Returns the wrapped bus.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn dead_letters(&self) -> &DeadLetterQueue {
        &self.dead_letters
    }
}

#[async_trait]
impl<B: MessageBus> MessageBus for RetryingBus<B> {
    async fn publish(&self, message: Message) -> Result<()> {
        let topic = message.topic;
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.inner.publish(message.clone()).await {
                Ok(()) => {
                    metrics::counter!("messages_published_total", "topic" => topic.as_str())
                        .increment(1);
                    return Ok(());
                }
                Err(e) if attempt < max_attempts => {
                    let delay = self.policy.backoff_for(attempt);
                    tracing::warn!(
                        %topic,
                        key = %message.key,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Publish failed, retrying"
                    );
                    metrics::counter!("messages_publish_retries_total", "topic" => topic.as_str())
                        .increment(1);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(
                        %topic,
                        key = %message.key,
                        attempts = attempt,
                        error = %e,
                        "Publish failed, dead-lettering message"
                    );
                    metrics::counter!("messages_dead_lettered_total", "topic" => topic.as_str())
                        .increment(1);
                    self.dead_letters
                        .push(DeadLetter {
                            message,
                            attempts: attempt,
                            reason: e.to_string(),
                            failed_at: Utc::now(),
                        })
                        .await;
                    return Err(MessagingError::DeadLettered {
                        topic,
                        attempts: attempt,
                    });
                }
            }
        }
    }
}
