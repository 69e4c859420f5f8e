//! Core materializer trait.

use async_trait::async_trait;
use messaging::{Message, Topic};

use saga::SagaError;

use crate::Result;

/// What a materializer did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The message changed the read model or advanced the saga.
    Applied,
    /// The message was stale, duplicated or refused by an invariant.
    Dropped(&'static str),
}

impl Outcome {
    /// Returns the label used in metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Applied => "applied",
            Outcome::Dropped(_) => "dropped",
        }
    }
}

/// Applies the messages of some topics to the read model.
///
/// Delivery is at-least-once, so every handler must tolerate redelivery.
#[async_trait]
pub trait Materializer: Send + Sync {
    /// Returns the name of this materializer.
    fn name(&self) -> &'static str;

    /// Returns the topics this materializer consumes.
    fn topics(&self) -> &'static [Topic];

    /// Handles a single message.
    async fn handle(&self, message: &Message) -> Result<Outcome>;
}

/// Turns a saga result into an outcome.
///
/// Duplicate and out-of-order messages are expected under at-least-once
/// delivery; they are logged and dropped instead of failing the consumer.
pub(crate) fn saga_outcome<T>(result: std::result::Result<Option<T>, SagaError>) -> Result<Outcome> {
    match result {
        Ok(Some(_)) => Ok(Outcome::Applied),
        Ok(None) => Ok(Outcome::Dropped("unknown order")),
        Err(e) if e.is_stale_delivery() => {
            tracing::warn!(error = %e, "Stale order message dropped");
            Ok(Outcome::Dropped("stale order state"))
        }
        Err(e) => Err(e.into()),
    }
}
