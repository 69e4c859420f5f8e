//! Cart materializer.

use std::sync::Arc;

use async_trait::async_trait;
use common::CartId;
use domain::{CartError, OrderCommandPort, OrderQueryPort, ShoppingCart};
use messaging::{CartDeleted, CartRecord, Message, Topic};
use read_store::{CartStore, StoreError};
use saga::OrderOrchestrator;

use crate::{Materializer, Outcome, ProjectionError, Result};

const TOPICS: &[Topic] = &[
    Topic::CartCreated,
    Topic::CartDeleted,
    Topic::CartCompleted,
    Topic::CartItemUpdated,
];

/// Applies cart messages to the read model.
///
/// Completion re-checks the stored row, since the command side validated
/// against a snapshot that may be stale by now, and then starts an order.
pub struct CartMaterializer<S, C, Q> {
    store: S,
    orchestrator: Arc<OrderOrchestrator<C, Q>>,
}

impl<S, C, Q> CartMaterializer<S, C, Q>
where
    S: CartStore,
    C: OrderCommandPort,
    Q: OrderQueryPort,
{
    pub fn new(store: S, orchestrator: Arc<OrderOrchestrator<C, Q>>) -> Self {
        Self {
            store,
            orchestrator,
        }
    }

    async fn on_created(&self, record: CartRecord) -> Result<Outcome> {
        let cart_id = record.id;
        let cart = match record.into_cart() {
            Ok(cart) => cart,
            Err(e) => return Ok(invalid_cart(cart_id, e)),
        };
        match self.store.insert_cart(&cart).await {
            Ok(()) => Ok(Outcome::Applied),
            Err(StoreError::IncompleteCartExists { user_id }) => {
                tracing::warn!(cart_id = %cart.id(), %user_id, "User already has an incomplete cart");
                Ok(Outcome::Dropped("incomplete cart exists"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn on_deleted(&self, deleted: CartDeleted) -> Result<Outcome> {
        if self.store.delete_cart(deleted.id).await? {
            Ok(Outcome::Applied)
        } else {
            tracing::debug!(cart_id = %deleted.id, "Cart already deleted");
            Ok(Outcome::Dropped("unknown cart"))
        }
    }

    async fn on_completed(&self, record: CartRecord) -> Result<Outcome> {
        let Some(mut cart) = self.store.find_cart(record.id).await? else {
            tracing::warn!(cart_id = %record.id, "Completed cart not found");
            return Ok(Outcome::Dropped("unknown cart"));
        };

        if cart.is_completed() {
            tracing::warn!(cart_id = %cart.id(), "Cart already completed");
            return Ok(Outcome::Dropped("cart already completed"));
        }

        if cart.total_price() != record.total_price {
            tracing::warn!(
                cart_id = %cart.id(),
                stored_total = %cart.total_price(),
                carried_total = %record.total_price,
                "Cart changed since completion was requested"
            );
            return Ok(Outcome::Dropped("total price mismatch"));
        }

        if let Err(e) = cart.complete() {
            tracing::warn!(cart_id = %cart.id(), error = %e, "Stored cart is not completable");
            return Ok(Outcome::Dropped("cart not completable"));
        }

        // The row stays open until the order is enqueued, so a failed publish
        // leaves the completion retryable.
        self.orchestrator.create(cart.clone()).await?;
        self.store.save_cart(&cart).await?;
        Ok(Outcome::Applied)
    }

    async fn on_items_updated(&self, record: CartRecord) -> Result<Outcome> {
        let Some(stored) = self.store.find_cart(record.id).await? else {
            tracing::warn!(cart_id = %record.id, "Updated cart not found");
            return Ok(Outcome::Dropped("unknown cart"));
        };

        if stored.is_completed() {
            tracing::warn!(cart_id = %stored.id(), "Item update for completed cart dropped");
            return Ok(Outcome::Dropped("cart already completed"));
        }

        let cart = match ShoppingCart::restore(stored.id(), stored.user_id(), false, record.items)
        {
            Ok(cart) => cart,
            Err(e) => return Ok(invalid_cart(stored.id(), e)),
        };
        self.store.save_cart(&cart).await?;
        Ok(Outcome::Applied)
    }
}

fn invalid_cart(cart_id: CartId, error: CartError) -> Outcome {
    tracing::warn!(%cart_id, %error, "Cart record refused");
    Outcome::Dropped("invalid cart")
}

#[async_trait]
impl<S, C, Q> Materializer for CartMaterializer<S, C, Q>
where
    S: CartStore,
    C: OrderCommandPort,
    Q: OrderQueryPort,
{
    fn name(&self) -> &'static str {
        "CartMaterializer"
    }

    fn topics(&self) -> &'static [Topic] {
        TOPICS
    }

    #[tracing::instrument(skip(self, message), fields(topic = %message.topic, key = %message.key))]
    async fn handle(&self, message: &Message) -> Result<Outcome> {
        match message.topic {
            Topic::CartCreated => self.on_created(message.decode()?).await,
            Topic::CartDeleted => self.on_deleted(message.decode()?).await,
            Topic::CartCompleted => self.on_completed(message.decode()?).await,
            Topic::CartItemUpdated => self.on_items_updated(message.decode()?).await,
            topic => Err(ProjectionError::UnexpectedTopic {
                materializer: self.name(),
                topic,
            }),
        }
    }
}
