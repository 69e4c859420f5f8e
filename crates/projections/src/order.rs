//! Order materializer.

use std::sync::Arc;

use async_trait::async_trait;
use domain::{Order, OrderCommandPort, OrderQueryPort, OrderState};
use messaging::{Message, OrderRecord, OrderStateChanged, Topic};
use read_store::OrderStore;
use saga::OrderOrchestrator;

use crate::materializer::saga_outcome;
use crate::{Materializer, Outcome, ProjectionError, Result};

const TOPICS: &[Topic] = &[
    Topic::OrderCreated,
    Topic::OrderUpdated,
    Topic::OrderStateChanged,
];

/// Applies order messages to the read model and re-enters the saga.
pub struct OrderMaterializer<S, C, Q> {
    store: S,
    orchestrator: Arc<OrderOrchestrator<C, Q>>,
}

impl<S, C, Q> OrderMaterializer<S, C, Q>
where
    S: OrderStore,
    C: OrderCommandPort,
    Q: OrderQueryPort,
{
    pub fn new(store: S, orchestrator: Arc<OrderOrchestrator<C, Q>>) -> Self {
        Self {
            store,
            orchestrator,
        }
    }

    // Inserting starts the saga; a redelivered creation finds the row already
    // past Created and the follow-up update is refused by the weight check.
    async fn on_created(&self, record: OrderRecord) -> Result<Outcome> {
        let order_id = record.id;
        let order = match record.into_order() {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(%order_id, error = %e, "Order record refused");
                return Ok(Outcome::Dropped("invalid order"));
            }
        };
        if !self.store.insert_order(&order).await? {
            tracing::debug!(order_id = %order.id(), "Order already stored");
        }

        saga_outcome(
            self.orchestrator
                .update(order.id(), OrderState::ValidatingItems, Vec::new())
                .await,
        )
    }

    async fn on_updated(&self, record: OrderRecord) -> Result<Outcome> {
        let Some(stored) = self.store.find_order(record.id).await? else {
            tracing::warn!(order_id = %record.id, "Updated order not found");
            return Ok(Outcome::Dropped("unknown order"));
        };

        let order = Order::restore(
            stored.id(),
            stored.shopping_cart().clone(),
            record.state,
            record.errors,
        );
        self.store.save_order(&order).await?;
        Ok(Outcome::Applied)
    }

    async fn on_state_changed(&self, changed: OrderStateChanged) -> Result<Outcome> {
        saga_outcome(
            self.orchestrator
                .update(changed.id, changed.state, changed.errors)
                .await,
        )
    }
}

#[async_trait]
impl<S, C, Q> Materializer for OrderMaterializer<S, C, Q>
where
    S: OrderStore,
    C: OrderCommandPort,
    Q: OrderQueryPort,
{
    fn name(&self) -> &'static str {
        "OrderMaterializer"
    }

    fn topics(&self) -> &'static [Topic] {
        TOPICS
    }

    #[tracing::instrument(skip(self, message), fields(topic = %message.topic, key = %message.key))]
    async fn handle(&self, message: &Message) -> Result<Outcome> {
        match message.topic {
            Topic::OrderCreated => self.on_created(message.decode()?).await,
            Topic::OrderUpdated => self.on_updated(message.decode()?).await,
            Topic::OrderStateChanged => self.on_state_changed(message.decode()?).await,
            topic => Err(ProjectionError::UnexpectedTopic {
                materializer: self.name(),
                topic,
            }),
        }
    }
}
