use async_trait::async_trait;
use common::OrderId;
use domain::{Order, OrderCommandPort, OrderQueryPort, PortError, ValidationOutcomes};
use messaging::{
    MessageBus, MessageBusExt, OrderRecord, StockRestoreRequested, Topic, ValidationRequested,
};
use read_store::OrderStore;

use crate::{publish_error, query_error};

/// Order repository backed by a message bus and the read model.
#[derive(Clone)]
pub struct MessagingOrderRepository<B, S> {
    bus: B,
    store: S,
}

impl<B: MessageBus, S: OrderStore> MessagingOrderRepository<B, S> {
    pub fn new(bus: B, store: S) -> Self {
        Self { bus, store }
    }

    async fn send<T>(
        &self,
        topic: Topic,
        operation: &'static str,
        order: &Order,
        payload: &T,
    ) -> Result<(), PortError>
    where
        T: serde::Serialize + Sync,
    {
        self.bus
            .publish_record(topic, order.id().to_string(), payload)
            .await
            .map_err(|e| publish_error(operation, e))?;

        tracing::info!(%topic, order_id = %order.id(), state = %order.state(), "Order message sent");
        Ok(())
    }
}

#[async_trait]
impl<B: MessageBus, S: OrderStore> OrderCommandPort for MessagingOrderRepository<B, S> {
    async fn create(&self, order: &Order) -> Result<(), PortError> {
        self.send(
            Topic::OrderCreated,
            "order create",
            order,
            &OrderRecord::from(order),
        )
        .await
    }

    async fn update(&self, order: &Order) -> Result<(), PortError> {
        self.send(
            Topic::OrderUpdated,
            "order update",
            order,
            &OrderRecord::from(order),
        )
        .await
    }

    async fn validate_items(
        &self,
        order: &Order,
        outcomes: ValidationOutcomes,
    ) -> Result<(), PortError> {
        self.send(
            Topic::ItemValidationRequested,
            "item validation request",
            order,
            &ValidationRequested::new(order, outcomes),
        )
        .await
    }

    async fn validate_balance(
        &self,
        order: &Order,
        outcomes: ValidationOutcomes,
    ) -> Result<(), PortError> {
        self.send(
            Topic::BalanceValidationRequested,
            "balance validation request",
            order,
            &ValidationRequested::new(order, outcomes),
        )
        .await
    }

    async fn restore_stock(&self, order: &Order) -> Result<(), PortError> {
        self.send(
            Topic::StockRestoreRequested,
            "stock restore request",
            order,
            &StockRestoreRequested::from(order),
        )
        .await
    }
}

#[async_trait]
impl<B: MessageBus, S: OrderStore> OrderQueryPort for MessagingOrderRepository<B, S> {
    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, PortError> {
        self.store.find_order(order_id).await.map_err(query_error)
    }
}
