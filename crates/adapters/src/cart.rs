use async_trait::async_trait;
use common::{CartId, UserId};
use domain::{CartCommandPort, CartQueryPort, PortError, ShoppingCart};
use messaging::{CartDeleted, CartRecord, MessageBus, MessageBusExt, Topic};
use read_store::CartStore;

use crate::{publish_error, query_error};

/// Cart repository backed by a message bus and the read model.
#[derive(Clone)]
pub struct MessagingCartRepository<B, S> {
    bus: B,
    store: S,
}

impl<B: MessageBus, S: CartStore> MessagingCartRepository<B, S> {
    pub fn new(bus: B, store: S) -> Self {
        Self { bus, store }
    }

    async fn send_cart(
        &self,
        topic: Topic,
        operation: &'static str,
        cart: &ShoppingCart,
    ) -> Result<(), PortError> {
        self.bus
            .publish_record(topic, cart.id().to_string(), &CartRecord::from(cart))
            .await
            .map_err(|e| publish_error(operation, e))?;

        tracing::info!(%topic, cart_id = %cart.id(), "Cart message sent");
        Ok(())
    }
}

#[async_trait]
impl<B: MessageBus, S: CartStore> CartCommandPort for MessagingCartRepository<B, S> {
    async fn create(&self, cart: &ShoppingCart) -> Result<(), PortError> {
        self.send_cart(Topic::CartCreated, "cart create", cart).await
    }

    async fn delete(&self, cart_id: CartId) -> Result<(), PortError> {
        self.bus
            .publish_record(
                Topic::CartDeleted,
                cart_id.to_string(),
                &CartDeleted { id: cart_id },
            )
            .await
            .map_err(|e| publish_error("cart delete", e))?;

        tracing::info!(topic = %Topic::CartDeleted, %cart_id, "Cart message sent");
        Ok(())
    }

    async fn complete(&self, cart: &ShoppingCart) -> Result<(), PortError> {
        self.send_cart(Topic::CartCompleted, "cart complete", cart)
            .await
    }

    async fn update_items(&self, cart: &ShoppingCart) -> Result<(), PortError> {
        self.send_cart(Topic::CartItemUpdated, "cart item update", cart)
            .await
    }
}

#[async_trait]
impl<B: MessageBus, S: CartStore> CartQueryPort for MessagingCartRepository<B, S> {
    async fn get_by_id_and_user(
        &self,
        cart_id: CartId,
        user_id: UserId,
    ) -> Result<Option<ShoppingCart>, PortError> {
        self.store
            .find_cart_by_id_and_user(cart_id, user_id)
            .await
            .map_err(query_error)
    }

    async fn get_incomplete_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<ShoppingCart>, PortError> {
        self.store
            .find_incomplete_cart_by_user(user_id)
            .await
            .map_err(query_error)
    }
}
