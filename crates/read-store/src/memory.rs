use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{CartId, OrderId, UserId};
use domain::{Order, ShoppingCart};
use tokio::sync::RwLock;

use crate::{CartStore, OrderStore, Result, StoreError};

/// In-memory read model for tests and single-process deployments.
///
/// Provides the same guarantees as the PostgreSQL implementation, including
/// the one-incomplete-cart-per-user constraint.
#[derive(Clone, Default)]
pub struct InMemoryReadStore {
    carts: Arc<RwLock<HashMap<CartId, ShoppingCart>>>,
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryReadStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored carts.
    pub async fn cart_count(&self) -> usize {
        self.carts.read().await.len()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Returns every stored order.
    pub async fn orders(&self) -> Vec<Order> {
        self.orders.read().await.values().cloned().collect()
    }

    /// Clears all rows.
    pub async fn clear(&self) {
        self.carts.write().await.clear();
        self.orders.write().await.clear();
    }
}

// Mirrors the partial unique index of the SQL schema.
fn check_single_incomplete(
    carts: &HashMap<CartId, ShoppingCart>,
    cart: &ShoppingCart,
) -> Result<()> {
    if cart.is_completed() {
        return Ok(());
    }
    let conflict = carts.values().any(|other| {
        other.id() != cart.id() && other.user_id() == cart.user_id() && !other.is_completed()
    });
    if conflict {
        return Err(StoreError::IncompleteCartExists {
            user_id: cart.user_id(),
        });
    }
    Ok(())
}

#[async_trait]
impl CartStore for InMemoryReadStore {
    async fn insert_cart(&self, cart: &ShoppingCart) -> Result<()> {
        let mut carts = self.carts.write().await;
        if carts.contains_key(&cart.id()) {
            return Ok(());
        }
        check_single_incomplete(&carts, cart)?;
        carts.insert(cart.id(), cart.clone());
        Ok(())
    }

    async fn save_cart(&self, cart: &ShoppingCart) -> Result<()> {
        let mut carts = self.carts.write().await;
        check_single_incomplete(&carts, cart)?;
        carts.insert(cart.id(), cart.clone());
        Ok(())
    }

    async fn delete_cart(&self, cart_id: CartId) -> Result<bool> {
        Ok(self.carts.write().await.remove(&cart_id).is_some())
    }

    async fn find_cart(&self, cart_id: CartId) -> Result<Option<ShoppingCart>> {
        Ok(self.carts.read().await.get(&cart_id).cloned())
    }

    async fn find_cart_by_id_and_user(
        &self,
        cart_id: CartId,
        user_id: UserId,
    ) -> Result<Option<ShoppingCart>> {
        Ok(self
            .carts
            .read()
            .await
            .get(&cart_id)
            .filter(|cart| cart.user_id() == user_id)
            .cloned())
    }

    async fn find_incomplete_cart_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<ShoppingCart>> {
        Ok(self
            .carts
            .read()
            .await
            .values()
            .find(|cart| cart.user_id() == user_id && !cart.is_completed())
            .cloned())
    }
}

#[async_trait]
impl OrderStore for InMemoryReadStore {
    async fn insert_order(&self, order: &Order) -> Result<bool> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id()) {
            return Ok(false);
        }
        orders.insert(order.id(), order.clone());
        Ok(true)
    }

    async fn save_order(&self, order: &Order) -> Result<()> {
        self.orders.write().await.insert(order.id(), order.clone());
        Ok(())
    }

    async fn find_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&order_id).cloned())
    }
}
