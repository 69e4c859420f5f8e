//! Shopping cart use case.

use common::{CartId, Money, ProductId, UserId};

use crate::ports::{CartCommandPort, CartQueryPort};

use super::{CartError, ShoppingCart};

/// Service for managing shopping carts.
///
/// Each operation validates against a snapshot read from the query port and then
/// enqueues the change on the command port. The returned cart is the snapshot the
/// change was computed on, not a read-back.
pub struct ShoppingCartService<C, Q> {
    commands: C,
    queries: Q,
}

impl<C: CartCommandPort, Q: CartQueryPort> ShoppingCartService<C, Q> {
    /// Creates a new shopping cart service.
    pub fn new(commands: C, queries: Q) -> Self {
        Self { commands, queries }
    }

    /// Creates an empty cart for a user.
    ///
    /// Fails with [`CartError::IncompleteCartExists`] if the user already has one.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, user_id: UserId) -> Result<ShoppingCart, CartError> {
        if let Some(existing) = self.queries.get_incomplete_by_user(user_id).await? {
            tracing::warn!(cart_id = %existing.id(), "Incomplete shopping cart already exists");
            return Err(CartError::IncompleteCartExists {
                cart_id: existing.id(),
            });
        }

        let cart = ShoppingCart::new(user_id);
        self.commands.create(&cart).await?;

        metrics::counter!("carts_created_total").increment(1);
        tracing::info!(cart_id = %cart.id(), "Shopping cart created");
        Ok(cart)
    }

    /// Loads a cart owned by `user_id`.
    #[tracing::instrument(skip(self))]
    pub async fn get(
        &self,
        cart_id: CartId,
        user_id: UserId,
    ) -> Result<Option<ShoppingCart>, CartError> {
        Ok(self.queries.get_by_id_and_user(cart_id, user_id).await?)
    }

    /// Deletes an incomplete cart.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, cart_id: CartId, user_id: UserId) -> Result<ShoppingCart, CartError> {
        let cart = self.load(cart_id, user_id).await?;
        if !cart.is_deletable() {
            return Err(CartError::IllegalState {
                cart_id,
                reason: "can't delete completed cart",
            });
        }

        self.commands.delete(cart_id).await?;

        metrics::counter!("carts_deleted_total").increment(1);
        tracing::info!("Shopping cart deleted");
        Ok(cart)
    }

    /// Completes a cart, which triggers order creation once applied.
    #[tracing::instrument(skip(self))]
    pub async fn complete(
        &self,
        cart_id: CartId,
        user_id: UserId,
    ) -> Result<ShoppingCart, CartError> {
        let mut cart = self.load(cart_id, user_id).await?;
        cart.complete()?;

        self.commands.complete(&cart).await?;

        metrics::counter!("carts_completed_total").increment(1);
        tracing::info!(total_price = %cart.total_price(), "Shopping cart completed");
        Ok(cart)
    }

    /// Inserts or replaces an item.
    #[tracing::instrument(skip(self))]
    pub async fn set_item(
        &self,
        cart_id: CartId,
        user_id: UserId,
        product_id: ProductId,
        unit_price: Money,
        quantity: u32,
    ) -> Result<ShoppingCart, CartError> {
        let mut cart = self.load(cart_id, user_id).await?;
        cart.set_item(product_id, unit_price, quantity)?;

        self.commands.update_items(&cart).await?;

        tracing::debug!(total_price = %cart.total_price(), "Item set");
        Ok(cart)
    }

    /// Removes an item.
    ///
    /// Removing a product that is not in the cart returns the cart unchanged and
    /// enqueues nothing.
    #[tracing::instrument(skip(self))]
    pub async fn delete_item(
        &self,
        cart_id: CartId,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<ShoppingCart, CartError> {
        let mut cart = self.load(cart_id, user_id).await?;
        if cart.delete_item(product_id)? {
            self.commands.update_items(&cart).await?;
            tracing::debug!(total_price = %cart.total_price(), "Item deleted");
        }
        Ok(cart)
    }

    async fn load(&self, cart_id: CartId, user_id: UserId) -> Result<ShoppingCart, CartError> {
        self.queries
            .get_by_id_and_user(cart_id, user_id)
            .await?
            .ok_or(CartError::NotFound { cart_id })
    }
}
