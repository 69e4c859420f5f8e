use async_trait::async_trait;
use common::{CartId, OrderId, UserId};
use domain::{Order, ShoppingCart};

use crate::Result;

/// Cart rows.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Inserts a new cart.
    ///
    /// Inserting a cart whose id is already stored is a no-op. Fails with
    /// `IncompleteCartExists` if another incomplete cart of the same user is
    /// stored; the check and the write are atomic.
    async fn insert_cart(&self, cart: &ShoppingCart) -> Result<()>;

    /// Inserts or replaces a cart row.
    async fn save_cart(&self, cart: &ShoppingCart) -> Result<()>;

    /// Deletes a cart. Returns false if no row existed.
    async fn delete_cart(&self, cart_id: CartId) -> Result<bool>;

    /// Loads a cart by id.
    async fn find_cart(&self, cart_id: CartId) -> Result<Option<ShoppingCart>>;

    /// Loads a cart by id if it belongs to `user_id`.
    async fn find_cart_by_id_and_user(
        &self,
        cart_id: CartId,
        user_id: UserId,
    ) -> Result<Option<ShoppingCart>>;

    /// Loads the user's incomplete cart, if any.
    async fn find_incomplete_cart_by_user(&self, user_id: UserId)
    -> Result<Option<ShoppingCart>>;
}

/// Order rows.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts an order unless a row with its id already exists.
    ///
    /// Returns true if the row was inserted.
    async fn insert_order(&self, order: &Order) -> Result<bool>;

    /// Inserts or replaces an order row.
    async fn save_order(&self, order: &Order) -> Result<()>;

    /// Loads an order by id.
    async fn find_order(&self, order_id: OrderId) -> Result<Option<Order>>;
}
