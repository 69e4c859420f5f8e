//! Command and query ports.
//!
//! Writes and reads are split: command ports only enqueue intent and report
//! whether that succeeded, query ports read the (eventually consistent) read
//! model synchronously. A value passed to a command port is not queryable until
//! the corresponding message has been applied.

use async_trait::async_trait;
use common::{CartId, OrderId, UserId};

use crate::cart::ShoppingCart;
use crate::error::PortError;
use crate::order::{Order, OrderState};

/// One-way cart commands.
#[async_trait]
pub trait CartCommandPort: Send + Sync {
    /// Enqueues persistence of a newly created cart.
    async fn create(&self, cart: &ShoppingCart) -> Result<(), PortError>;

    /// Enqueues deletion of a cart.
    async fn delete(&self, cart_id: CartId) -> Result<(), PortError>;

    /// Enqueues completion of a cart; `cart` is the completed snapshot.
    async fn complete(&self, cart: &ShoppingCart) -> Result<(), PortError>;

    /// Enqueues the new item list and total of a cart.
    async fn update_items(&self, cart: &ShoppingCart) -> Result<(), PortError>;
}

/// Synchronous cart reads.
#[async_trait]
pub trait CartQueryPort: Send + Sync {
    /// Returns the cart if it exists and belongs to `user_id`.
    async fn get_by_id_and_user(
        &self,
        cart_id: CartId,
        user_id: UserId,
    ) -> Result<Option<ShoppingCart>, PortError>;

    /// Returns the user's incomplete cart, if any.
    async fn get_incomplete_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<ShoppingCart>, PortError>;
}

/// Next states carried by a validation request.
///
/// The external validator replies with `success_state` or `failure_state` on
/// the state-changed channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOutcomes {
    pub success_state: OrderState,
    pub failure_state: OrderState,
}

impl ValidationOutcomes {
    pub fn new(success_state: OrderState, failure_state: OrderState) -> Self {
        Self {
            success_state,
            failure_state,
        }
    }
}

/// One-way order commands.
#[async_trait]
pub trait OrderCommandPort: Send + Sync {
    /// Enqueues persistence of a newly created order.
    async fn create(&self, order: &Order) -> Result<(), PortError>;

    /// Enqueues the order's new state and errors.
    async fn update(&self, order: &Order) -> Result<(), PortError>;

    /// Requests stock validation of the order's items.
    async fn validate_items(
        &self,
        order: &Order,
        outcomes: ValidationOutcomes,
    ) -> Result<(), PortError>;

    /// Requests balance validation of the order's total.
    async fn validate_balance(
        &self,
        order: &Order,
        outcomes: ValidationOutcomes,
    ) -> Result<(), PortError>;

    /// Requests that stock reserved for the order be released.
    async fn restore_stock(&self, order: &Order) -> Result<(), PortError>;
}

/// Synchronous order reads.
#[async_trait]
pub trait OrderQueryPort: Send + Sync {
    /// Returns the order if it exists.
    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, PortError>;
}
