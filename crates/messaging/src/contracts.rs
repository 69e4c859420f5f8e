//! Flat records carried on the topics.
//!
//! Every record mirrors the aggregate fields with camelCase names and carries no
//! correlation metadata beyond the aggregate id.

use common::{CartId, Money, OrderId, UserId};
use domain::{CartError, Item, Order, OrderState, ShoppingCart, ValidationOutcomes};
use serde::{Deserialize, Deserializer, Serialize};

/// A cart as sent on the cart topics and embedded in order records.
///
/// `total_price` is the total the sender computed; [`CartRecord::into_cart`]
/// recomputes it from the items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRecord {
    pub id: CartId,
    pub user_id: UserId,
    pub completed: bool,
    #[serde(default)]
    pub items: Vec<Item>,
    pub total_price: Money,
}

impl CartRecord {
    /// Rebuilds the aggregate.
    pub fn into_cart(self) -> Result<ShoppingCart, CartError> {
        ShoppingCart::restore(self.id, self.user_id, self.completed, self.items)
    }
}

impl From<&ShoppingCart> for CartRecord {
    fn from(cart: &ShoppingCart) -> Self {
        Self {
            id: cart.id(),
            user_id: cart.user_id(),
            completed: cart.is_completed(),
            items: cart.items().to_vec(),
            total_price: cart.total_price(),
        }
    }
}

/// Payload of `cart-deleted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartDeleted {
    pub id: CartId,
}

/// An order as sent on `order-created` and `order-updated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: OrderId,
    pub shopping_cart: CartRecord,
    pub state: OrderState,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<String>,
}

impl OrderRecord {
    /// Rebuilds the aggregate.
    pub fn into_order(self) -> Result<Order, CartError> {
        Ok(Order::restore(
            self.id,
            self.shopping_cart.into_cart()?,
            self.state,
            self.errors,
        ))
    }
}

impl From<&Order> for OrderRecord {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id(),
            shopping_cart: CartRecord::from(order.shopping_cart()),
            state: order.state(),
            errors: order.errors().to_vec(),
        }
    }
}

/// Payload of `order-state-changed`, the validators' reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStateChanged {
    pub id: OrderId,
    pub state: OrderState,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<String>,
}

impl OrderStateChanged {
    pub fn new(id: OrderId, state: OrderState) -> Self {
        Self {
            id,
            state,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(mut self, errors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.errors.extend(errors.into_iter().map(Into::into));
        self
    }
}

/// Payload of the item and balance validation requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequested {
    pub id: OrderId,
    pub shopping_cart: CartRecord,
    pub success_state: OrderState,
    pub failure_state: OrderState,
}

impl ValidationRequested {
    pub fn new(order: &Order, outcomes: ValidationOutcomes) -> Self {
        Self {
            id: order.id(),
            shopping_cart: CartRecord::from(order.shopping_cart()),
            success_state: outcomes.success_state,
            failure_state: outcomes.failure_state,
        }
    }
}

/// Payload of `stock-restore-requested`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRestoreRequested {
    pub id: OrderId,
    pub shopping_cart: CartRecord,
}

impl From<&Order> for StockRestoreRequested {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id(),
            shopping_cart: CartRecord::from(order.shopping_cart()),
        }
    }
}

// Absent and null error lists are the same thing.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
