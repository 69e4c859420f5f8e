//! Order aggregate implementation.

use common::{Money, OrderId};

use crate::cart::ShoppingCart;

use super::{OrderError, OrderState};

/// Order aggregate root.
///
/// Owns an immutable snapshot of the completed cart it was built from. The state
/// only moves forward and errors only grow, and only when rejecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    shopping_cart: ShoppingCart,
    state: OrderState,
    errors: Vec<String>,
}

impl Order {
    /// Creates a new order in [`OrderState::Created`] from a completed cart.
    pub fn new(shopping_cart: ShoppingCart) -> Result<Self, OrderError> {
        if !shopping_cart.is_completed() {
            return Err(OrderError::CartNotCompleted {
                cart_id: shopping_cart.id(),
            });
        }

        Ok(Self {
            id: OrderId::new(),
            shopping_cart,
            state: OrderState::Created,
            errors: Vec::new(),
        })
    }

    /// Rebuilds an order from stored or received parts.
    pub fn restore(
        id: OrderId,
        shopping_cart: ShoppingCart,
        state: OrderState,
        errors: Vec<String>,
    ) -> Self {
        Self {
            id,
            shopping_cart,
            state,
            errors,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn shopping_cart(&self) -> &ShoppingCart {
        &self.shopping_cart
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Total price of the cart snapshot.
    pub fn total_price(&self) -> Money {
        self.shopping_cart.total_price()
    }

    /// Returns true once the order is `Done` or `Rejected`.
    pub fn has_final_state(&self) -> bool {
        self.state.is_final()
    }

    /// Moves to `target` if it is strictly heavier than the current state.
    ///
    /// Returns `false` and leaves the order unchanged otherwise.
    pub fn update_state(&mut self, target: OrderState) -> bool {
        if !self.state.can_advance_to(target) {
            return false;
        }
        self.state = target;
        true
    }

    /// Moves to `Rejected` regardless of weight and appends `errors`.
    ///
    /// Callers must check [`Order::has_final_state`] first; a `Done` order is
    /// never rejected through the orchestrator.
    pub fn reject(&mut self, errors: impl IntoIterator<Item = String>) {
        self.state = OrderState::Rejected;
        self.errors.extend(errors);
    }
}
