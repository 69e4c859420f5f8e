//! Order aggregate and its state machine.

mod aggregate;
mod state;

pub use aggregate::Order;
pub use state::OrderState;

use common::{CartId, OrderId};
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The order is `Done` or `Rejected` and cannot change anymore.
    #[error("Order {order_id} is in final state {state}")]
    IllegalOrderState { order_id: OrderId, state: OrderState },

    /// The target state is not heavier than the current one.
    #[error("Order {order_id} can't move from {current} to {target}")]
    PreviousOrderStateUpdate {
        order_id: OrderId,
        current: OrderState,
        target: OrderState,
    },

    /// Orders are only built from completed carts.
    #[error("Shopping cart {cart_id} is not completed")]
    CartNotCompleted { cart_id: CartId },

    /// A state name that does not exist.
    #[error("Unknown order state: {0}")]
    UnknownState(String),
}
