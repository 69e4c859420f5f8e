//! Shopping cart aggregate and use case.

mod aggregate;
mod item;
mod service;

pub use aggregate::ShoppingCart;
pub use item::Item;
pub use service::ShoppingCartService;

use common::{CartId, Money, ProductId};
use thiserror::Error;

use crate::error::PortError;

/// Errors that can occur during shopping cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// No cart with this id belongs to the user.
    #[error("Shopping cart not found: {cart_id}")]
    NotFound { cart_id: CartId },

    /// The user already has an incomplete cart.
    #[error("Already exists incomplete shopping cart with id={cart_id}")]
    IncompleteCartExists { cart_id: CartId },

    /// The cart is not in a state that allows the operation.
    #[error("Illegal state of shopping cart {cart_id}: {reason}")]
    IllegalState {
        cart_id: CartId,
        reason: &'static str,
    },

    /// Unit price or quantity is not strictly positive.
    #[error(
        "Invalid item {product_id}: unit price ({unit_price}) and quantity ({quantity}) must be greater than 0"
    )]
    InvalidItem {
        product_id: ProductId,
        unit_price: Money,
        quantity: u32,
    },

    /// Unit price × quantity does not fit the money range.
    #[error("Item {product_id} total overflows: {unit_price} x {quantity}")]
    ItemTotalOverflow {
        product_id: ProductId,
        unit_price: Money,
        quantity: u32,
    },

    /// The sum of the item totals does not fit the money range.
    #[error("Shopping cart {cart_id} total overflows")]
    CartTotalOverflow { cart_id: CartId },

    /// A port failed to read or enqueue.
    #[error(transparent)]
    Port(#[from] PortError),
}
