//! Domain layer for the checkout system.
//!
//! This crate provides:
//! - the `ShoppingCart` aggregate and its `Item` lines
//! - the `Order` aggregate with its weight-ordered `OrderState`
//! - the split command/query ports the outer layers implement
//! - `ShoppingCartService`, the cart use case

pub mod cart;
pub mod error;
pub mod order;
pub mod ports;

pub use cart::{CartError, Item, ShoppingCart, ShoppingCartService};
pub use error::PortError;
pub use order::{Order, OrderError, OrderState};
pub use ports::{
    CartCommandPort, CartQueryPort, OrderCommandPort, OrderQueryPort, ValidationOutcomes,
};
