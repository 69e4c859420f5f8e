//! Shared identifiers and value objects for the checkout workspace.

mod money;
mod types;

pub use money::Money;
pub use types::{CartId, OrderId, ProductId, UserId};
