//! Read model storage.
//!
//! One row per cart and one per order, written only by the materializers and
//! read synchronously by the query ports.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryReadStore;
pub use postgres::PostgresReadStore;
pub use store::{CartStore, OrderStore};
