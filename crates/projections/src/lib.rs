//! Read model materializers.
//!
//! This crate provides the apply side of the checkout system:
//! - [`Materializer`] trait for applying topic messages to the read model
//! - [`CartMaterializer`] and [`OrderMaterializer`], which also re-enter the
//!   order saga
//! - [`MessageProcessor`] for routing bus messages to materializers

pub mod cart;
pub mod error;
pub mod materializer;
pub mod order;
pub mod processor;

pub use cart::CartMaterializer;
pub use error::{ProjectionError, Result};
pub use materializer::{Materializer, Outcome};
pub use order::OrderMaterializer;
pub use processor::MessageProcessor;
