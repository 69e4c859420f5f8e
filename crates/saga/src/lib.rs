//! Order fulfillment saga.
//!
//! An order built from a completed cart is driven through two external
//! validations by message exchange:
//! 1. Created → ValidatingItems: stock validation is requested
//! 2. ValidatingItems → ValidatingBalance: balance validation is requested
//! 3. ValidatingBalance → Done
//!
//! Any step may end in Rejected instead. Rejection after the stock step
//! requests that the reserved stock be restored.

pub mod actions;
pub mod error;
pub mod orchestrator;

pub use actions::{StateAction, Transition};
pub use error::{Result, SagaError};
pub use orchestrator::OrderOrchestrator;
