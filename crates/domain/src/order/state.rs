//! Order state machine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::OrderError;

/// The state of an order in the fulfillment saga.
///
/// Each state carries a weight; a normal transition is legal only towards a
/// strictly heavier state. `Done` and `Rejected` share the maximum weight, so
/// neither can follow the other.
///
/// ```text
/// Created(0) ──► ValidatingItems(1) ──► ValidatingBalance(2) ──► Done(3)
///     │                 │                       │
///     └─────────────────┴───────────────────────┴──► Rejected(3)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    /// Order was built from a completed cart.
    #[default]
    Created,

    /// Waiting for the stock validator.
    ValidatingItems,

    /// Waiting for the balance validator.
    ValidatingBalance,

    /// Both validations passed (terminal state).
    Done,

    /// A validation failed (terminal state).
    Rejected,
}

impl OrderState {
    /// All states, in weight order.
    pub const ALL: [OrderState; 5] = [
        OrderState::Created,
        OrderState::ValidatingItems,
        OrderState::ValidatingBalance,
        OrderState::Done,
        OrderState::Rejected,
    ];

    /// Returns the ordering weight of the state.
    pub fn weight(&self) -> u8 {
        match self {
            OrderState::Created => 0,
            OrderState::ValidatingItems => 1,
            OrderState::ValidatingBalance => 2,
            OrderState::Done | OrderState::Rejected => 3,
        }
    }

    /// Returns true if `target` is strictly heavier than this state.
    pub fn can_advance_to(&self, target: OrderState) -> bool {
        target.weight() > self.weight()
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_final(&self) -> bool {
        matches!(self, OrderState::Done | OrderState::Rejected)
    }

    /// Returns the state name as it appears on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Created => "CREATED",
            OrderState::ValidatingItems => "VALIDATING_ITEMS",
            OrderState::ValidatingBalance => "VALIDATING_BALANCE",
            OrderState::Done => "DONE",
            OrderState::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderState {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| OrderError::UnknownState(s.to_string()))
    }
}
