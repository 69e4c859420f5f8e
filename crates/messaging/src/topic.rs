//! Named channels.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::MessagingError;

/// A named channel between the write side, the materializers and the external
/// validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    CartCreated,
    CartDeleted,
    CartCompleted,
    CartItemUpdated,
    OrderCreated,
    OrderUpdated,
    /// Generic reply channel of the external validators.
    OrderStateChanged,
    ItemValidationRequested,
    BalanceValidationRequested,
    StockRestoreRequested,
}

impl Topic {
    /// Every topic of the contract.
    pub const ALL: [Topic; 10] = [
        Topic::CartCreated,
        Topic::CartDeleted,
        Topic::CartCompleted,
        Topic::CartItemUpdated,
        Topic::OrderCreated,
        Topic::OrderUpdated,
        Topic::OrderStateChanged,
        Topic::ItemValidationRequested,
        Topic::BalanceValidationRequested,
        Topic::StockRestoreRequested,
    ];

    /// Returns the channel name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::CartCreated => "cart-created",
            Topic::CartDeleted => "cart-deleted",
            Topic::CartCompleted => "cart-completed",
            Topic::CartItemUpdated => "cart-item-updated",
            Topic::OrderCreated => "order-created",
            Topic::OrderUpdated => "order-updated",
            Topic::OrderStateChanged => "order-state-changed",
            Topic::ItemValidationRequested => "item-validation-requested",
            Topic::BalanceValidationRequested => "balance-validation-requested",
            Topic::StockRestoreRequested => "stock-restore-requested",
        }
    }

    /// Returns true for channels consumed by services outside this system.
    pub fn is_outbound(&self) -> bool {
        matches!(
            self,
            Topic::ItemValidationRequested
                | Topic::BalanceValidationRequested
                | Topic::StockRestoreRequested
        )
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Topic {
    type Err = MessagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .into_iter()
            .find(|topic| topic.as_str() == s)
            .ok_or_else(|| MessagingError::UnknownTopic(s.to_string()))
    }
}
