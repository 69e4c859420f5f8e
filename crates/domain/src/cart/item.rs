//! Cart line item.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use super::CartError;

/// A line of a shopping cart.
///
/// `total_price` is derived from `unit_price × quantity` and never set on its own.
/// Deserialization goes through the same validation as [`Item::new`], so a stored
/// or received item cannot carry an inconsistent total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ItemRecord", into = "ItemRecord")]
pub struct Item {
    product_id: ProductId,
    unit_price: Money,
    quantity: u32,
    total_price: Money,
}

impl Item {
    /// Creates an item, rejecting non-positive prices, zero quantities and totals
    /// that overflow.
    pub fn new(product_id: ProductId, unit_price: Money, quantity: u32) -> Result<Self, CartError> {
        if !unit_price.is_positive() || quantity == 0 {
            return Err(CartError::InvalidItem {
                product_id,
                unit_price,
                quantity,
            });
        }

        let total_price = unit_price
            .checked_mul(quantity)
            .ok_or(CartError::ItemTotalOverflow {
                product_id,
                unit_price,
                quantity,
            })?;

        Ok(Self {
            product_id,
            unit_price,
            quantity,
            total_price,
        })
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns `unit_price × quantity`.
    pub fn total_price(&self) -> Money {
        self.total_price
    }
}

/// Flat wire/storage shape of an item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemRecord {
    product_id: ProductId,
    unit_price: Money,
    quantity: u32,
    #[serde(default)]
    total_price: Money,
}

impl TryFrom<ItemRecord> for Item {
    type Error = CartError;

    fn try_from(record: ItemRecord) -> Result<Self, Self::Error> {
        // The carried total is informational only.
        Item::new(record.product_id, record.unit_price, record.quantity)
    }
}

impl From<Item> for ItemRecord {
    fn from(item: Item) -> Self {
        Self {
            product_id: item.product_id,
            unit_price: item.unit_price,
            quantity: item.quantity,
            total_price: item.total_price,
        }
    }
}
