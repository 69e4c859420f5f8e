//! Shopping cart aggregate.

use common::{CartId, Money, ProductId, UserId};

use super::{CartError, Item};

/// Shopping cart aggregate root.
///
/// Invariants:
/// - items are unique by product id; setting an existing product replaces it in place
/// - `total_price` always equals the sum of the item totals
/// - once completed, items and total are frozen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingCart {
    id: CartId,
    user_id: UserId,
    completed: bool,
    items: Vec<Item>,
    total_price: Money,
}

impl ShoppingCart {
    /// Creates a new, empty and incomplete cart for a user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            id: CartId::new(),
            user_id,
            completed: false,
            items: Vec::new(),
            total_price: Money::zero(),
        }
    }

    /// Rebuilds a cart from stored or received parts.
    ///
    /// The total is recomputed from the items; duplicated product ids keep the last entry.
    /// Fails with [`CartError::CartTotalOverflow`] if the items do not sum.
    pub fn restore(
        id: CartId,
        user_id: UserId,
        completed: bool,
        items: impl IntoIterator<Item = Item>,
    ) -> Result<Self, CartError> {
        let mut cart = Self {
            id,
            user_id,
            completed,
            items: Vec::new(),
            total_price: Money::zero(),
        };
        for item in items {
            cart.upsert(item);
        }
        cart.total_price = cart.sum_items()?;
        Ok(cart)
    }
}

// Query methods
impl ShoppingCart {
    pub fn id(&self) -> CartId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Returns the item for a product, if present.
    pub fn item(&self, product_id: ProductId) -> Option<&Item> {
        self.items.iter().find(|item| item.product_id() == product_id)
    }

    pub fn total_price(&self) -> Money {
        self.total_price
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Only incomplete carts can be deleted.
    pub fn is_deletable(&self) -> bool {
        !self.completed
    }

    /// A cart can be completed once: while incomplete, non-empty and with a positive total.
    pub fn is_completable(&self) -> bool {
        !self.completed && !self.items.is_empty() && self.total_price.is_positive()
    }
}

// Command methods
impl ShoppingCart {
    /// Marks the cart as completed.
    pub fn complete(&mut self) -> Result<(), CartError> {
        if !self.is_completable() {
            return Err(CartError::IllegalState {
                cart_id: self.id,
                reason: "shopping cart can't be completed",
            });
        }
        self.completed = true;
        Ok(())
    }

    /// Inserts or replaces the item for `product_id` and recomputes the total.
    pub fn set_item(
        &mut self,
        product_id: ProductId,
        unit_price: Money,
        quantity: u32,
    ) -> Result<(), CartError> {
        self.ensure_open("can't set item to completed cart")?;
        let item = Item::new(product_id, unit_price, quantity)?;

        // Check the new total before touching the items.
        let others = self
            .items
            .iter()
            .filter(|existing| existing.product_id() != product_id);
        let total = Money::checked_sum(others.chain([&item]).map(Item::total_price))
            .ok_or(CartError::CartTotalOverflow { cart_id: self.id })?;

        self.upsert(item);
        self.total_price = total;
        Ok(())
    }

    /// Removes the item for `product_id`.
    ///
    /// Returns `false` when the product was not in the cart; that is not an error.
    pub fn delete_item(&mut self, product_id: ProductId) -> Result<bool, CartError> {
        self.ensure_open("can't delete item from completed cart")?;
        let before = self.items.len();
        self.items.retain(|item| item.product_id() != product_id);
        if self.items.len() == before {
            return Ok(false);
        }
        self.total_price = self.sum_items()?;
        Ok(true)
    }

    fn ensure_open(&self, reason: &'static str) -> Result<(), CartError> {
        if self.completed {
            return Err(CartError::IllegalState {
                cart_id: self.id,
                reason,
            });
        }
        Ok(())
    }

    fn upsert(&mut self, item: Item) {
        match self
            .items
            .iter_mut()
            .find(|existing| existing.product_id() == item.product_id())
        {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    fn sum_items(&self) -> Result<Money, CartError> {
        Money::checked_sum(self.items.iter().map(Item::total_price))
            .ok_or(CartError::CartTotalOverflow { cart_id: self.id })
    }
}
