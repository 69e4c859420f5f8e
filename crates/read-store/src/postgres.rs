use async_trait::async_trait;
use common::{CartId, Money, OrderId, UserId};
use domain::{Item, Order, OrderState, ShoppingCart};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{CartStore, OrderStore, Result, StoreError};

const INCOMPLETE_CART_INDEX: &str = "shopping_carts_one_incomplete_per_user";

/// PostgreSQL-backed read model.
#[derive(Clone)]
pub struct PostgresReadStore {
    pool: PgPool,
}

/// Cart snapshot embedded in an order row.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartDocument {
    id: CartId,
    user_id: UserId,
    completed: bool,
    items: Vec<Item>,
    total_price: Money,
}

impl From<&ShoppingCart> for CartDocument {
    fn from(cart: &ShoppingCart) -> Self {
        Self {
            id: cart.id(),
            user_id: cart.user_id(),
            completed: cart.is_completed(),
            items: cart.items().to_vec(),
            total_price: cart.total_price(),
        }
    }
}

impl PostgresReadStore {
    /// Creates a new PostgreSQL read store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and returns a store.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_cart(row: PgRow) -> Result<ShoppingCart> {
        let items: Vec<Item> = serde_json::from_value(row.try_get("items")?)?;
        let cart = ShoppingCart::restore(
            CartId::from_uuid(row.try_get::<Uuid, _>("id")?),
            UserId::new(row.try_get("user_id")?),
            row.try_get("completed")?,
            items,
        )
        .map_err(|e| StoreError::InvalidRow(e.to_string()))?;

        let stored_total = Money::from_cents(row.try_get("total_price")?);
        if stored_total != cart.total_price() {
            tracing::warn!(
                cart_id = %cart.id(),
                %stored_total,
                computed_total = %cart.total_price(),
                "Stored cart total differs from its items"
            );
        }
        Ok(cart)
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let document: CartDocument = serde_json::from_value(row.try_get("shopping_cart")?)?;
        let cart = ShoppingCart::restore(
            document.id,
            document.user_id,
            document.completed,
            document.items,
        )
        .map_err(|e| StoreError::InvalidRow(e.to_string()))?;

        let state: String = row.try_get("state")?;
        let state: OrderState = state
            .parse()
            .map_err(|e: domain::OrderError| StoreError::InvalidRow(e.to_string()))?;

        let errors: Option<serde_json::Value> = row.try_get("errors")?;
        let errors: Vec<String> = match errors {
            Some(value) => serde_json::from_value(value)?,
            None => Vec::new(),
        };

        Ok(Order::restore(
            OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            cart,
            state,
            errors,
        ))
    }

    fn map_cart_write_error(e: sqlx::Error, cart: &ShoppingCart) -> StoreError {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.constraint() == Some(INCOMPLETE_CART_INDEX)
        {
            return StoreError::IncompleteCartExists {
                user_id: cart.user_id(),
            };
        }
        StoreError::Database(e)
    }

    // Empty lists are stored as NULL.
    fn errors_column(order: &Order) -> Result<Option<serde_json::Value>> {
        if order.errors().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::to_value(order.errors())?))
    }
}

#[async_trait]
impl CartStore for PostgresReadStore {
    async fn insert_cart(&self, cart: &ShoppingCart) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO shopping_carts (id, user_id, completed, items, total_price)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(cart.id().as_uuid())
        .bind(cart.user_id().as_i64())
        .bind(cart.is_completed())
        .bind(serde_json::to_value(cart.items())?)
        .bind(cart.total_price().cents())
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_cart_write_error(e, cart))?;

        Ok(())
    }

    async fn save_cart(&self, cart: &ShoppingCart) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO shopping_carts (id, user_id, completed, items, total_price)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET completed = EXCLUDED.completed,
                items = EXCLUDED.items,
                total_price = EXCLUDED.total_price,
                updated_at = NOW()
            "#,
        )
        .bind(cart.id().as_uuid())
        .bind(cart.user_id().as_i64())
        .bind(cart.is_completed())
        .bind(serde_json::to_value(cart.items())?)
        .bind(cart.total_price().cents())
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_cart_write_error(e, cart))?;

        Ok(())
    }

    async fn delete_cart(&self, cart_id: CartId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM shopping_carts WHERE id = $1")
            .bind(cart_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_cart(&self, cart_id: CartId) -> Result<Option<ShoppingCart>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, completed, items, total_price
            FROM shopping_carts
            WHERE id = $1
            "#,
        )
        .bind(cart_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_cart).transpose()
    }

    async fn find_cart_by_id_and_user(
        &self,
        cart_id: CartId,
        user_id: UserId,
    ) -> Result<Option<ShoppingCart>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, completed, items, total_price
            FROM shopping_carts
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(cart_id.as_uuid())
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_cart).transpose()
    }

    async fn find_incomplete_cart_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<ShoppingCart>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, completed, items, total_price
            FROM shopping_carts
            WHERE user_id = $1 AND NOT completed
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_cart).transpose()
    }
}

#[async_trait]
impl OrderStore for PostgresReadStore {
    async fn insert_order(&self, order: &Order) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO orders (id, shopping_cart, state, errors)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(serde_json::to_value(CartDocument::from(order.shopping_cart()))?)
        .bind(order.state().as_str())
        .bind(Self::errors_column(order)?)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn save_order(&self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, shopping_cart, state, errors)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET shopping_cart = EXCLUDED.shopping_cart,
                state = EXCLUDED.state,
                errors = EXCLUDED.errors,
                updated_at = NOW()
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(serde_json::to_value(CartDocument::from(order.shopping_cart()))?)
        .bind(order.state().as_str())
        .bind(Self::errors_column(order)?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT id, shopping_cart, state, errors
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }
}
