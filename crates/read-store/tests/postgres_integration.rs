//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p read-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use common::{Money, ProductId, UserId};
use domain::{Order, OrderState, ShoppingCart};
use read_store::{CartStore, OrderStore, PostgresReadStore, StoreError};
use serial_test::serial;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let store = PostgresReadStore::connect(&connection_string).await.unwrap();
            store.run_migrations().await.unwrap();
            store.pool().close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresReadStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE shopping_carts, orders")
        .execute(&pool)
        .await
        .unwrap();

    PostgresReadStore::new(pool)
}

fn cart_with_items(user: i64) -> ShoppingCart {
    let mut cart = ShoppingCart::new(UserId::new(user));
    cart.set_item(ProductId::new(100), Money::from_cents(1999), 1)
        .unwrap();
    cart.set_item(ProductId::new(200), Money::from_cents(305), 2)
        .unwrap();
    cart
}

fn completed_cart(user: i64) -> ShoppingCart {
    let mut cart = cart_with_items(user);
    cart.complete().unwrap();
    cart
}

#[tokio::test]
#[serial]
async fn insert_and_find_cart() {
    let store = get_test_store().await;
    let cart = cart_with_items(7);

    store.insert_cart(&cart).await.unwrap();

    let found = store.find_cart(cart.id()).await.unwrap().unwrap();
    assert_eq!(found, cart);
    assert_eq!(found.total_price(), Money::from_cents(1999 + 610));

    let by_user = store
        .find_cart_by_id_and_user(cart.id(), UserId::new(7))
        .await
        .unwrap();
    assert_eq!(by_user, Some(cart.clone()));

    let other_user = store
        .find_cart_by_id_and_user(cart.id(), UserId::new(8))
        .await
        .unwrap();
    assert!(other_user.is_none());
}

#[tokio::test]
#[serial]
async fn unique_incomplete_cart_per_user() {
    let store = get_test_store().await;
    store.insert_cart(&cart_with_items(7)).await.unwrap();

    let result = store.insert_cart(&ShoppingCart::new(UserId::new(7))).await;

    assert!(matches!(
        result,
        Err(StoreError::IncompleteCartExists { .. })
    ));
}

#[tokio::test]
#[serial]
async fn completing_frees_the_unique_slot() {
    let store = get_test_store().await;
    let mut cart = cart_with_items(7);
    store.insert_cart(&cart).await.unwrap();

    cart.complete().unwrap();
    store.save_cart(&cart).await.unwrap();
    let next = ShoppingCart::new(UserId::new(7));
    store.insert_cart(&next).await.unwrap();

    let incomplete = store
        .find_incomplete_cart_by_user(UserId::new(7))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(incomplete.id(), next.id());
}

#[tokio::test]
#[serial]
async fn reinserting_existing_cart_is_noop() {
    let store = get_test_store().await;
    let cart = cart_with_items(7);
    store.insert_cart(&cart).await.unwrap();

    let stale = ShoppingCart::restore(cart.id(), cart.user_id(), false, Vec::new()).unwrap();
    store.insert_cart(&stale).await.unwrap();

    let found = store.find_cart(cart.id()).await.unwrap().unwrap();
    assert_eq!(found.items().len(), 2);
}

#[tokio::test]
#[serial]
async fn delete_cart() {
    let store = get_test_store().await;
    let cart = cart_with_items(7);
    store.insert_cart(&cart).await.unwrap();

    assert!(store.delete_cart(cart.id()).await.unwrap());
    assert!(!store.delete_cart(cart.id()).await.unwrap());
    assert!(store.find_cart(cart.id()).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn order_round_trip_with_errors() {
    let store = get_test_store().await;
    let mut order = Order::new(completed_cart(7)).unwrap();

    assert!(store.insert_order(&order).await.unwrap());
    let found = store.find_order(order.id()).await.unwrap().unwrap();
    assert_eq!(found, order);
    assert!(found.errors().is_empty());

    order.update_state(OrderState::ValidatingItems);
    order.reject(vec!["out of stock: 200".to_string()]);
    store.save_order(&order).await.unwrap();

    let found = store.find_order(order.id()).await.unwrap().unwrap();
    assert_eq!(found.state(), OrderState::Rejected);
    assert_eq!(found.errors(), ["out of stock: 200"]);
    assert_eq!(found.shopping_cart(), order.shopping_cart());
}

#[tokio::test]
#[serial]
async fn insert_order_does_not_overwrite() {
    let store = get_test_store().await;
    let mut order = Order::new(completed_cart(7)).unwrap();
    store.insert_order(&order).await.unwrap();
    order.update_state(OrderState::ValidatingBalance);
    store.save_order(&order).await.unwrap();

    let created_again = Order::restore(
        order.id(),
        order.shopping_cart().clone(),
        OrderState::Created,
        Vec::new(),
    );
    assert!(!store.insert_order(&created_again).await.unwrap());

    let found = store.find_order(order.id()).await.unwrap().unwrap();
    assert_eq!(found.state(), OrderState::ValidatingBalance);
}

#[tokio::test]
#[serial]
async fn unknown_state_is_an_invalid_row() {
    let store = get_test_store().await;
    let order = Order::new(completed_cart(7)).unwrap();
    store.insert_order(&order).await.unwrap();

    sqlx::query("UPDATE orders SET state = 'SHIPPED' WHERE id = $1")
        .bind(order.id().as_uuid())
        .execute(store.pool())
        .await
        .unwrap();

    let result = store.find_order(order.id()).await;
    assert!(matches!(result, Err(StoreError::InvalidRow(_))));
}
