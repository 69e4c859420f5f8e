//! Integration tests for the shopping cart use case.
//!
//! The ports are backed by a store that applies every command immediately, so the
//! tests can observe the effect of each operation through the query side.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::{CartId, Money, ProductId, UserId};
use domain::{CartCommandPort, CartError, CartQueryPort, PortError, ShoppingCart, ShoppingCartService};

#[derive(Clone, Default)]
struct ImmediateCartStore {
    carts: Arc<Mutex<HashMap<CartId, ShoppingCart>>>,
    commands: Arc<Mutex<Vec<&'static str>>>,
    fail_on_publish: Arc<Mutex<bool>>,
}

impl ImmediateCartStore {
    fn record(&self, command: &'static str) -> Result<(), PortError> {
        if *self.fail_on_publish.lock().unwrap() {
            return Err(PortError::Publish {
                operation: command,
                reason: "broker unavailable".to_string(),
            });
        }
        self.commands.lock().unwrap().push(command);
        Ok(())
    }

    fn commands(&self) -> Vec<&'static str> {
        self.commands.lock().unwrap().clone()
    }

    fn stored(&self, cart_id: CartId) -> Option<ShoppingCart> {
        self.carts.lock().unwrap().get(&cart_id).cloned()
    }

    fn set_fail_on_publish(&self, fail: bool) {
        *self.fail_on_publish.lock().unwrap() = fail;
    }
}

#[async_trait]
impl CartCommandPort for ImmediateCartStore {
    async fn create(&self, cart: &ShoppingCart) -> Result<(), PortError> {
        self.record("create")?;
        self.carts.lock().unwrap().insert(cart.id(), cart.clone());
        Ok(())
    }

    async fn delete(&self, cart_id: CartId) -> Result<(), PortError> {
        self.record("delete")?;
        self.carts.lock().unwrap().remove(&cart_id);
        Ok(())
    }

    async fn complete(&self, cart: &ShoppingCart) -> Result<(), PortError> {
        self.record("complete")?;
        self.carts.lock().unwrap().insert(cart.id(), cart.clone());
        Ok(())
    }

    async fn update_items(&self, cart: &ShoppingCart) -> Result<(), PortError> {
        self.record("update_items")?;
        self.carts.lock().unwrap().insert(cart.id(), cart.clone());
        Ok(())
    }
}

#[async_trait]
impl CartQueryPort for ImmediateCartStore {
    async fn get_by_id_and_user(
        &self,
        cart_id: CartId,
        user_id: UserId,
    ) -> Result<Option<ShoppingCart>, PortError> {
        Ok(self
            .stored(cart_id)
            .filter(|cart| cart.user_id() == user_id))
    }

    async fn get_incomplete_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<ShoppingCart>, PortError> {
        Ok(self
            .carts
            .lock()
            .unwrap()
            .values()
            .find(|cart| cart.user_id() == user_id && !cart.is_completed())
            .cloned())
    }
}

fn create_service() -> (
    ShoppingCartService<ImmediateCartStore, ImmediateCartStore>,
    ImmediateCartStore,
) {
    let store = ImmediateCartStore::default();
    (ShoppingCartService::new(store.clone(), store.clone()), store)
}

const USER: UserId = UserId::new(7);

mod cart_lifecycle {
    use super::*;

    #[tokio::test]
    async fn create_returns_empty_cart() {
        let (service, store) = create_service();

        let cart = service.create(USER).await.unwrap();

        assert!(cart.is_empty());
        assert!(!cart.is_completed());
        assert_eq!(cart.total_price(), Money::zero());
        assert_eq!(store.commands(), vec!["create"]);
    }

    #[tokio::test]
    async fn second_incomplete_cart_is_a_conflict() {
        let (service, _) = create_service();
        let first = service.create(USER).await.unwrap();

        let result = service.create(USER).await;

        match result {
            Err(CartError::IncompleteCartExists { cart_id }) => assert_eq!(cart_id, first.id()),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_users_are_independent() {
        let (service, _) = create_service();
        service.create(USER).await.unwrap();
        assert!(service.create(UserId::new(8)).await.is_ok());
    }

    #[tokio::test]
    async fn set_item_replaces_existing_product() {
        let (service, _) = create_service();
        let cart = service.create(USER).await.unwrap();

        let cart = service
            .set_item(cart.id(), USER, ProductId::new(1), Money::from_cents(330), 2)
            .await
            .unwrap();
        assert_eq!(cart.total_price(), Money::from_cents(660));

        let cart = service
            .set_item(cart.id(), USER, ProductId::new(1), Money::from_cents(100), 1)
            .await
            .unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total_price(), Money::from_cents(100));
    }

    #[tokio::test]
    async fn complete_then_mutate_is_illegal() {
        let (service, store) = create_service();
        let cart = service.create(USER).await.unwrap();

        let result = service.complete(cart.id(), USER).await;
        assert!(matches!(result, Err(CartError::IllegalState { .. })));

        service
            .set_item(cart.id(), USER, ProductId::new(1), Money::from_cents(330), 2)
            .await
            .unwrap();
        let completed = service.complete(cart.id(), USER).await.unwrap();
        assert!(completed.is_completed());

        let result = service
            .set_item(cart.id(), USER, ProductId::new(2), Money::from_cents(100), 1)
            .await;
        assert!(matches!(result, Err(CartError::IllegalState { .. })));

        let result = service.delete(cart.id(), USER).await;
        assert!(matches!(result, Err(CartError::IllegalState { .. })));

        assert_eq!(store.commands(), vec!["create", "update_items", "complete"]);
    }

    #[tokio::test]
    async fn completing_frees_the_user_for_a_new_cart() {
        let (service, _) = create_service();
        let cart = service.create(USER).await.unwrap();
        service
            .set_item(cart.id(), USER, ProductId::new(1), Money::from_cents(330), 2)
            .await
            .unwrap();
        service.complete(cart.id(), USER).await.unwrap();

        assert!(service.create(USER).await.is_ok());
    }

    #[tokio::test]
    async fn delete_removes_incomplete_cart() {
        let (service, store) = create_service();
        let cart = service.create(USER).await.unwrap();

        service.delete(cart.id(), USER).await.unwrap();

        assert!(store.stored(cart.id()).is_none());
        assert!(service.get(cart.id(), USER).await.unwrap().is_none());
    }
}

mod items {
    use super::*;

    #[tokio::test]
    async fn invalid_item_is_rejected_without_publishing() {
        let (service, store) = create_service();
        let cart = service.create(USER).await.unwrap();

        let result = service
            .set_item(cart.id(), USER, ProductId::new(1), Money::from_cents(100), 0)
            .await;

        assert!(matches!(result, Err(CartError::InvalidItem { .. })));
        assert_eq!(store.commands(), vec!["create"]);
    }

    #[tokio::test]
    async fn overflowing_total_is_rejected_without_publishing() {
        let (service, store) = create_service();
        let cart = service.create(USER).await.unwrap();
        service
            .set_item(cart.id(), USER, ProductId::new(1), Money::from_cents(i64::MAX - 10), 1)
            .await
            .unwrap();

        let result = service
            .set_item(cart.id(), USER, ProductId::new(2), Money::from_cents(11), 1)
            .await;

        assert!(matches!(result, Err(CartError::CartTotalOverflow { .. })));
        assert_eq!(store.commands(), vec!["create", "update_items"]);
        let stored = store.stored(cart.id()).unwrap();
        assert_eq!(stored.total_price(), Money::from_cents(i64::MAX - 10));
    }

    #[tokio::test]
    async fn delete_absent_item_returns_unchanged_cart() {
        let (service, store) = create_service();
        let cart = service.create(USER).await.unwrap();
        service
            .set_item(cart.id(), USER, ProductId::new(100), Money::from_cents(1999), 1)
            .await
            .unwrap();

        let cart = service
            .delete_item(cart.id(), USER, ProductId::new(200))
            .await
            .unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total_price(), Money::from_cents(1999));
        assert_eq!(store.commands(), vec!["create", "update_items"]);
    }

    #[tokio::test]
    async fn set_then_delete_round_trip() {
        let (service, _) = create_service();
        let cart = service.create(USER).await.unwrap();
        service
            .set_item(cart.id(), USER, ProductId::new(1), Money::from_cents(330), 2)
            .await
            .unwrap();

        let cart = service
            .delete_item(cart.id(), USER, ProductId::new(1))
            .await
            .unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Money::zero());
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn unknown_cart_is_not_found() {
        let (service, _) = create_service();
        let cart_id = CartId::new();

        assert!(service.get(cart_id, USER).await.unwrap().is_none());
        assert!(matches!(
            service.complete(cart_id, USER).await,
            Err(CartError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete(cart_id, USER).await,
            Err(CartError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn cart_of_another_user_is_not_found() {
        let (service, _) = create_service();
        let cart = service.create(USER).await.unwrap();

        let result = service
            .set_item(cart.id(), UserId::new(99), ProductId::new(1), Money::from_cents(1), 1)
            .await;

        assert!(matches!(result, Err(CartError::NotFound { .. })));
    }

    #[tokio::test]
    async fn publish_failure_is_surfaced() {
        let (service, store) = create_service();
        store.set_fail_on_publish(true);

        let result = service.create(USER).await;

        assert!(matches!(
            result,
            Err(CartError::Port(PortError::Publish { operation: "create", .. }))
        ));
    }
}
