//! Integration tests for the checkout service.

use std::sync::OnceLock;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{Money, ProductId, UserId};
use domain::{CartError, OrderState, PortError};
use messaging::{
    InMemoryMessageBus, MessageBusExt, OrderStateChanged, RetryPolicy, Topic, ValidationRequested,
};
use metrics_exporter_prometheus::PrometheusHandle;
use read_store::{CartStore, InMemoryReadStore, OrderStore};
use service::{Checkout, Config};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| service::telemetry::install_metrics().unwrap())
        .clone()
}

fn checkout() -> Checkout<InMemoryReadStore> {
    let policy = RetryPolicy::new(2, Duration::from_millis(1), Duration::from_millis(1));
    Checkout::with_bus(
        InMemoryReadStore::new(),
        InMemoryMessageBus::with_history(),
        policy,
    )
}

async fn body_string(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = service::routes::admin_router(get_metrics_handle());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn test_metrics_report_checkout_activity() {
    let handle = get_metrics_handle();
    let checkout = checkout();
    let user = UserId::new(11);
    let cart = checkout.carts.create(user).await.unwrap();
    checkout.run_until_idle().await;
    checkout
        .carts
        .set_item(cart.id(), user, ProductId::new(3), Money::from_cents(999), 1)
        .await
        .unwrap();
    checkout.carts.complete(cart.id(), user).await.unwrap();
    checkout.run_until_idle().await;

    let response = service::routes::admin_router(handle)
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("carts_created_total"));
    assert!(body.contains("orders_created_total"));
    assert!(body.contains("materializer_messages_total"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = service::routes::admin_router(get_metrics_handle())
        .oneshot(
            Request::builder()
                .uri("/carts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_reaches_done() {
    let checkout = checkout();
    let user = UserId::new(1);

    let cart = checkout.carts.create(user).await.unwrap();
    checkout.run_until_idle().await;
    checkout
        .carts
        .set_item(cart.id(), user, ProductId::new(1), Money::from_cents(1250), 2)
        .await
        .unwrap();
    checkout.carts.complete(cart.id(), user).await.unwrap();
    checkout.run_until_idle().await;

    let requests = checkout
        .bus
        .inner()
        .published_on(Topic::ItemValidationRequested)
        .await;
    assert_eq!(requests.len(), 1);
    let request: ValidationRequested = requests[0].decode().unwrap();
    assert_eq!(request.shopping_cart.total_price, Money::from_cents(2500));

    for state in [OrderState::ValidatingBalance, OrderState::Done] {
        checkout
            .bus
            .publish_record(
                Topic::OrderStateChanged,
                request.id.to_string(),
                &OrderStateChanged::new(request.id, state),
            )
            .await
            .unwrap();
        checkout.run_until_idle().await;
    }

    let order = checkout.store.find_order(request.id).await.unwrap().unwrap();
    assert_eq!(order.state(), OrderState::Done);
    assert!(checkout.dead_letters().is_empty().await);
}

#[tokio::test]
async fn test_exhausted_publish_is_reported_and_dead_lettered() {
    let checkout = checkout();
    checkout.bus.inner().set_fail_on_publish(true).await;

    let result = checkout.carts.create(UserId::new(2)).await;

    assert!(matches!(
        result,
        Err(CartError::Port(PortError::Publish { .. }))
    ));
    let dead = checkout.dead_letters().snapshot().await;
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].message.topic, Topic::CartCreated);
    assert_eq!(dead[0].attempts, 2);
}

#[tokio::test]
async fn test_default_wiring_keeps_no_history() {
    let checkout = Checkout::new(InMemoryReadStore::new(), RetryPolicy::default());
    let user = UserId::new(4);

    let cart = checkout.carts.create(user).await.unwrap();
    checkout.run_until_idle().await;

    assert!(checkout.store.find_cart(cart.id()).await.unwrap().is_some());
    assert_eq!(checkout.bus.inner().pending_count().await, 0);
    assert!(checkout.bus.inner().history().await.is_empty());
}

#[tokio::test]
async fn test_serve_consumes_messages_until_shutdown() {
    let checkout = checkout();
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..Config::default()
    };
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let server = service::serve(&config, &checkout, get_metrics_handle(), async move {
        let _ = stop_rx.await;
    });

    let client = async {
        let cart = checkout.carts.create(UserId::new(3)).await.unwrap();
        let stored = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(stored) = checkout.store.find_cart(cart.id()).await.unwrap() {
                    return stored;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        stop_tx.send(()).unwrap();
        stored
    };

    let (served, stored) = tokio::join!(server, client);

    served.unwrap();
    assert_eq!(stored.user_id(), UserId::new(3));
}
