//! Checkout service.
//!
//! Wires the cart use case and the order saga to the message bus and a read
//! store, consumes the bus with the materializers, and serves the admin
//! endpoints (`/health`, `/metrics`).

pub mod config;
pub mod error;
pub mod routes;
pub mod telemetry;

pub use config::{Config, LogFormat};
pub use error::{Result, ServiceError};

use std::future::Future;
use std::sync::Arc;

use adapters::{MessagingCartRepository, MessagingOrderRepository};
use domain::ShoppingCartService;
use messaging::{DeadLetterQueue, InMemoryMessageBus, RetryPolicy, RetryingBus};
use metrics_exporter_prometheus::PrometheusHandle;
use projections::{CartMaterializer, MessageProcessor, OrderMaterializer};
use read_store::{CartStore, OrderStore};
use saga::OrderOrchestrator;
use tokio::sync::watch;

/// The bus every adapter publishes on.
pub type Bus = RetryingBus<InMemoryMessageBus>;
pub type CartRepository<S> = MessagingCartRepository<Bus, S>;
pub type OrderRepository<S> = MessagingOrderRepository<Bus, S>;
pub type CartService<S> = ShoppingCartService<CartRepository<S>, CartRepository<S>>;
pub type Orchestrator<S> = OrderOrchestrator<OrderRepository<S>, OrderRepository<S>>;

/// The wired checkout system over read store `S`.
pub struct Checkout<S> {
    pub carts: CartService<S>,
    pub orders: Arc<Orchestrator<S>>,
    pub processor: Arc<MessageProcessor>,
    pub bus: Bus,
    pub store: S,
}

impl<S> Checkout<S>
where
    S: CartStore + OrderStore + Clone + 'static,
{
    /// Wires adapters, use cases and materializers around `store` on a bus
    /// that keeps no history.
    pub fn new(store: S, policy: RetryPolicy) -> Self {
        Self::with_bus(store, InMemoryMessageBus::new(), policy)
    }

    /// Wires everything around `store`, publishing on `transport`.
    pub fn with_bus(store: S, transport: InMemoryMessageBus, policy: RetryPolicy) -> Self {
        let bus = RetryingBus::new(transport, policy);

        let order_repository = MessagingOrderRepository::new(bus.clone(), store.clone());
        let orders = Arc::new(OrderOrchestrator::new(
            order_repository.clone(),
            order_repository,
        ));
        let cart_repository = MessagingCartRepository::new(bus.clone(), store.clone());

        let mut processor = MessageProcessor::new();
        processor.register(Box::new(CartMaterializer::new(
            store.clone(),
            Arc::clone(&orders),
        )));
        processor.register(Box::new(OrderMaterializer::new(
            store.clone(),
            Arc::clone(&orders),
        )));

        Self {
            carts: ShoppingCartService::new(cart_repository.clone(), cart_repository),
            orders,
            processor: Arc::new(processor),
            bus,
            store,
        }
    }

    /// Messages that exhausted their publish attempts.
    pub fn dead_letters(&self) -> &DeadLetterQueue {
        self.bus.dead_letters()
    }

    /// Applies every pending message, including the ones published while
    /// applying. Returns the number of messages consumed.
    pub async fn run_until_idle(&self) -> usize {
        self.processor.run_until_idle(self.bus.inner()).await
    }
}

/// Runs the message consumer and the admin endpoints until `shutdown`
/// resolves, then stops both.
pub async fn serve<S, F>(
    config: &Config,
    checkout: &Checkout<S>,
    metrics_handle: PrometheusHandle,
    shutdown: F,
) -> Result<()>
where
    S: CartStore + OrderStore + Clone + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    tracing::info!(addr = %listener.local_addr()?, "Admin endpoints listening");

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let processor = Arc::clone(&checkout.processor);
    let messages = checkout.bus.inner().stream();
    let consumer = tokio::spawn(async move {
        processor
            .run(messages, async move {
                let _ = stop_rx.changed().await;
            })
            .await;
    });

    let served = axum::serve(listener, routes::admin_router(metrics_handle))
        .with_graceful_shutdown(async move {
            shutdown.await;
            let _ = stop_tx.send(true);
        })
        .await;

    consumer.await?;
    served?;
    tracing::info!("Service shut down gracefully");
    Ok(())
}
