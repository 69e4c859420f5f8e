//! Order use case driving the saga.

use common::OrderId;
use domain::{Order, OrderCommandPort, OrderError, OrderQueryPort, OrderState, ShoppingCart};

use crate::actions::{StateAction, Transition};
use crate::error::Result;

/// Creates orders and applies state changes to them.
///
/// Every accepted change is enqueued on the command port, then the action of the
/// new state runs. Nothing is locked across the read and the enqueue; the weight
/// check is what keeps late or duplicated messages from moving an order back.
pub struct OrderOrchestrator<C, Q> {
    commands: C,
    queries: Q,
}

impl<C: OrderCommandPort, Q: OrderQueryPort> OrderOrchestrator<C, Q> {
    /// Creates a new orchestrator.
    pub fn new(commands: C, queries: Q) -> Self {
        Self { commands, queries }
    }

    /// Builds an order in `Created` from a completed cart and enqueues it.
    #[tracing::instrument(skip(self, cart), fields(cart_id = %cart.id()))]
    pub async fn create(&self, cart: ShoppingCart) -> Result<Order> {
        let order = Order::new(cart)?;
        self.commands.create(&order).await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %order.id(), total_price = %order.total_price(), "Order created");
        Ok(order)
    }

    /// Moves an order to `target`.
    ///
    /// Returns `Ok(None)` when the order does not exist, so messages about unknown
    /// orders are tolerated. `errors` are only recorded when `target` is
    /// `Rejected`; they are appended to the existing ones.
    #[tracing::instrument(skip(self, errors))]
    pub async fn update(
        &self,
        order_id: OrderId,
        target: OrderState,
        errors: Vec<String>,
    ) -> Result<Option<Order>> {
        let Some(mut order) = self.queries.find_by_id(order_id).await? else {
            tracing::debug!("Order not found, ignoring update");
            return Ok(None);
        };

        if order.has_final_state() {
            return Err(OrderError::IllegalOrderState {
                order_id,
                state: order.state(),
            }
            .into());
        }

        let previous = order.state();
        if target == OrderState::Rejected {
            order.reject(errors);
        } else if !order.update_state(target) {
            return Err(OrderError::PreviousOrderStateUpdate {
                order_id,
                current: previous,
                target,
            }
            .into());
        }

        self.commands.update(&order).await?;

        metrics::counter!(
            "order_transitions_total",
            "from" => previous.as_str(),
            "to" => order.state().as_str()
        )
        .increment(1);
        tracing::info!(%previous, current = %order.state(), "Order state updated");

        let transition = Transition {
            previous,
            current: order.state(),
        };
        let action = StateAction::for_state(transition.current);
        tracing::debug!(action = action.name(), "Dispatching state action");
        action.execute(&self.commands, transition, &order).await?;

        Ok(Some(order))
    }
}
