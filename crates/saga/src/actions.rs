//! Per-state actions of the saga.

use domain::{Order, OrderCommandPort, OrderState, PortError, ValidationOutcomes};

/// A state change that was just applied to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub previous: OrderState,
    pub current: OrderState,
}

/// The side effect that advances the saga once an order enters a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateAction {
    /// Nothing to do; orders leave `Created` through the order materializer.
    Idle,
    /// Ask the stock validator to check the items.
    RequestItemValidation(ValidationOutcomes),
    /// Ask the balance validator to check the total.
    RequestBalanceValidation(ValidationOutcomes),
    /// Terminal state reached.
    Finalize,
}

impl StateAction {
    /// Returns the action registered for `state`.
    pub fn for_state(state: OrderState) -> Self {
        match state {
            OrderState::Created => StateAction::Idle,
            OrderState::ValidatingItems => StateAction::RequestItemValidation(
                ValidationOutcomes::new(OrderState::ValidatingBalance, OrderState::Rejected),
            ),
            OrderState::ValidatingBalance => StateAction::RequestBalanceValidation(
                ValidationOutcomes::new(OrderState::Done, OrderState::Rejected),
            ),
            OrderState::Done | OrderState::Rejected => StateAction::Finalize,
        }
    }

    /// Returns the action name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            StateAction::Idle => "idle",
            StateAction::RequestItemValidation(_) => "request_item_validation",
            StateAction::RequestBalanceValidation(_) => "request_balance_validation",
            StateAction::Finalize => "finalize",
        }
    }

    /// Runs the action for an order that just went through `transition`.
    pub async fn execute<C>(
        &self,
        commands: &C,
        transition: Transition,
        order: &Order,
    ) -> Result<(), PortError>
    where
        C: OrderCommandPort + ?Sized,
    {
        match self {
            StateAction::Idle => Ok(()),
            StateAction::RequestItemValidation(outcomes) => {
                commands.validate_items(order, *outcomes).await
            }
            StateAction::RequestBalanceValidation(outcomes) => {
                commands.validate_balance(order, *outcomes).await
            }
            StateAction::Finalize => finalize(commands, transition, order).await,
        }
    }
}

async fn finalize<C>(commands: &C, transition: Transition, order: &Order) -> Result<(), PortError>
where
    C: OrderCommandPort + ?Sized,
{
    metrics::counter!("orders_finalized_total", "state" => transition.current.as_str())
        .increment(1);

    if transition.current != OrderState::Rejected {
        tracing::info!(order_id = %order.id(), "Order done");
        return Ok(());
    }

    metrics::counter!("orders_rejected_total", "from" => transition.previous.as_str())
        .increment(1);
    tracing::info!(
        order_id = %order.id(),
        previous_state = %transition.previous,
        errors = ?order.errors(),
        "Order rejected"
    );

    // Stock was reserved once the item validation succeeded.
    if transition.previous == OrderState::ValidatingBalance {
        commands.restore_stock(order).await?;
    }
    Ok(())
}
