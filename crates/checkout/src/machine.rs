//! Checkout state machine.
//!
//! An explicit, data-driven mirror of the server's checkout sequence: the
//! step table comes from the order's server-reported `checkout_steps`, and
//! `current` only changes when a server response confirms a state. The
//! machine never enforces business rules -- the server is authoritative for
//! transition legality -- it only computes the next target and rejects
//! local usage errors (advancing past the terminal state, targeting a step
//! the order does not have) before any network call is made.

use thiserror::Error;

use sugarloaf_core::{Order, OrderState};

/// Illegal transition requests, caught locally before any server call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The order is complete; there is nothing to advance to.
    #[error("order is complete; no further checkout transition exists")]
    CompleteIsTerminal,

    /// The requested target is not a step of this order's sequence.
    #[error("state {0} is not a checkout step of this order")]
    UnknownStep(OrderState),

    /// The current state does not appear in the step sequence, so a "next"
    /// step cannot be computed. Indicates a stale local mirror.
    #[error("current state {0} is not in the order's checkout steps")]
    CurrentNotInSteps(OrderState),
}

/// Mirror of one order's checkout position.
///
/// Attached when an order becomes current; a resumed session may attach at
/// any step, not just `cart`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutMachine {
    steps: Vec<OrderState>,
    current: OrderState,
}

impl CheckoutMachine {
    /// Build a machine mirroring `order`'s steps and current state.
    #[must_use]
    pub fn attach(order: &Order) -> Self {
        Self {
            steps: order.checkout_steps.clone(),
            current: order.state,
        }
    }

    /// The server-confirmed state this machine mirrors.
    #[must_use]
    pub const fn current(&self) -> OrderState {
        self.current
    }

    /// The checkout steps this machine was built from.
    #[must_use]
    pub fn steps(&self) -> &[OrderState] {
        &self.steps
    }

    /// Compute the next step in the linear sequence.
    ///
    /// `cart` advances to the first step; the last step advances to
    /// `complete`.
    ///
    /// # Errors
    ///
    /// Fails without touching the server when the order is already
    /// complete, or when the current state is missing from the step table.
    pub fn next_step(&self) -> Result<OrderState, TransitionError> {
        match self.current {
            OrderState::Complete => Err(TransitionError::CompleteIsTerminal),
            OrderState::Cart => Ok(self.steps.first().copied().unwrap_or(OrderState::Complete)),
            current => {
                let index = self
                    .steps
                    .iter()
                    .position(|s| *s == current)
                    .ok_or(TransitionError::CurrentNotInSteps(current))?;
                Ok(self
                    .steps
                    .get(index + 1)
                    .copied()
                    .unwrap_or(OrderState::Complete))
            }
        }
    }

    /// Validate an explicitly supplied target, bypassing the "next"
    /// computation (used to return to an earlier step or jump ahead).
    ///
    /// # Errors
    ///
    /// Fails when the target is a boundary state or not one of this
    /// order's steps.
    pub fn target(&self, state: OrderState) -> Result<OrderState, TransitionError> {
        if state.is_step() && self.steps.contains(&state) {
            Ok(state)
        } else {
            Err(TransitionError::UnknownStep(state))
        }
    }

    /// Mirror a server-confirmed state. No validation: the server has
    /// already accepted it.
    pub const fn confirm(&mut self, state: OrderState) {
        self.current = state;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sugarloaf_core::OrderId;

    fn order(state: OrderState, steps: &[OrderState]) -> Order {
        Order {
            id: OrderId::new(1),
            number: "R100000001".to_string(),
            state,
            email: None,
            bill_address: None,
            ship_address: None,
            line_items: Vec::new(),
            shipments: Vec::new(),
            payments: Vec::new(),
            guest_token: None,
            checkout_steps: steps.to_vec(),
            item_total: None,
            total: None,
            completed_at: None,
        }
    }

    const FULL: [OrderState; 4] = [
        OrderState::Address,
        OrderState::Delivery,
        OrderState::Payment,
        OrderState::Confirm,
    ];

    #[test]
    fn test_cart_advances_to_first_step() {
        let machine = CheckoutMachine::attach(&order(OrderState::Cart, &FULL));
        assert_eq!(machine.next_step().unwrap(), OrderState::Address);
    }

    #[test]
    fn test_steps_advance_linearly() {
        let machine = CheckoutMachine::attach(&order(OrderState::Delivery, &FULL));
        assert_eq!(machine.next_step().unwrap(), OrderState::Payment);
    }

    #[test]
    fn test_last_step_advances_to_complete() {
        let machine = CheckoutMachine::attach(&order(OrderState::Confirm, &FULL));
        assert_eq!(machine.next_step().unwrap(), OrderState::Complete);
    }

    #[test]
    fn test_complete_is_terminal() {
        let machine = CheckoutMachine::attach(&order(OrderState::Complete, &FULL));
        assert_eq!(
            machine.next_step().unwrap_err(),
            TransitionError::CompleteIsTerminal
        );
    }

    #[test]
    fn test_attach_resumes_mid_checkout() {
        // A restored session may attach at any step
        let machine = CheckoutMachine::attach(&order(OrderState::Payment, &FULL));
        assert_eq!(machine.current(), OrderState::Payment);
        assert_eq!(machine.next_step().unwrap(), OrderState::Confirm);
    }

    #[test]
    fn test_shortened_sequence_skips_missing_steps() {
        // Digital orders have no delivery step
        let steps = [OrderState::Address, OrderState::Payment, OrderState::Confirm];
        let machine = CheckoutMachine::attach(&order(OrderState::Address, &steps));
        assert_eq!(machine.next_step().unwrap(), OrderState::Payment);
    }

    #[test]
    fn test_explicit_target_must_be_known() {
        let steps = [OrderState::Address, OrderState::Payment, OrderState::Confirm];
        let machine = CheckoutMachine::attach(&order(OrderState::Payment, &steps));

        // Returning to an earlier step is fine
        assert_eq!(machine.target(OrderState::Address).unwrap(), OrderState::Address);
        // Delivery is not in this order's sequence
        assert_eq!(
            machine.target(OrderState::Delivery).unwrap_err(),
            TransitionError::UnknownStep(OrderState::Delivery)
        );
    }

    #[test]
    fn test_explicit_target_rejects_boundary_states() {
        let machine = CheckoutMachine::attach(&order(OrderState::Address, &FULL));
        assert_eq!(
            machine.target(OrderState::Cart).unwrap_err(),
            TransitionError::UnknownStep(OrderState::Cart)
        );
        assert_eq!(
            machine.target(OrderState::Complete).unwrap_err(),
            TransitionError::UnknownStep(OrderState::Complete)
        );
    }

    #[test]
    fn test_confirm_mirrors_server_state() {
        let mut machine = CheckoutMachine::attach(&order(OrderState::Cart, &FULL));
        machine.confirm(OrderState::Address);
        assert_eq!(machine.current(), OrderState::Address);
    }

    #[test]
    fn test_stale_mirror_is_an_error() {
        let machine = CheckoutMachine::attach(&order(OrderState::Delivery, &[OrderState::Address]));
        assert_eq!(
            machine.next_step().unwrap_err(),
            TransitionError::CurrentNotInSteps(OrderState::Delivery)
        );
    }

    #[test]
    fn test_empty_steps_go_straight_to_complete() {
        let machine = CheckoutMachine::attach(&order(OrderState::Cart, &[]));
        assert_eq!(machine.next_step().unwrap(), OrderState::Complete);
    }
}
