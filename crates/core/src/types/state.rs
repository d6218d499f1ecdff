//! Checkout state for orders.
//!
//! An order moves through a linear sequence of checkout steps reported by
//! the server per order (`checkout_steps`), bracketed by the boundary
//! states `cart` (initial) and `complete` (terminal). The server is
//! authoritative for transition legality; these types only mirror what the
//! server confirms.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing an order state from its wire representation.
#[derive(Debug, Error)]
#[error("unknown order state: {0}")]
pub struct OrderStateError(String);

/// Checkout state of an order.
///
/// `Cart` and `Complete` are boundary states; the rest are checkout steps
/// that may or may not appear in a given order's `checkout_steps` sequence
/// (e.g. digital orders skip `delivery`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    #[default]
    Cart,
    Address,
    Delivery,
    Payment,
    Confirm,
    Complete,
}

impl OrderState {
    /// Whether this state is an intermediate checkout step (not a boundary).
    #[must_use]
    pub const fn is_step(self) -> bool {
        !matches!(self, Self::Cart | Self::Complete)
    }

    /// Whether this state is the terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Wire name of the state (snake_case, as the server reports it).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::Address => "address",
            Self::Delivery => "delivery",
            Self::Payment => "payment",
            Self::Confirm => "confirm",
            Self::Complete => "complete",
        }
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderState {
    type Err = OrderStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cart" => Ok(Self::Cart),
            "address" => Ok(Self::Address),
            "delivery" => Ok(Self::Delivery),
            "payment" => Ok(Self::Payment),
            "confirm" => Ok(Self::Confirm),
            "complete" => Ok(Self::Complete),
            other => Err(OrderStateError(other.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serde_snake_case() {
        assert_eq!(serde_json::to_string(&OrderState::Cart).unwrap(), "\"cart\"");
        assert_eq!(
            serde_json::from_str::<OrderState>("\"delivery\"").unwrap(),
            OrderState::Delivery
        );
    }

    #[test]
    fn test_state_display_matches_wire_name() {
        assert_eq!(OrderState::Confirm.to_string(), "confirm");
    }

    #[test]
    fn test_state_from_str_rejects_unknown() {
        assert!("shipping".parse::<OrderState>().is_err());
    }

    #[test]
    fn test_boundary_states_are_not_steps() {
        assert!(!OrderState::Cart.is_step());
        assert!(!OrderState::Complete.is_step());
        assert!(OrderState::Address.is_step());
        assert!(OrderState::Complete.is_terminal());
        assert!(!OrderState::Confirm.is_terminal());
    }
}
