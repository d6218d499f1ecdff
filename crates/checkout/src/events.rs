//! Checkout lifecycle events.
//!
//! The session broadcasts named events over a `tokio::sync::broadcast`
//! channel so UI and routing layers can react (refresh a cart badge, route
//! to the order-confirmation page, show a server-error banner) without the
//! session knowing who listens. Emitting with no subscribers is fine.

use tokio::sync::broadcast;

use sugarloaf_core::{OrderId, OrderState, VariantId};

/// Default channel capacity; slow subscribers past this lag and drop.
const DEFAULT_CAPACITY: usize = 64;

/// Events the checkout session broadcasts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutEvent {
    /// A remote gateway call failed.
    ServerError { message: String },
    /// A line item was merged into the current order.
    AddedToCart { variant_id: VariantId, quantity: u32 },
    /// A fresh order was created and became current.
    NewOrderCreated { order_id: OrderId },
    /// The server confirmed a checkout state change.
    CheckoutStateChanged { from: OrderState, to: OrderState },
    /// The current order reached the terminal state.
    OrderCompleted { order_id: OrderId },
}

/// Broadcast handle for checkout events.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CheckoutEvent>,
}

impl EventBus {
    /// Create a bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CheckoutEvent> {
        self.tx.subscribe()
    }

    /// Broadcast an event. A send error only means nobody is listening.
    pub fn emit(&self, event: CheckoutEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("checkout event emitted with no subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
