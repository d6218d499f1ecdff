//! Integration test harness for Sugarloaf.
//!
//! Provides [`TestContext`] -- a checkout session wired to an in-memory
//! [`MockGateway`] (a scripted commerce API) and a `MemoryStore`, so the
//! full coordinator flow runs without a network or a real server.
//!
//! # Test Categories
//!
//! - `cart` - Cart mutation and session persistence
//! - `checkout_flow` - State machine transitions end-to-end
//! - `session_restore` - Startup restore and self-healing

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use sugarloaf_checkout::{
    CheckoutEvent, CheckoutSession, GatewayError, MemoryStore, OrderAuth, OrderGateway,
    OrderPayload, PersistedSession, SessionStore,
};
use sugarloaf_core::{
    Address, Country, CountryId, LineItem, LineItemId, Order, OrderId, OrderState, StateRegion,
    VariantId,
};

/// The full checkout step sequence the mock server reports.
pub const FULL_STEPS: [OrderState; 4] = [
    OrderState::Address,
    OrderState::Delivery,
    OrderState::Payment,
    OrderState::Confirm,
];

// =============================================================================
// MockGateway
// =============================================================================

struct MockCommerce {
    next_order_id: i64,
    next_line_item_id: i64,
    orders: HashMap<i64, Order>,
    /// When set, every call fails as if the server were unreachable.
    unreachable: bool,
}

/// Scripted in-memory commerce API.
///
/// Implements the same contract as the HTTP gateway: orders advance along
/// their step sequence, leaving `address` requires both addresses (a 422
/// with embedded errors otherwise), and every response order omits the
/// guest token except the creation response.
pub struct MockGateway {
    state: Mutex<MockCommerce>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockCommerce {
                next_order_id: 1,
                next_line_item_id: 1,
                orders: HashMap::new(),
                unreachable: false,
            }),
        }
    }

    /// Make every subsequent call fail at the transport level.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().expect("mock poisoned").unreachable = unreachable;
    }

    /// Server-side snapshot of an order.
    #[must_use]
    pub fn order_snapshot(&self, order_id: OrderId) -> Option<Order> {
        self.state
            .lock()
            .expect("mock poisoned")
            .orders
            .get(&order_id.as_i64())
            .cloned()
    }

    /// Number of orders the server knows about.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.state.lock().expect("mock poisoned").orders.len()
    }

    /// Attach both addresses to an order server-side, as a completed
    /// address form submission would.
    pub fn put_addresses(&self, order_id: OrderId, address: &Address) {
        let mut state = self.state.lock().expect("mock poisoned");
        if let Some(order) = state.orders.get_mut(&order_id.as_i64()) {
            order.bill_address = Some(address.clone());
            order.ship_address = Some(address.clone());
        }
    }

    fn check_reachable(state: &MockCommerce) -> Result<(), GatewayError> {
        if state.unreachable {
            return Err(GatewayError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn authorized_order<'a>(
        state: &'a mut MockCommerce,
        auth: &OrderAuth,
    ) -> Result<&'a mut Order, GatewayError> {
        let order = state
            .orders
            .get_mut(&auth.order_id.as_i64())
            .ok_or(GatewayError::Status {
                status: 404,
                body: "order not found".to_string(),
            })?;
        // The mock stores the token on the order; real responses omit it
        if order.guest_token != auth.guest_token {
            return Err(GatewayError::Status {
                status: 401,
                body: "bad order token".to_string(),
            });
        }
        Ok(order)
    }

    /// Response copy of an order: the guest token never rides along except
    /// on creation.
    fn response_order(order: &Order) -> Order {
        let mut copy = order.clone();
        copy.guest_token = None;
        copy
    }
}

#[async_trait]
impl OrderGateway for MockGateway {
    async fn create_order(&self) -> Result<Order, GatewayError> {
        let mut state = self.state.lock().expect("mock poisoned");
        Self::check_reachable(&state)?;

        let id = state.next_order_id;
        state.next_order_id += 1;
        let order = Order {
            id: OrderId::new(id),
            number: format!("R{:09}", 100_000_000 + id),
            state: OrderState::Cart,
            email: None,
            bill_address: None,
            ship_address: None,
            line_items: Vec::new(),
            shipments: Vec::new(),
            payments: Vec::new(),
            guest_token: Some(uuid::Uuid::new_v4().to_string()),
            checkout_steps: FULL_STEPS.to_vec(),
            item_total: None,
            total: None,
            completed_at: None,
        };
        state.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn fetch_order(&self, auth: &OrderAuth) -> Result<Order, GatewayError> {
        let mut state = self.state.lock().expect("mock poisoned");
        Self::check_reachable(&state)?;
        let order = Self::authorized_order(&mut state, auth)?;
        Ok(Self::response_order(order))
    }

    async fn update_checkout(
        &self,
        auth: &OrderAuth,
        payload: &serde_json::Value,
    ) -> Result<OrderPayload, GatewayError> {
        let mut state = self.state.lock().expect("mock poisoned");
        Self::check_reachable(&state)?;
        let order = Self::authorized_order(&mut state, auth)?;

        if let Some(email) = payload["order"]["email"].as_str() {
            order.email = Some(email.to_string());
        }
        if let Some(target) = payload["state"]
            .as_str()
            .and_then(|s| OrderState::from_str(s).ok())
        {
            order.state = target;
        }

        Ok(OrderPayload {
            order: Some(Self::response_order(order)),
            errors: None,
        })
    }

    async fn advance_checkout(&self, auth: &OrderAuth) -> Result<OrderPayload, GatewayError> {
        let mut state = self.state.lock().expect("mock poisoned");
        Self::check_reachable(&state)?;
        let order = Self::authorized_order(&mut state, auth)?;

        // Leaving the address step requires both addresses
        if order.state == OrderState::Address
            && (order.bill_address.is_none() || order.ship_address.is_none())
        {
            return Ok(OrderPayload {
                order: Some(Self::response_order(order)),
                errors: Some(serde_json::json!({
                    "error": "bill_address and ship_address are required"
                })),
            });
        }

        let next = match order.state {
            OrderState::Cart => order.checkout_steps.first().copied(),
            OrderState::Complete => None,
            current => order
                .checkout_steps
                .iter()
                .position(|s| *s == current)
                .map(|i| {
                    order
                        .checkout_steps
                        .get(i + 1)
                        .copied()
                        .unwrap_or(OrderState::Complete)
                }),
        };

        match next {
            Some(next) => {
                order.state = next;
                Ok(OrderPayload {
                    order: Some(Self::response_order(order)),
                    errors: None,
                })
            }
            None => Ok(OrderPayload {
                order: Some(Self::response_order(order)),
                errors: Some(serde_json::json!({ "error": "cannot advance order" })),
            }),
        }
    }

    async fn create_line_item(
        &self,
        auth: &OrderAuth,
        variant_id: VariantId,
        quantity: u32,
    ) -> Result<LineItem, GatewayError> {
        let mut state = self.state.lock().expect("mock poisoned");
        Self::check_reachable(&state)?;
        let line_item_id = state.next_line_item_id;
        state.next_line_item_id += 1;
        let order = Self::authorized_order(&mut state, auth)?;

        let item = LineItem {
            id: LineItemId::new(line_item_id),
            variant_id,
            quantity,
            price: None,
            variant: None,
        };
        order.line_items.push(item.clone());
        Ok(item)
    }

    async fn update_line_item(
        &self,
        auth: &OrderAuth,
        line_item_id: LineItemId,
        quantity: u32,
    ) -> Result<LineItem, GatewayError> {
        let mut state = self.state.lock().expect("mock poisoned");
        Self::check_reachable(&state)?;
        let order = Self::authorized_order(&mut state, auth)?;

        let item = order
            .line_items
            .iter_mut()
            .find(|li| li.id == line_item_id)
            .ok_or(GatewayError::Status {
                status: 404,
                body: "line item not found".to_string(),
            })?;
        item.quantity = quantity;
        Ok(item.clone())
    }

    async fn list_countries(&self) -> Result<Vec<Country>, GatewayError> {
        let state = self.state.lock().expect("mock poisoned");
        Self::check_reachable(&state)?;
        Ok(vec![Country {
            id: CountryId::new(232),
            iso: "US".to_string(),
            name: "United States".to_string(),
            states_required: true,
        }])
    }

    async fn list_states(&self, country_id: CountryId) -> Result<Vec<StateRegion>, GatewayError> {
        let state = self.state.lock().expect("mock poisoned");
        Self::check_reachable(&state)?;
        Ok(vec![StateRegion {
            id: sugarloaf_core::StateId::new(48),
            country_id,
            abbr: "NY".to_string(),
            name: "New York".to_string(),
        }])
    }
}

// =============================================================================
// TestContext
// =============================================================================

/// A checkout session wired to the mock commerce API.
pub struct TestContext {
    pub gateway: Arc<MockGateway>,
    pub store: Arc<MemoryStore>,
    pub session: CheckoutSession,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a subscriber honoring `RUST_LOG` so session tracing shows up in
/// test output. Only the first call installs; later calls are no-ops.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        init_tracing();
        let gateway = Arc::new(MockGateway::new());
        let store = Arc::new(MemoryStore::new());
        let session = CheckoutSession::new(gateway.clone(), store.clone());
        Self {
            gateway,
            store,
            session,
        }
    }

    /// The identifiers currently persisted in the session store.
    pub async fn persisted(&self) -> Option<PersistedSession> {
        self.store.load().await.expect("session store load")
    }

    /// Drain all events currently queued on a receiver.
    #[must_use]
    pub fn drain_events(
        rx: &mut tokio::sync::broadcast::Receiver<CheckoutEvent>,
    ) -> Vec<CheckoutEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }
}

/// A complete test address.
#[must_use]
pub fn test_address() -> Address {
    Address {
        id: None,
        firstname: "Jo".to_string(),
        lastname: "Tester".to_string(),
        address1: "1 Main St".to_string(),
        address2: None,
        city: "Springfield".to_string(),
        zipcode: "12345".to_string(),
        phone: "555-0100".to_string(),
        country_id: CountryId::new(232),
        state_id: Some(sugarloaf_core::StateId::new(48)),
    }
}
