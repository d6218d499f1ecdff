//! Checkout session coordinator.
//!
//! [`CheckoutSession`] is the service façade owning the single current
//! order, its attached [`CheckoutMachine`], and the persisted session
//! identifiers. All mutation goes through `&mut self`: the design assumes
//! at most one in-flight checkout operation per session, with no locking
//! and no cancellation. (Two sessions sharing one store can still race to
//! create two orders; that is an accepted limitation.)
//!
//! The server stays authoritative throughout: after every successful
//! checkout submission the canonical order is re-fetched and replaces the
//! local copy wholesale.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};

use sugarloaf_core::{Country, CountryId, Order, OrderState, StateRegion, VariantId};

use crate::api::{GatewayError, HttpGateway, OrderAuth, OrderGateway, OrderPayload};
use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, Result};
use crate::events::{CheckoutEvent, EventBus};
use crate::machine::CheckoutMachine;
use crate::serializer;
use crate::store::{JsonFileStore, PersistedSession, SessionStore};

/// The current order together with its state-machine mirror.
struct CurrentOrder {
    order: Order,
    machine: CheckoutMachine,
}

/// Service-level façade for one shopper's checkout session.
pub struct CheckoutSession {
    gateway: Arc<dyn OrderGateway>,
    store: Arc<dyn SessionStore>,
    events: EventBus,
    current: Option<CurrentOrder>,
}

impl CheckoutSession {
    /// Create a session over explicit collaborators.
    #[must_use]
    pub fn new(gateway: Arc<dyn OrderGateway>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            gateway,
            store,
            events: EventBus::default(),
            current: None,
        }
    }

    /// Create a session with the HTTP gateway and file-backed store the
    /// configuration describes.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &CheckoutConfig) -> Result<Self> {
        let gateway = HttpGateway::from_config(config)?;
        let store = JsonFileStore::new(config.session_file.clone());
        Ok(Self::new(Arc::new(gateway), Arc::new(store)))
    }

    /// The current order, if one is attached.
    #[must_use]
    pub fn current_order(&self) -> Option<&Order> {
        self.current.as_ref().map(|c| &c.order)
    }

    /// Subscribe to checkout lifecycle events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CheckoutEvent> {
        self.events.subscribe()
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Restore a persisted session, if any.
    ///
    /// Intended to gate application startup: await this before rendering so
    /// the UI never sees a stale order reference. A failed restore is
    /// self-healing -- the persisted identifiers are wiped, a `ServerError`
    /// event is emitted, and the session continues as a fresh guest.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading the session store itself fails.
    #[instrument(skip(self))]
    pub async fn initialize(&mut self) -> Result<()> {
        let Some(persisted) = self.store.load().await? else {
            debug!("No persisted session; starting as fresh guest");
            return Ok(());
        };

        let auth = OrderAuth {
            order_id: persisted.order_id,
            guest_token: Some(persisted.guest_token.clone()),
        };

        match self.gateway.fetch_order(&auth).await {
            Ok(mut order) => {
                // Responses may omit the token; the persisted one stays valid
                if order.guest_token.is_none() {
                    order.guest_token = Some(persisted.guest_token);
                }
                debug!(order_id = %order.id, state = %order.state, "Restored persisted order");
                self.attach(order);
                Ok(())
            }
            Err(e) => {
                warn!(order_id = %persisted.order_id, error = %e, "Persisted order restore failed; clearing session");
                if let Err(clear_err) = self.store.clear().await {
                    warn!(error = %clear_err, "Failed to clear session store after bad restore");
                }
                self.events.emit(CheckoutEvent::ServerError {
                    message: e.to_string(),
                });
                Ok(())
            }
        }
    }

    /// Drop the current order reference and wipe the persisted
    /// identifiers. Never touches the server; always succeeds.
    #[instrument(skip(self))]
    pub async fn clear_current_order(&mut self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear session store");
        }
        self.current = None;
    }

    // =========================================================================
    // Cart operations
    // =========================================================================

    /// Merge `quantity` of `variant_id` into the cart, creating a new
    /// order first if the session has none.
    ///
    /// Merge rule: an existing line item for the variant has its quantity
    /// incremented; otherwise a new line item is created.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if order creation or the line-item call
    /// fails (a `ServerError` event has been emitted by then).
    #[instrument(skip(self), fields(variant_id = %variant_id, quantity))]
    pub async fn add_to_cart(&mut self, variant_id: VariantId, quantity: u32) -> Result<()> {
        if self.current.is_none() {
            self.create_new_order().await?;
        }
        let current = self.current.as_ref().ok_or(CheckoutError::NoCurrentOrder)?;
        let auth = auth_for(&current.order);

        let existing = current
            .order
            .line_item_for(variant_id)
            .map(|li| (li.id, li.quantity));

        let item = match existing {
            Some((line_item_id, current_quantity)) => {
                self.gateway
                    .update_line_item(&auth, line_item_id, current_quantity + quantity)
                    .await
            }
            None => {
                self.gateway
                    .create_line_item(&auth, variant_id, quantity)
                    .await
            }
        }
        .map_err(|e| self.gateway_failure(e))?;

        if let Some(current) = self.current.as_mut() {
            current.order.put_line_item(item);
        }
        self.events
            .emit(CheckoutEvent::AddedToCart { variant_id, quantity });
        Ok(())
    }

    /// Create a fresh order, make it current, and persist its identifiers.
    async fn create_new_order(&mut self) -> Result<()> {
        let order = self
            .gateway
            .create_order()
            .await
            .map_err(|e| self.gateway_failure(e))?;

        match &order.guest_token {
            Some(token) => {
                self.store
                    .save(&PersistedSession {
                        order_id: order.id,
                        guest_token: token.clone(),
                    })
                    .await?;
            }
            // Authenticated sessions carry no guest token; nothing to persist
            None => debug!(order_id = %order.id, "New order has no guest token; skipping persistence"),
        }

        self.events.emit(CheckoutEvent::NewOrderCreated { order_id: order.id });
        self.attach(order);
        Ok(())
    }

    // =========================================================================
    // Checkout operations
    // =========================================================================

    /// Transition the checkout to `target`, or to the machine-computed
    /// next step when `target` is `None`.
    ///
    /// Serializes the order for the *target* state, submits it, then
    /// re-fetches the canonical order so local state mirrors server truth.
    ///
    /// # Errors
    ///
    /// Fails locally (before any network call) on an illegal transition;
    /// otherwise returns the gateway error after emitting `ServerError`.
    #[instrument(skip(self))]
    pub async fn transition_checkout_state(
        &mut self,
        target: Option<OrderState>,
    ) -> Result<OrderPayload> {
        let current = self.current.as_ref().ok_or(CheckoutError::NoCurrentOrder)?;
        let target_state = match target {
            Some(explicit) => current.machine.target(explicit)?,
            None => current.machine.next_step()?,
        };

        let payload = serializer::checkout_payload_for(&current.order, target_state)?;
        let auth = auth_for(&current.order);

        let response = self
            .gateway
            .update_checkout(&auth, &payload)
            .await
            .map_err(|e| self.gateway_failure(e))?;

        let fresh = self
            .gateway
            .fetch_order(&auth)
            .await
            .map_err(|e| self.gateway_failure(e))?;
        self.adopt(fresh);
        Ok(response)
    }

    /// Submit the order serialized for its *current* state (a plain save,
    /// no transition), then re-fetch the canonical order.
    ///
    /// # Errors
    ///
    /// Returns the gateway error after emitting `ServerError`; local state
    /// is unchanged on failure.
    #[instrument(skip(self))]
    pub async fn save_current_order(&mut self) -> Result<OrderPayload> {
        let current = self.current.as_ref().ok_or(CheckoutError::NoCurrentOrder)?;
        let payload = serializer::checkout_payload(&current.order)?;
        let auth = auth_for(&current.order);

        let response = self
            .gateway
            .update_checkout(&auth, &payload)
            .await
            .map_err(|e| self.gateway_failure(e))?;

        let fresh = self
            .gateway
            .fetch_order(&auth)
            .await
            .map_err(|e| self.gateway_failure(e))?;
        self.adopt(fresh);
        Ok(response)
    }

    /// Ask the server to advance the order to its next state (the server,
    /// not a serialized payload, decides the target -- used for the
    /// confirm → complete transition and for surfacing validation errors
    /// when the flow stalls).
    ///
    /// Validation errors come back inside the resolved payload and leave
    /// local state untouched.
    ///
    /// # Errors
    ///
    /// Returns the gateway error after emitting `ServerError`.
    #[instrument(skip(self))]
    pub async fn advance_current_order(&mut self) -> Result<OrderPayload> {
        let auth = {
            let current = self.current.as_ref().ok_or(CheckoutError::NoCurrentOrder)?;
            auth_for(&current.order)
        };

        let response = self
            .gateway
            .advance_checkout(&auth)
            .await
            .map_err(|e| self.gateway_failure(e))?;

        if !response.has_errors()
            && let Some(order) = response.order.clone()
        {
            self.adopt(order);
        }
        Ok(response)
    }

    // =========================================================================
    // Reference data
    // =========================================================================

    /// Country reference data for address forms.
    ///
    /// # Errors
    ///
    /// Returns the gateway error after emitting `ServerError`.
    pub async fn countries(&self) -> Result<Vec<Country>> {
        self.gateway
            .list_countries()
            .await
            .map_err(|e| self.gateway_failure(e))
    }

    /// Region reference data for one country.
    ///
    /// # Errors
    ///
    /// Returns the gateway error after emitting `ServerError`.
    pub async fn states(&self, country_id: CountryId) -> Result<Vec<StateRegion>> {
        self.gateway
            .list_states(country_id)
            .await
            .map_err(|e| self.gateway_failure(e))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Make `order` the current order with a freshly attached machine.
    fn attach(&mut self, order: Order) {
        self.current = Some(CurrentOrder {
            machine: CheckoutMachine::attach(&order),
            order,
        });
    }

    /// Replace the current order with a server-confirmed copy, carrying the
    /// guest token over when the response omits it, and emit state-change
    /// events as needed.
    fn adopt(&mut self, mut fresh: Order) {
        let Some(current) = self.current.as_mut() else {
            self.attach(fresh);
            return;
        };

        if fresh.guest_token.is_none() {
            fresh.guest_token = current.order.guest_token.take();
        }

        let from = current.machine.current();
        let to = fresh.state;
        current.machine = CheckoutMachine::attach(&fresh);
        current.order = fresh;

        if from != to {
            self.events
                .emit(CheckoutEvent::CheckoutStateChanged { from, to });
            if to.is_terminal() {
                self.events.emit(CheckoutEvent::OrderCompleted {
                    order_id: current.order.id,
                });
            }
        }
    }

    /// Emit a `ServerError` event for a failed gateway call and wrap the
    /// error for the caller. Local state is never changed here.
    fn gateway_failure(&self, error: GatewayError) -> CheckoutError {
        warn!(error = %error, "Commerce API call failed");
        self.events.emit(CheckoutEvent::ServerError {
            message: error.to_string(),
        });
        CheckoutError::Gateway(error)
    }
}

/// Auth context for per-order requests.
fn auth_for(order: &Order) -> OrderAuth {
    OrderAuth {
        order_id: order.id,
        guest_token: order.guest_token.clone(),
    }
}
