//! Remote commerce API gateway.
//!
//! [`OrderGateway`] is the narrow contract the checkout session drives:
//! fetch/create orders, update and advance checkouts, manage line items,
//! and read country/region reference data. [`HttpGateway`] implements it
//! over HTTP/JSON; tests substitute an in-memory implementation.

mod http;

pub use http::HttpGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sugarloaf_core::{Country, CountryId, LineItem, LineItemId, Order, OrderId, StateRegion, VariantId};

/// Errors that can occur when talking to the commerce API.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed (connect, timeout, protocol).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server returned a non-success status outside the validation path.
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response was missing the `order` key where one was required.
    #[error("Response missing order payload")]
    MissingOrder,
}

/// Auth context carried on every per-order request as headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAuth {
    pub order_id: OrderId,
    /// Guest token for unauthenticated sessions. Absent when the caller
    /// authenticates some other way (e.g. a server-side API key).
    pub guest_token: Option<String>,
}

/// Response envelope for checkout endpoints.
///
/// Validation errors the server embeds in an otherwise-successful response
/// ride along in `errors` and pass through to the caller uninterpreted;
/// only transport-level failures become [`GatewayError`]s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

impl OrderPayload {
    /// Whether the server embedded validation errors in the response.
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.errors.is_some()
    }

    /// Extract the order, erroring if the envelope lacked one.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::MissingOrder` if no `order` key was present.
    pub fn require_order(self) -> Result<Order, GatewayError> {
        self.order.ok_or(GatewayError::MissingOrder)
    }
}

/// Contract to the remote commerce API.
///
/// Request shapes for `update_checkout` are exactly the serializer output
/// (see [`crate::serializer`]); everything else is plain JSON.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Create a new empty order (POST /orders).
    async fn create_order(&self) -> Result<Order, GatewayError>;

    /// Fetch the canonical order (GET /orders/{id}).
    async fn fetch_order(&self, auth: &OrderAuth) -> Result<Order, GatewayError>;

    /// Submit a serialized checkout update (PUT /checkouts/{id}).
    async fn update_checkout(
        &self,
        auth: &OrderAuth,
        payload: &serde_json::Value,
    ) -> Result<OrderPayload, GatewayError>;

    /// Ask the server to advance the order to its next state
    /// (PUT /checkouts/{id}/next). Validation errors come back inside the
    /// payload, not as a `GatewayError`.
    async fn advance_checkout(&self, auth: &OrderAuth) -> Result<OrderPayload, GatewayError>;

    /// Add a line item (POST /orders/{id}/line_items).
    async fn create_line_item(
        &self,
        auth: &OrderAuth,
        variant_id: VariantId,
        quantity: u32,
    ) -> Result<LineItem, GatewayError>;

    /// Change a line item's quantity (PUT /orders/{id}/line_items/{id}).
    async fn update_line_item(
        &self,
        auth: &OrderAuth,
        line_item_id: LineItemId,
        quantity: u32,
    ) -> Result<LineItem, GatewayError>;

    /// Country reference data (GET /countries).
    async fn list_countries(&self) -> Result<Vec<Country>, GatewayError>;

    /// Region reference data for one country (GET /countries/{id}/states).
    async fn list_states(&self, country_id: CountryId) -> Result<Vec<StateRegion>, GatewayError>;
}
