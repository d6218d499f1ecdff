//! HTTP/JSON implementation of the commerce API gateway.
//!
//! Uses `reqwest` with per-order auth headers. Response bodies are read as
//! text first so parse failures can be logged with context.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::instrument;

use sugarloaf_core::{Country, CountryId, LineItem, LineItemId, Order, StateRegion, VariantId};

use crate::config::CheckoutConfig;

use super::{GatewayError, OrderAuth, OrderGateway, OrderPayload};

/// Header carrying the current order id.
const ORDER_ID_HEADER: &str = "X-Commerce-Order-Id";
/// Header carrying the guest token authorizing the session.
const ORDER_TOKEN_HEADER: &str = "X-Commerce-Order-Token";

/// `reqwest`-backed commerce API client.
#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpGateway {
    /// Create a gateway from checkout configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn from_config(config: &CheckoutConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.as_str().trim_end_matches('/').to_string(),
            api_key: config
                .api_key
                .as_ref()
                .map(|key| key.expose_secret().to_string()),
        })
    }

    fn request(&self, method: Method, path: &str, auth: Option<&OrderAuth>) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}/{path}", self.base_url))
            .header("Accept", "application/json");

        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        if let Some(auth) = auth {
            builder = builder.header(ORDER_ID_HEADER, auth.order_id.to_string());
            if let Some(token) = &auth.guest_token {
                builder = builder.header(ORDER_TOKEN_HEADER, token);
            }
        }

        builder
    }

    /// Send a request and decode the JSON body.
    ///
    /// HTTP 422 is not a transport failure here: checkout endpoints use it
    /// for validation errors, which must pass through to the caller inside
    /// the decoded payload.
    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, GatewayError> {
        let response = builder.send().await?;
        let status = response.status();

        // Read as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() && status != StatusCode::UNPROCESSABLE_ENTITY {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Commerce API returned non-success status"
            );
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        match serde_json::from_str(&body) {
            Ok(decoded) => Ok(decoded),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse commerce API response"
                );
                Err(GatewayError::Parse(e))
            }
        }
    }
}

#[async_trait]
impl OrderGateway for HttpGateway {
    #[instrument(skip(self))]
    async fn create_order(&self) -> Result<Order, GatewayError> {
        let payload: OrderPayload = self
            .execute(self.request(Method::POST, "orders", None))
            .await?;
        payload.require_order()
    }

    #[instrument(skip(self), fields(order_id = %auth.order_id))]
    async fn fetch_order(&self, auth: &OrderAuth) -> Result<Order, GatewayError> {
        let path = format!("orders/{}", auth.order_id);
        let payload: OrderPayload = self
            .execute(self.request(Method::GET, &path, Some(auth)))
            .await?;
        payload.require_order()
    }

    #[instrument(skip(self, payload), fields(order_id = %auth.order_id))]
    async fn update_checkout(
        &self,
        auth: &OrderAuth,
        payload: &serde_json::Value,
    ) -> Result<OrderPayload, GatewayError> {
        let path = format!("checkouts/{}", auth.order_id);
        self.execute(self.request(Method::PUT, &path, Some(auth)).json(payload))
            .await
    }

    #[instrument(skip(self), fields(order_id = %auth.order_id))]
    async fn advance_checkout(&self, auth: &OrderAuth) -> Result<OrderPayload, GatewayError> {
        let path = format!("checkouts/{}/next", auth.order_id);
        self.execute(self.request(Method::PUT, &path, Some(auth)))
            .await
    }

    #[instrument(skip(self), fields(order_id = %auth.order_id, variant_id = %variant_id))]
    async fn create_line_item(
        &self,
        auth: &OrderAuth,
        variant_id: VariantId,
        quantity: u32,
    ) -> Result<LineItem, GatewayError> {
        let path = format!("orders/{}/line_items", auth.order_id);
        let body = serde_json::json!({
            "line_item": { "variant_id": variant_id, "quantity": quantity }
        });
        self.execute(self.request(Method::POST, &path, Some(auth)).json(&body))
            .await
    }

    #[instrument(skip(self), fields(order_id = %auth.order_id, line_item_id = %line_item_id))]
    async fn update_line_item(
        &self,
        auth: &OrderAuth,
        line_item_id: LineItemId,
        quantity: u32,
    ) -> Result<LineItem, GatewayError> {
        let path = format!("orders/{}/line_items/{line_item_id}", auth.order_id);
        let body = serde_json::json!({
            "line_item": { "quantity": quantity }
        });
        self.execute(self.request(Method::PUT, &path, Some(auth)).json(&body))
            .await
    }

    #[instrument(skip(self))]
    async fn list_countries(&self) -> Result<Vec<Country>, GatewayError> {
        self.execute(self.request(Method::GET, "countries", None))
            .await
    }

    #[instrument(skip(self), fields(country_id = %country_id))]
    async fn list_states(&self, country_id: CountryId) -> Result<Vec<StateRegion>, GatewayError> {
        let path = format!("countries/{country_id}/states");
        self.execute(self.request(Method::GET, &path, None)).await
    }
}
