//! Sugarloaf Checkout - client-side checkout orchestration.
//!
//! Tracks a single cart/order against a Spree-compatible commerce API and
//! drives it through the linear checkout sequence
//! (cart → address → delivery → payment → confirm → complete).
//!
//! # Architecture
//!
//! - [`session::CheckoutSession`] is the façade: it owns the current order,
//!   the attached [`machine::CheckoutMachine`], and the persisted session
//!   identifiers (`order_id`, `guest_token`).
//! - [`api::OrderGateway`] is the narrow contract to the remote commerce
//!   API; [`api::HttpGateway`] is the `reqwest` implementation.
//! - [`serializer`] formats state-dependent checkout payloads.
//! - [`store::SessionStore`] persists `{order_id, guest_token}` across
//!   restarts; [`events::EventBus`] broadcasts checkout lifecycle events to
//!   UI/routing layers.
//!
//! The server is authoritative: local state only ever mirrors what a fetch
//! confirmed. Gateway failures are surfaced as [`error::CheckoutError`]
//! values and as [`events::CheckoutEvent::ServerError`] broadcasts, never
//! as panics.
//!
//! # Example
//!
//! ```rust,ignore
//! use sugarloaf_checkout::{CheckoutConfig, CheckoutSession};
//!
//! let config = CheckoutConfig::from_env()?;
//! let mut session = CheckoutSession::from_config(&config)?;
//!
//! // Restore a persisted session, if any
//! session.initialize().await?;
//!
//! // Add an item, then walk the checkout
//! session.add_to_cart(variant_id, 2).await?;
//! session.advance_current_order().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod machine;
pub mod serializer;
pub mod session;
pub mod store;

pub use api::{GatewayError, HttpGateway, OrderAuth, OrderGateway, OrderPayload};
pub use config::{CheckoutConfig, ConfigError};
pub use error::CheckoutError;
pub use events::{CheckoutEvent, EventBus};
pub use machine::{CheckoutMachine, TransitionError};
pub use session::CheckoutSession;
pub use store::{JsonFileStore, MemoryStore, PersistedSession, SessionStore, StoreError};
