//! Unified error type for checkout orchestration.
//!
//! Each layer (gateway, store, machine) defines its own error enum; this
//! module folds them into a single `CheckoutError` that session operations
//! return. Failures are returned, never thrown across the call boundary --
//! callers inspect the variant, and the session has already broadcast a
//! `ServerError` event for gateway failures by the time they see it.

use thiserror::Error;

use crate::api::GatewayError;
use crate::machine::TransitionError;
use crate::store::StoreError;

/// Errors returned by checkout session operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Remote commerce API call failed (network/transport or bad status).
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Durable session storage failed.
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    /// Illegal checkout transition (local usage error, no server call made).
    #[error("Transition error: {0}")]
    Transition(#[from] TransitionError),

    /// Payload serialization failed.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// An operation that needs a current order was called without one.
    #[error("No current order in this session")]
    NoCurrentOrder,
}

/// Result type alias for `CheckoutError`.
pub type Result<T> = std::result::Result<T, CheckoutError>;
