//! Core types for Sugarloaf.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod id;
pub mod order;
pub mod payment;
pub mod shipment;
pub mod state;
pub mod variant;

pub use address::{Address, Country, StateRegion};
pub use id::*;
pub use order::{LineItem, Order};
pub use payment::{Payment, PaymentSource};
pub use shipment::{Shipment, ShippingRate};
pub use state::{OrderState, OrderStateError};
pub use variant::Variant;
