//! Sugarloaf Core - Shared domain types.
//!
//! This crate provides the order/checkout domain types used across all
//! Sugarloaf components:
//! - `checkout` - Checkout orchestration client
//! - `integration-tests` - End-to-end test harness
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. The Order
//! resource and its nested records mirror the commerce API's JSON wire
//! format exactly; the server is authoritative for their contents.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, the Order resource, addresses, payments,
//!   shipments, and checkout states

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
