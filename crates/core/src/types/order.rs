//! The Order resource: the cart/checkout record tracked across a session.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::address::Address;
use super::id::{LineItemId, OrderId, VariantId};
use super::payment::Payment;
use super::shipment::Shipment;
use super::state::OrderState;
use super::variant::Variant;

/// A cart/order resource as reported by the commerce API.
///
/// The server is the source of truth for every field here. Locally we only
/// mutate line items in the `cart` state; everything else changes by
/// replacing the whole record with a freshly fetched copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Human-facing order number (e.g. "R123456789"), used in URLs.
    pub number: String,
    pub state: OrderState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_address: Option<Address>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    /// Populated by the server at the `delivery` step.
    #[serde(default)]
    pub shipments: Vec<Shipment>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    /// Opaque credential authorizing a guest session to act on this order.
    /// Only present on responses addressed to the owning session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_token: Option<String>,
    /// Ordered checkout step names the server reports for this order.
    /// Varies per order (e.g. digital orders have no `delivery` step).
    #[serde(default)]
    pub checkout_steps: Vec<OrderState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_total: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// The line item referencing `variant_id`, if any. At most one exists
    /// per variant; merges increment quantity instead of duplicating.
    #[must_use]
    pub fn line_item_for(&self, variant_id: VariantId) -> Option<&LineItem> {
        self.line_items.iter().find(|li| li.variant_id == variant_id)
    }

    /// Replace the line item matching `item`'s variant, or append it.
    pub fn put_line_item(&mut self, item: LineItem) {
        match self
            .line_items
            .iter_mut()
            .find(|li| li.variant_id == item.variant_id)
        {
            Some(existing) => *existing = item,
            None => self.line_items.push(item),
        }
    }

    /// First payment on the order, if any.
    #[must_use]
    pub fn first_payment(&self) -> Option<&Payment> {
        self.payments.first()
    }
}

/// A (variant, quantity) entry within an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub variant_id: VariantId,
    /// Positive item count; merging the same variant adds quantities.
    pub quantity: u32,
    /// Unit price captured when the item was added.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Nested variant record, when the server expands it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,
}
