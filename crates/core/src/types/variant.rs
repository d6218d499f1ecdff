//! Product variants referenced by line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::VariantId;

/// A purchasable product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub sku: String,
    pub name: String,
    /// Unit price, decimal-as-string on the wire.
    pub price: Decimal,
    /// Whether the variant can currently be added to a cart.
    #[serde(default = "default_true")]
    pub in_stock: bool,
}

const fn default_true() -> bool {
    true
}
