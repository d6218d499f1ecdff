//! Shipments and shipping rates, populated at the delivery step.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{ShipmentId, ShippingMethodId, ShippingRateId};

/// A shipment proposed by the server for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ShipmentId>,
    /// The rate the shopper picked (serialized back at the delivery step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_shipping_rate_id: Option<ShippingRateId>,
    /// Rates the server offers for this shipment.
    #[serde(default, skip_serializing)]
    pub shipping_rates: Vec<ShippingRate>,
}

/// A shipping rate quote within a shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRate {
    pub id: ShippingRateId,
    pub shipping_method_id: ShippingMethodId,
    pub name: String,
    pub cost: Decimal,
}
