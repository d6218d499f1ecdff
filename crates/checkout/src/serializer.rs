//! State-dependent checkout payload serialization.
//!
//! The commerce API's checkout endpoint accepts different payload shapes
//! depending on which step is being submitted. This module is a pure
//! transform from an [`Order`] to that wire shape; it performs no network
//! calls and never mutates the order.
//!
//! # Payload shape
//!
//! - Always: the order's plain attributes under `order`, plus a top-level
//!   `state` mirroring the submitted step.
//! - `address`: present addresses embedded as
//!   `order.bill_address_attributes` / `order.ship_address_attributes`;
//!   absent addresses are omitted entirely, not null-filled.
//! - `delivery`: shipments embedded as `order.shipments_attributes`, a map
//!   keyed by zero-based positional index.
//! - `payment`: only when the first payment carries an unsaved source, a
//!   top-level `payment_source` map keyed by payment-method id plus a
//!   single-entry `order.payments_attributes` naming that method. Persisted
//!   payment data is never re-sent.

use serde_json::{Map, Value, json};

use sugarloaf_core::{Order, OrderState};

/// Serialize `order` for submitting its current state.
///
/// # Errors
///
/// Returns an error if any nested record fails to serialize.
pub fn checkout_payload(order: &Order) -> Result<Value, serde_json::Error> {
    checkout_payload_for(order, order.state)
}

/// Serialize `order` for submitting `state` (the transition target, which
/// may differ from the order's current state).
///
/// # Errors
///
/// Returns an error if any nested record fails to serialize.
pub fn checkout_payload_for(order: &Order, state: OrderState) -> Result<Value, serde_json::Error> {
    let mut order_params = Map::new();

    if let Some(email) = &order.email {
        order_params.insert("email".to_string(), json!(email));
    }

    match state {
        OrderState::Address => {
            if let Some(bill) = &order.bill_address {
                order_params.insert(
                    "bill_address_attributes".to_string(),
                    serde_json::to_value(bill)?,
                );
            }
            if let Some(ship) = &order.ship_address {
                order_params.insert(
                    "ship_address_attributes".to_string(),
                    serde_json::to_value(ship)?,
                );
            }
        }
        OrderState::Delivery => {
            if !order.shipments.is_empty() {
                let mut shipments = Map::new();
                for (index, shipment) in order.shipments.iter().enumerate() {
                    shipments.insert(index.to_string(), serde_json::to_value(shipment)?);
                }
                order_params.insert("shipments_attributes".to_string(), Value::Object(shipments));
            }
        }
        OrderState::Payment => {
            // Only a new source on a new payment is submitted here;
            // already-persisted payments stay untouched server-side.
            if let Some(payment) = order.first_payment().filter(|p| p.has_unsaved_source())
                && let Some(source) = &payment.source
            {
                let method_id = payment.payment_method_id;
                let mut payment_source = Map::new();
                payment_source.insert(method_id.to_string(), serde_json::to_value(source)?);

                let mut root = base_payload(order_params, state);
                insert_order_key(
                    &mut root,
                    "payments_attributes",
                    json!([{ "payment_method_id": method_id }]),
                );
                root.insert("payment_source".to_string(), Value::Object(payment_source));
                return Ok(Value::Object(root));
            }
        }
        OrderState::Cart | OrderState::Confirm | OrderState::Complete => {}
    }

    Ok(Value::Object(base_payload(order_params, state)))
}

fn base_payload(order_params: Map<String, Value>, state: OrderState) -> Map<String, Value> {
    let mut root = Map::new();
    root.insert("order".to_string(), Value::Object(order_params));
    root.insert("state".to_string(), json!(state));
    root
}

fn insert_order_key(root: &mut Map<String, Value>, key: &str, value: Value) {
    if let Some(Value::Object(order_params)) = root.get_mut("order") {
        order_params.insert(key.to_string(), value);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sugarloaf_core::{
        Address, AddressId, CountryId, LineItemId, Order, OrderId, Payment, PaymentMethodId,
        PaymentSource, PaymentSourceId, Shipment, ShipmentId, ShippingRateId, StateId,
    };

    fn base_order(state: OrderState) -> Order {
        Order {
            id: OrderId::new(1),
            number: "R100000001".to_string(),
            state,
            email: Some("jo@example.com".to_string()),
            bill_address: None,
            ship_address: None,
            line_items: Vec::new(),
            shipments: Vec::new(),
            payments: Vec::new(),
            guest_token: None,
            checkout_steps: vec![
                OrderState::Address,
                OrderState::Delivery,
                OrderState::Payment,
                OrderState::Confirm,
            ],
            item_total: None,
            total: None,
            completed_at: None,
        }
    }

    fn address() -> Address {
        Address {
            id: Some(AddressId::new(3)),
            firstname: "Jo".to_string(),
            lastname: "Tester".to_string(),
            address1: "1 Main St".to_string(),
            address2: None,
            city: "Springfield".to_string(),
            zipcode: "12345".to_string(),
            phone: "555-0100".to_string(),
            country_id: CountryId::new(232),
            state_id: Some(StateId::new(48)),
        }
    }

    fn dirty_card() -> PaymentSource {
        PaymentSource {
            id: None,
            name: "Jo Tester".to_string(),
            number: "4111111111111111".to_string(),
            month: "12".to_string(),
            year: "2030".to_string(),
            verification_value: Some("123".to_string()),
        }
    }

    #[test]
    fn test_base_payload_has_order_and_state() {
        let order = base_order(OrderState::Cart);
        let payload = checkout_payload(&order).unwrap();

        assert_eq!(payload["state"], "cart");
        assert_eq!(payload["order"]["email"], "jo@example.com");
    }

    #[test]
    fn test_address_state_embeds_present_addresses() {
        let mut order = base_order(OrderState::Address);
        order.bill_address = Some(address());
        order.ship_address = Some(address());

        let payload = checkout_payload(&order).unwrap();
        let expected = serde_json::to_value(address()).unwrap();

        assert_eq!(payload["order"]["bill_address_attributes"], expected);
        assert_eq!(payload["order"]["ship_address_attributes"], expected);
    }

    #[test]
    fn test_address_state_omits_absent_addresses() {
        let mut order = base_order(OrderState::Address);
        order.bill_address = Some(address());

        let payload = checkout_payload(&order).unwrap();
        let order_params = payload["order"].as_object().unwrap();

        assert!(order_params.contains_key("bill_address_attributes"));
        // Omitted entirely, not null-filled
        assert!(!order_params.contains_key("ship_address_attributes"));
    }

    #[test]
    fn test_delivery_state_keys_shipments_by_index() {
        let mut order = base_order(OrderState::Delivery);
        order.shipments = vec![
            Shipment {
                id: Some(ShipmentId::new(10)),
                selected_shipping_rate_id: Some(ShippingRateId::new(1)),
                shipping_rates: Vec::new(),
            },
            Shipment {
                id: Some(ShipmentId::new(11)),
                selected_shipping_rate_id: Some(ShippingRateId::new(2)),
                shipping_rates: Vec::new(),
            },
        ];

        let payload = checkout_payload(&order).unwrap();
        let shipments = payload["order"]["shipments_attributes"].as_object().unwrap();

        assert_eq!(shipments.len(), 2);
        assert_eq!(shipments["0"]["id"], 10);
        assert_eq!(shipments["1"]["id"], 11);
    }

    #[test]
    fn test_delivery_state_without_shipments_adds_nothing() {
        let order = base_order(OrderState::Delivery);
        let payload = checkout_payload(&order).unwrap();

        assert!(
            !payload["order"]
                .as_object()
                .unwrap()
                .contains_key("shipments_attributes")
        );
    }

    #[test]
    fn test_payment_state_with_dirty_source() {
        let mut order = base_order(OrderState::Payment);
        order.payments = vec![Payment {
            id: None,
            payment_method_id: PaymentMethodId::new(42),
            amount: None,
            source: Some(dirty_card()),
        }];

        let payload = checkout_payload(&order).unwrap();

        assert_eq!(
            payload["payment_source"]["42"],
            serde_json::to_value(dirty_card()).unwrap()
        );
        assert_eq!(
            payload["order"]["payments_attributes"],
            serde_json::json!([{ "payment_method_id": 42 }])
        );
    }

    #[test]
    fn test_payment_state_with_persisted_source_adds_nothing() {
        let mut order = base_order(OrderState::Payment);
        order.payments = vec![Payment {
            id: Some(sugarloaf_core::PaymentId::new(7)),
            payment_method_id: PaymentMethodId::new(42),
            amount: None,
            source: Some(PaymentSource {
                id: Some(PaymentSourceId::new(9)),
                ..dirty_card()
            }),
        }];

        let payload = checkout_payload(&order).unwrap();
        let root = payload.as_object().unwrap();

        assert!(!root.contains_key("payment_source"));
        assert!(!root["order"].as_object().unwrap().contains_key("payments_attributes"));
    }

    #[test]
    fn test_payment_state_without_payments_adds_nothing() {
        let order = base_order(OrderState::Payment);
        let payload = checkout_payload(&order).unwrap();
        let root = payload.as_object().unwrap();

        assert!(!root.contains_key("payment_source"));
        assert!(!root["order"].as_object().unwrap().contains_key("payments_attributes"));
    }

    #[test]
    fn test_confirm_state_is_base_payload_only() {
        let payload = checkout_payload(&base_order(OrderState::Confirm)).unwrap();
        let root = payload.as_object().unwrap();

        assert_eq!(root.len(), 2);
        assert_eq!(payload["state"], "confirm");
    }

    #[test]
    fn test_payload_for_target_state_differs_from_current() {
        let mut order = base_order(OrderState::Cart);
        order.bill_address = Some(address());

        // Serializing for the address target embeds the address even though
        // the order is still in cart
        let payload = checkout_payload_for(&order, OrderState::Address).unwrap();
        assert_eq!(payload["state"], "address");
        assert!(
            payload["order"]
                .as_object()
                .unwrap()
                .contains_key("bill_address_attributes")
        );
    }

    #[test]
    fn test_base_payload_never_embeds_line_items() {
        // Line items never appear in checkout submissions.
        let mut order = base_order(OrderState::Cart);
        order.line_items.push(sugarloaf_core::LineItem {
            id: LineItemId::new(1),
            variant_id: sugarloaf_core::VariantId::new(2),
            quantity: 1,
            price: None,
            variant: None,
        });

        let payload = checkout_payload(&order).unwrap();
        assert!(!payload["order"].as_object().unwrap().contains_key("line_items"));
    }
}
