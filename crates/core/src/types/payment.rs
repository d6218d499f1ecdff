//! Payments and payment sources.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{PaymentId, PaymentMethodId, PaymentSourceId};

/// A payment attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Server-side ID (absent until the payment is persisted).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<PaymentId>,
    pub payment_method_id: PaymentMethodId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// Payment source sub-record (e.g. a credit card).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PaymentSource>,
}

impl Payment {
    /// Whether this payment carries a source not yet persisted server-side.
    #[must_use]
    pub fn has_unsaved_source(&self) -> bool {
        self.source.as_ref().is_some_and(PaymentSource::is_unsaved)
    }
}

/// A payment source sub-record.
///
/// A source without a server-side `id` is "dirty": it has been entered
/// locally but not yet attached to a payment on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<PaymentSourceId>,
    pub name: String,
    /// Card number; the server masks it on the way back.
    pub number: String,
    pub month: String,
    pub year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_value: Option<String>,
}

impl PaymentSource {
    /// Whether the source has not yet been persisted server-side.
    #[must_use]
    pub const fn is_unsaved(&self) -> bool {
        self.id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> PaymentSource {
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
    fn test_source_without_id_is_unsaved() {
        assert!(card().is_unsaved());

        let saved = PaymentSource {
            id: Some(PaymentSourceId::new(5)),
            ..card()
        };
        assert!(!saved.is_unsaved());
    }

    #[test]
    fn test_payment_unsaved_source_detection() {
        let payment = Payment {
            id: None,
            payment_method_id: PaymentMethodId::new(1),
            amount: None,
            source: Some(card()),
        };
        assert!(payment.has_unsaved_source());

        let without_source = Payment {
            source: None,
            ..payment
        };
        assert!(!without_source.has_unsaved_source());
    }
}
