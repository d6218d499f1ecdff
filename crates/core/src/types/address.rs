//! Billing and shipping addresses, with country/region lookups.

use serde::{Deserialize, Serialize};

use super::id::{AddressId, CountryId, StateId};

/// A billing or shipping address on an order.
///
/// `country_id` and `state_id` reference the server's lookup entities; the
/// optional denormalized names are display conveniences returned alongside
/// persisted addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Server-side ID (absent on addresses not yet persisted).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<AddressId>,
    pub firstname: String,
    pub lastname: String,
    pub address1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    pub city: String,
    pub zipcode: String,
    pub phone: String,
    /// Country lookup reference.
    pub country_id: CountryId,
    /// Region lookup reference (absent for countries without subdivisions).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<StateId>,
}

/// Country reference-data record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    /// ISO 3166-1 alpha-2 code.
    pub iso: String,
    pub name: String,
    /// Whether the country requires a region on addresses.
    #[serde(default)]
    pub states_required: bool,
}

/// Region (state/province) reference-data record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRegion {
    pub id: StateId,
    pub country_id: CountryId,
    pub abbr: String,
    pub name: String,
}
