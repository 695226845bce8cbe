use serde::{Deserialize, Serialize};

/// One row of the shop's delivery pricing table.
///
/// Values are kept as displayed, including currency markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRate {
    /// Province code, e.g. `"16"`.
    pub wilaya_code: String,
    pub wilaya_name: String,
    /// Pickup office address.
    pub address: String,
    /// Delivery delay as displayed, e.g. `"24h - 48h"`.
    pub delay: String,
    /// Home delivery price.
    pub price: String,
    pub delivery_office_price: String,
}
