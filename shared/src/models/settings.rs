//! Default pricing settings

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default cost and sale price per dozen, a single mutable row
///
/// Created zeroed and overwritten wholesale on save. Orders copy these values
/// at creation time; changing the defaults never touches existing orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Settings {
    pub cost_per_dozen_default: Decimal,
    pub sale_per_dozen_default: Decimal,
}

impl Settings {
    pub fn new(cost_per_dozen_default: Decimal, sale_per_dozen_default: Decimal) -> Self {
        Self {
            cost_per_dozen_default,
            sale_per_dozen_default,
        }
    }
}
