//! Derived report rows - computed per business week, never persisted

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Weekly financial summary
///
/// Money totals and `order_count` cover all non-cancelled orders of the week;
/// `pending_count` counts only pending ones. Recomputed from current state on
/// every change, never accumulated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct WeekSummary {
    pub total_sales: Decimal,
    pub total_costs: Decimal,
    /// Always `total_sales - total_costs`
    pub profit: Decimal,
    pub order_count: u32,
    pub pending_count: u32,
}

/// One row of the weekly flavor ranking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlavorTotal {
    pub flavor: String,
    pub total_dozens: i64,
}

/// One row of the weekly client ranking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientTotal {
    pub client_name: String,
    pub order_count: u32,
    pub total_dozens: i64,
}
