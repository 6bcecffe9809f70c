//! Order row model and lifecycle status

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order status
///
/// The lifecycle is a three-state machine: every order starts `Pending` and
/// moves to `Delivered` or `Cancelled` via an explicit action. Both of those
/// are terminal. Orders are never deleted, only status-transitioned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Nothing transitions out of `Delivered` or `Cancelled`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Valid transitions: `Pending → Delivered` and `Pending → Cancelled`.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Delivered) | (Self::Pending, Self::Cancelled)
        )
    }
}

/// One flavor/quantity pair within an order
///
/// Not persisted as its own row: the ordered list is packed into the order's
/// `detail` column by the engine's codec.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineItem {
    pub flavor: String,
    /// Quantity in dozens, always > 0 once persisted
    pub dozens: i32,
}

impl LineItem {
    pub fn new(flavor: impl Into<String>, dozens: i32) -> Self {
        Self {
            flavor: flavor.into(),
            dozens,
        }
    }
}

/// Persisted order row
///
/// `client_name` is a denormalized copy, not a foreign key: renaming a client
/// never rewrites past orders. `unit_cost_per_dozen` / `unit_sale_per_dozen`
/// are a snapshot of [`Settings`](super::Settings) taken at creation time,
/// and `week_id` is fixed from `created_at`. None of the three change after
/// insert, so weekly reports stay historically accurate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    pub client_name: String,
    /// Encoded line items (see the engine's detail codec)
    pub detail: String,
    /// Sum of all line-item dozens
    pub total_dozens: i32,
    pub status: OrderStatus,
    /// Creation timestamp (epoch millis)
    pub created_at: i64,
    /// Business week identifier, `YYYYMMDD_YYYYMMDD`
    pub week_id: String,
    pub unit_cost_per_dozen: Decimal,
    pub unit_sale_per_dozen: Decimal,
}
