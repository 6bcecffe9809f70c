//! Order engine for a weekly, dozens-based food business
//!
//! The engine is the whole domain layer of the tracker: orders grouped into
//! Friday-through-Thursday business weeks, per-order line items by flavor,
//! and the weekly financial and popularity reports over them.
//!
//! - **week**: business-week calendar (timestamp → week id + label)
//! - **detail**: line-item codec for the encoded `detail` column
//! - **storage**: redb-based persistence layer
//! - **manager**: command side (orders, clients, settings)
//! - **reports**: pure weekly aggregation functions
//! - **views**: push-driven reactive query side
//!
//! # Data Flow
//!
//! ```text
//! Command → PedidoManager → Storage (redb)
//!                 ↓
//!           ChangeEvent broadcast
//!                 ↓
//!            OrderViews → watch channels (summary, rankings, weeks, ...)
//! ```
//!
//! Mutations are validated before any store call; a validation failure is a
//! rejected command, not a panic or a persisted half-write. Reads are live
//! views: each aggregation re-emits when a relevant mutation lands.

pub mod detail;
pub mod manager;
pub mod reports;
pub mod storage;
pub mod views;
pub mod week;

// Re-exports
pub use manager::{ChangeEvent, ManagerError, ManagerResult, PedidoManager};
pub use storage::{PedidoStorage, StorageError, StorageResult};
pub use views::{OrderViews, WeekDashboard};
pub use week::{WeekCalendar, WeekRange};

// Re-export shared types for convenience
pub use shared::models::{
    Client, ClientTotal, FlavorTotal, LineItem, Order, OrderStatus, Settings, WeekSummary,
};
