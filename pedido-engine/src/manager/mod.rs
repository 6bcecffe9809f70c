//! PedidoManager - command side of the order engine
//!
//! This module handles:
//! - Command validation (before any store call)
//! - Order creation with week assignment and settings snapshot
//! - Order edits and lifecycle transitions
//! - Client and settings upserts
//! - Change broadcasting for the view layer
//!
//! # Command Flow
//!
//! ```text
//! create_order(...)
//!     ├─ 1. Validate (reject without writing on failure)
//!     ├─ 2. Resolve business week from now
//!     ├─ 3. Encode line items, sum dozens, snapshot settings
//!     ├─ 4. Persist (one transaction)
//!     └─ 5. Broadcast ChangeEvent
//! ```
//!
//! Mutations on an id unknown to the store are deliberate silent no-ops
//! (zero writes, no error): a stale reference from an outer layer never
//! crashes the flow. The same applies to transition attempts on an order
//! that is already delivered or cancelled - callers cannot distinguish
//! "already terminal" from "never existed" without re-reading state.

mod error;
pub use error::*;

#[cfg(test)]
mod tests;

use crate::detail;
use crate::storage::PedidoStorage;
use crate::week::{WeekCalendar, WeekRange};
use chrono::Utc;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::models::{Client, LineItem, Order, OrderStatus, Settings};
use std::path::Path;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Change broadcast channel capacity
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// A store mutation notification - the push signal for the view layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// An order in the given business week was inserted or overwritten
    Orders { week_id: String },
    /// A client row was inserted or overwritten
    Clients,
    /// The settings row was replaced
    Settings,
}

/// Command processor for orders, clients and settings
///
/// Each operation runs to completion independently: validate, at most one
/// read-modify-write round trip against the store, then a broadcast. The
/// manager holds no locks; concurrent commands on the same order resolve as
/// last-write-wins at the store.
pub struct PedidoManager {
    storage: PedidoStorage,
    calendar: WeekCalendar,
    change_tx: broadcast::Sender<ChangeEvent>,
}

impl PedidoManager {
    /// Create a manager with a database at the given path
    ///
    /// `tz` is the business timezone used for week boundaries.
    pub fn new(db_path: impl AsRef<Path>, tz: Tz) -> ManagerResult<Self> {
        let storage = PedidoStorage::open(db_path)?;
        let (change_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        tracing::info!(tz = %tz, "PedidoManager started");
        Ok(Self {
            storage,
            calendar: WeekCalendar::new(tz),
            change_tx,
        })
    }

    /// Create a manager over existing storage (for testing)
    #[cfg(test)]
    pub fn with_storage(storage: PedidoStorage, tz: Tz) -> Self {
        let (change_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            storage,
            calendar: WeekCalendar::new(tz),
            change_tx,
        }
    }

    /// Subscribe to store mutation notifications
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.change_tx.subscribe()
    }

    /// The underlying store (read access for the view layer)
    pub fn storage(&self) -> &PedidoStorage {
        &self.storage
    }

    /// The business-week calendar
    pub fn calendar(&self) -> WeekCalendar {
        self.calendar
    }

    /// Business week containing the current instant
    pub fn current_week(&self) -> WeekRange {
        self.calendar.current_week_range()
    }

    /// Current settings row (zeroed defaults when never saved)
    ///
    /// Callers snapshot this once and pass it to [`create_order`]; the order
    /// copies the values and never sees later settings changes.
    ///
    /// [`create_order`]: Self::create_order
    pub fn current_settings(&self) -> ManagerResult<Settings> {
        Ok(self.storage.get_settings()?)
    }

    // ========== Order Commands ==========

    /// Create a new pending order for the current business week
    ///
    /// Rejects without writing when the client name is blank, the item list
    /// is empty, any item is invalid, or `settings` carries a negative
    /// value. On success the order snapshots the settings' cost/sale and is
    /// pinned to the week containing now.
    pub fn create_order(
        &self,
        client_name: &str,
        items: &[LineItem],
        settings: &Settings,
    ) -> ManagerResult<()> {
        validate_client_name(client_name)?;
        validate_items(items)?;
        if settings.cost_per_dozen_default < Decimal::ZERO
            || settings.sale_per_dozen_default < Decimal::ZERO
        {
            return Err(ManagerError::NegativePricing);
        }

        let now = Utc::now().timestamp_millis();
        let week = self.calendar.week_range_for(now);
        let order = Order {
            id: Uuid::new_v4().to_string(),
            client_name: client_name.trim().to_string(),
            detail: detail::encode(items),
            total_dozens: items.iter().map(|i| i.dozens).sum(),
            status: OrderStatus::Pending,
            created_at: now,
            week_id: week.week_id.clone(),
            unit_cost_per_dozen: settings.cost_per_dozen_default,
            unit_sale_per_dozen: settings.sale_per_dozen_default,
        };
        self.storage.insert_order(&order)?;
        tracing::info!(
            order_id = %order.id,
            week_id = %order.week_id,
            total_dozens = order.total_dozens,
            "Order created"
        );
        self.notify(ChangeEvent::Orders {
            week_id: week.week_id,
        });
        Ok(())
    }

    /// Overwrite an existing order's client and line items
    ///
    /// Status, week, creation time and the price snapshot are untouched.
    /// An unknown id is a silent no-op.
    pub fn update_order(
        &self,
        id: &str,
        client_name: &str,
        items: &[LineItem],
    ) -> ManagerResult<()> {
        validate_client_name(client_name)?;
        validate_items(items)?;

        let Some(existing) = self.storage.find_order_by_id(id)? else {
            tracing::debug!(order_id = %id, "Update ignored: order not found");
            return Ok(());
        };

        let updated = Order {
            client_name: client_name.trim().to_string(),
            detail: detail::encode(items),
            total_dozens: items.iter().map(|i| i.dozens).sum(),
            ..existing
        };
        self.storage.update_order(&updated)?;
        tracing::info!(order_id = %id, total_dozens = updated.total_dozens, "Order updated");
        self.notify(ChangeEvent::Orders {
            week_id: updated.week_id,
        });
        Ok(())
    }

    /// Mark a pending order as delivered
    pub fn mark_delivered(&self, id: &str) -> ManagerResult<()> {
        self.transition(id, OrderStatus::Delivered)
    }

    /// Cancel a pending order
    ///
    /// Cancelled orders stay in the store; they just stop contributing to
    /// weekly totals and rankings.
    pub fn cancel_order(&self, id: &str) -> ManagerResult<()> {
        self.transition(id, OrderStatus::Cancelled)
    }

    fn transition(&self, id: &str, next: OrderStatus) -> ManagerResult<()> {
        let Some(existing) = self.storage.find_order_by_id(id)? else {
            tracing::debug!(order_id = %id, to = ?next, "Transition ignored: order not found");
            return Ok(());
        };
        if !existing.status.can_transition_to(next) {
            tracing::debug!(
                order_id = %id,
                from = ?existing.status,
                to = ?next,
                "Transition ignored: not allowed"
            );
            return Ok(());
        }

        let updated = Order {
            status: next,
            ..existing
        };
        self.storage.update_order(&updated)?;
        tracing::info!(order_id = %id, status = ?next, "Order transitioned");
        self.notify(ChangeEvent::Orders {
            week_id: updated.week_id,
        });
        Ok(())
    }

    // ========== Client Commands ==========

    /// Create a client; every field is trimmed, duplicates are allowed
    pub fn create_client(
        &self,
        name: &str,
        street: &str,
        street_number: &str,
        cross_streets: &str,
        phone: &str,
    ) -> ManagerResult<()> {
        validate_client_name(name)?;
        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            street: street.trim().to_string(),
            street_number: street_number.trim().to_string(),
            cross_streets: cross_streets.trim().to_string(),
            phone: phone.trim().to_string(),
        };
        self.storage.upsert_client(&client)?;
        tracing::info!(client_id = %client.id, "Client created");
        self.notify(ChangeEvent::Clients);
        Ok(())
    }

    /// Full overwrite of a client by id, same trimming as create
    pub fn update_client(
        &self,
        id: &str,
        name: &str,
        street: &str,
        street_number: &str,
        cross_streets: &str,
        phone: &str,
    ) -> ManagerResult<()> {
        validate_client_name(name)?;
        let client = Client {
            id: id.to_string(),
            name: name.trim().to_string(),
            street: street.trim().to_string(),
            street_number: street_number.trim().to_string(),
            cross_streets: cross_streets.trim().to_string(),
            phone: phone.trim().to_string(),
        };
        self.storage.upsert_client(&client)?;
        tracing::info!(client_id = %id, "Client updated");
        self.notify(ChangeEvent::Clients);
        Ok(())
    }

    // ========== Settings Commands ==========

    /// Replace the default pricing row wholesale
    pub fn save_settings(&self, cost: Decimal, sale: Decimal) -> ManagerResult<()> {
        if cost < Decimal::ZERO || sale < Decimal::ZERO {
            return Err(ManagerError::NegativePricing);
        }
        self.storage.upsert_settings(&Settings::new(cost, sale))?;
        tracing::info!(%cost, %sale, "Settings saved");
        self.notify(ChangeEvent::Settings);
        Ok(())
    }

    fn notify(&self, event: ChangeEvent) {
        // No receivers is fine: views may not be attached
        let _ = self.change_tx.send(event);
    }
}

fn validate_client_name(name: &str) -> ManagerResult<()> {
    if name.trim().is_empty() {
        return Err(ManagerError::ClientNameRequired);
    }
    Ok(())
}

fn validate_items(items: &[LineItem]) -> ManagerResult<()> {
    if items.is_empty() {
        return Err(ManagerError::EmptyItems);
    }
    if items
        .iter()
        .any(|item| item.dozens <= 0 || item.flavor.trim().is_empty())
    {
        return Err(ManagerError::InvalidLineItem);
    }
    Ok(())
}
