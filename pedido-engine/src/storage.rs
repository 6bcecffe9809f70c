//! redb-based storage layer
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` | Order rows (JSON) |
//! | `week_index` | `(week_id, order_id)` | `()` | By-week scans |
//! | `clients` | `client_id` | `Client` | Client rows (JSON) |
//! | `settings` | `"settings"` | `Settings` | Single default-pricing row |
//!
//! # Durability
//!
//! redb commits are persistent as soon as `commit()` returns (copy-on-write
//! with atomic pointer swap), so the database file is always in a consistent
//! state even through power loss. Every mutation here is one transaction;
//! there is no cross-call atomicity guarantee and a concurrent update and
//! cancel of the same order resolves as last-write-wins.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::models::{Client, Order, OrderStatus, Settings};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for order rows: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Table indexing orders by business week: key = (week_id, order_id), value = empty
const WEEK_INDEX_TABLE: TableDefinition<(&str, &str), ()> = TableDefinition::new("week_index");

/// Table for client rows: key = client_id, value = JSON-serialized Client
const CLIENTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("clients");

/// Table for the settings singleton: key = fixed, value = JSON-serialized Settings
const SETTINGS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("settings");

const SETTINGS_KEY: &str = "settings";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Embedded store for orders, clients and settings, backed by redb
#[derive(Clone)]
pub struct PedidoStorage {
    db: Arc<Database>,
}

impl PedidoStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        // Create all tables up front so readers never race table creation
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(WEEK_INDEX_TABLE)?;
            let _ = write_txn.open_table(CLIENTS_TABLE)?;
            let _ = write_txn.open_table(SETTINGS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Order Operations ==========

    /// Insert a new order and index it under its business week
    pub fn insert_order(&self, order: &Order) -> StorageResult<()> {
        let txn = self.begin_write()?;
        {
            let mut orders = txn.open_table(ORDERS_TABLE)?;
            let value = serde_json::to_vec(order)?;
            orders.insert(order.id.as_str(), value.as_slice())?;

            let mut index = txn.open_table(WEEK_INDEX_TABLE)?;
            index.insert((order.week_id.as_str(), order.id.as_str()), ())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Overwrite an order row by id (full-record replace)
    ///
    /// `week_id` never changes after insert, so the week index entry is
    /// simply re-asserted.
    pub fn update_order(&self, order: &Order) -> StorageResult<()> {
        let txn = self.begin_write()?;
        {
            let mut orders = txn.open_table(ORDERS_TABLE)?;
            let value = serde_json::to_vec(order)?;
            orders.insert(order.id.as_str(), value.as_slice())?;

            let mut index = txn.open_table(WEEK_INDEX_TABLE)?;
            index.insert((order.week_id.as_str(), order.id.as_str()), ())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Find an order by id
    pub fn find_order_by_id(&self, id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All orders of a business week, newest first
    pub fn orders_by_week(&self, week_id: &str) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(WEEK_INDEX_TABLE)?;
        let orders_table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in index.range((week_id, "")..)? {
            let (key, _value) = result?;
            let (indexed_week, order_id) = key.value();
            if indexed_week != week_id {
                break;
            }
            if let Some(guard) = orders_table.get(order_id)? {
                let order: Order = serde_json::from_slice(guard.value())?;
                orders.push(order);
            }
        }

        orders.sort_by_key(|o| std::cmp::Reverse(o.created_at));
        Ok(orders)
    }

    /// Orders of a week with the given status, newest first
    pub fn orders_by_week_and_status(
        &self,
        week_id: &str,
        status: OrderStatus,
    ) -> StorageResult<Vec<Order>> {
        let mut orders = self.orders_by_week(week_id)?;
        orders.retain(|o| o.status == status);
        Ok(orders)
    }

    /// Orders of a week excluding cancelled ones, newest first
    pub fn active_orders_by_week(&self, week_id: &str) -> StorageResult<Vec<Order>> {
        let mut orders = self.orders_by_week(week_id)?;
        orders.retain(|o| o.status != OrderStatus::Cancelled);
        Ok(orders)
    }

    /// Number of pending orders in a week
    pub fn pending_count_for_week(&self, week_id: &str) -> StorageResult<u32> {
        Ok(self
            .orders_by_week_and_status(week_id, OrderStatus::Pending)?
            .len() as u32)
    }

    /// Every distinct week id ever recorded, newest first
    pub fn distinct_week_ids(&self) -> StorageResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(WEEK_INDEX_TABLE)?;

        let mut weeks: Vec<String> = Vec::new();
        for result in index.iter()? {
            let (key, _value) = result?;
            let (week_id, _order_id) = key.value();
            // Index iterates in key order, so duplicates are adjacent
            if weeks.last().map(String::as_str) != Some(week_id) {
                weeks.push(week_id.to_string());
            }
        }

        weeks.reverse();
        Ok(weeks)
    }

    // ========== Client Operations ==========

    /// Insert or replace a client by id
    pub fn upsert_client(&self, client: &Client) -> StorageResult<()> {
        let txn = self.begin_write()?;
        {
            let mut table = txn.open_table(CLIENTS_TABLE)?;
            let value = serde_json::to_vec(client)?;
            table.insert(client.id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Find a client by id
    pub fn find_client_by_id(&self, id: &str) -> StorageResult<Option<Client>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CLIENTS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All clients ordered case-insensitively by name
    pub fn list_clients(&self) -> StorageResult<Vec<Client>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CLIENTS_TABLE)?;

        let mut clients = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let client: Client = serde_json::from_slice(value.value())?;
            clients.push(client);
        }

        clients.sort_by_key(|c| c.name.to_lowercase());
        Ok(clients)
    }

    // ========== Settings Operations ==========

    /// Replace the settings row wholesale
    pub fn upsert_settings(&self, settings: &Settings) -> StorageResult<()> {
        let txn = self.begin_write()?;
        {
            let mut table = txn.open_table(SETTINGS_TABLE)?;
            let value = serde_json::to_vec(settings)?;
            table.insert(SETTINGS_KEY, value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Current settings, zeroed defaults when the row was never saved
    pub fn get_settings(&self) -> StorageResult<Settings> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SETTINGS_TABLE)?;
        match table.get(SETTINGS_KEY)? {
            Some(guard) => Ok(serde_json::from_slice(guard.value())?),
            None => Ok(Settings::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::LineItem;

    fn order(id: &str, week_id: &str, created_at: i64, status: OrderStatus) -> Order {
        Order {
            id: id.to_string(),
            client_name: "Ana".to_string(),
            detail: crate::detail::encode(&[LineItem::new("Capresse", 2)]),
            total_dozens: 2,
            status,
            created_at,
            week_id: week_id.to_string(),
            unit_cost_per_dozen: Decimal::from(100),
            unit_sale_per_dozen: Decimal::from(250),
        }
    }

    #[test]
    fn insert_and_find_roundtrip() {
        let storage = PedidoStorage::open_in_memory().unwrap();
        let o = order("o1", "20240503_20240509", 10, OrderStatus::Pending);
        storage.insert_order(&o).unwrap();
        assert_eq!(storage.find_order_by_id("o1").unwrap(), Some(o));
        assert_eq!(storage.find_order_by_id("missing").unwrap(), None);
    }

    #[test]
    fn update_overwrites_the_full_record() {
        let storage = PedidoStorage::open_in_memory().unwrap();
        let mut o = order("o1", "20240503_20240509", 10, OrderStatus::Pending);
        storage.insert_order(&o).unwrap();
        o.status = OrderStatus::Delivered;
        o.client_name = "Beatriz".to_string();
        storage.update_order(&o).unwrap();
        assert_eq!(storage.find_order_by_id("o1").unwrap(), Some(o));
    }

    #[test]
    fn week_scans_are_scoped_and_newest_first() {
        let storage = PedidoStorage::open_in_memory().unwrap();
        storage
            .insert_order(&order("o1", "20240503_20240509", 10, OrderStatus::Pending))
            .unwrap();
        storage
            .insert_order(&order("o2", "20240503_20240509", 20, OrderStatus::Delivered))
            .unwrap();
        storage
            .insert_order(&order("o3", "20240510_20240516", 30, OrderStatus::Pending))
            .unwrap();

        let week = storage.orders_by_week("20240503_20240509").unwrap();
        assert_eq!(
            week.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(),
            ["o2", "o1"]
        );
        assert_eq!(storage.orders_by_week("20240510_20240516").unwrap().len(), 1);
        assert!(storage.orders_by_week("20240417_20240423").unwrap().is_empty());
    }

    #[test]
    fn active_scan_excludes_cancelled() {
        let storage = PedidoStorage::open_in_memory().unwrap();
        storage
            .insert_order(&order("o1", "20240503_20240509", 10, OrderStatus::Pending))
            .unwrap();
        storage
            .insert_order(&order("o2", "20240503_20240509", 20, OrderStatus::Cancelled))
            .unwrap();

        let active = storage.active_orders_by_week("20240503_20240509").unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "o1");
        assert_eq!(storage.pending_count_for_week("20240503_20240509").unwrap(), 1);
    }

    #[test]
    fn distinct_week_ids_are_deduplicated_newest_first() {
        let storage = PedidoStorage::open_in_memory().unwrap();
        storage
            .insert_order(&order("o1", "20240503_20240509", 10, OrderStatus::Pending))
            .unwrap();
        storage
            .insert_order(&order("o2", "20240503_20240509", 20, OrderStatus::Pending))
            .unwrap();
        storage
            .insert_order(&order("o3", "20240510_20240516", 30, OrderStatus::Pending))
            .unwrap();

        assert_eq!(
            storage.distinct_week_ids().unwrap(),
            ["20240510_20240516", "20240503_20240509"]
        );
    }

    #[test]
    fn clients_sort_case_insensitively() {
        let storage = PedidoStorage::open_in_memory().unwrap();
        for (id, name) in [("c1", "beatriz"), ("c2", "Ana"), ("c3", "Carlos")] {
            storage
                .upsert_client(&Client {
                    id: id.to_string(),
                    name: name.to_string(),
                    ..Default::default()
                })
                .unwrap();
        }
        let names: Vec<String> = storage
            .list_clients()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Ana", "beatriz", "Carlos"]);
    }

    #[test]
    fn settings_default_to_zero_until_saved() {
        let storage = PedidoStorage::open_in_memory().unwrap();
        assert_eq!(storage.get_settings().unwrap(), Settings::default());

        let saved = Settings::new(Decimal::from(100), Decimal::from(250));
        storage.upsert_settings(&saved).unwrap();
        assert_eq!(storage.get_settings().unwrap(), saved);
    }
}
