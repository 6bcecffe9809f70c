use super::*;
use shared::models::WeekSummary;

mod test_flows;

const TEST_TZ: Tz = chrono_tz::America::Argentina::Buenos_Aires;

/// Opt-in log output while running tests: `RUST_LOG=debug cargo test`
fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

fn test_manager() -> PedidoManager {
    init_test_logging();
    let storage = PedidoStorage::open_in_memory().unwrap();
    PedidoManager::with_storage(storage, TEST_TZ)
}

fn test_settings(cost: i64, sale: i64) -> Settings {
    Settings::new(Decimal::from(cost), Decimal::from(sale))
}

fn line_items(pairs: &[(&str, i32)]) -> Vec<LineItem> {
    pairs
        .iter()
        .map(|(flavor, dozens)| LineItem::new(*flavor, *dozens))
        .collect()
}

/// The single order of the manager's current week
fn only_order(manager: &PedidoManager) -> Order {
    let week_id = manager.current_week().week_id;
    let orders = manager.storage().orders_by_week(&week_id).unwrap();
    assert_eq!(orders.len(), 1, "expected exactly one order");
    orders.into_iter().next().unwrap()
}

/// Recompute the current week's summary from the store
fn current_summary(manager: &PedidoManager) -> WeekSummary {
    let week_id = manager.current_week().week_id;
    let orders = manager.storage().orders_by_week(&week_id).unwrap();
    let pending = manager.storage().pending_count_for_week(&week_id).unwrap();
    crate::reports::week_summary(&orders, pending)
}
