//! Weekly aggregation computations
//!
//! Pure functions over order rows already scoped to one business week.
//! Cancelled orders contribute to nothing here; summaries are recomputed
//! from current state every time, never accumulated, so an order cancelled
//! after being counted once simply disappears from the next computation.
//!
//! All money arithmetic is `Decimal`; the stored per-order cost/sale
//! snapshot is what gets multiplied, so later settings changes never shift
//! historical totals.

use crate::detail;
use rust_decimal::Decimal;
use shared::models::{ClientTotal, FlavorTotal, Order, OrderStatus, WeekSummary};
use std::collections::{BTreeMap, BTreeSet};

/// Financial summary of one week's orders
///
/// `orders` is the full week; cancelled rows are skipped for the money
/// totals and the order count. `pending_count` is counted separately by the
/// caller (pending orders only).
pub fn week_summary(orders: &[Order], pending_count: u32) -> WeekSummary {
    let mut total_sales = Decimal::ZERO;
    let mut total_costs = Decimal::ZERO;
    let mut order_count = 0u32;

    for order in active(orders) {
        let dozens = Decimal::from(order.total_dozens);
        total_sales += dozens * order.unit_sale_per_dozen;
        total_costs += dozens * order.unit_cost_per_dozen;
        order_count += 1;
    }

    WeekSummary {
        total_sales,
        total_costs,
        profit: total_sales - total_costs,
        order_count,
        pending_count,
    }
}

/// Flavor ranking for one week
///
/// Decodes every non-cancelled order's detail, sums dozens per exact flavor
/// text, and ranks by total dozens descending with flavor name ascending as
/// the tie-break. The full list is returned; truncation to a top-N is the
/// caller's choice.
pub fn top_flavors(orders: &[Order]) -> Vec<FlavorTotal> {
    let mut totals: BTreeMap<String, i64> = BTreeMap::new();
    for order in active(orders) {
        for item in detail::decode(&order.detail) {
            *totals.entry(item.flavor).or_insert(0) += i64::from(item.dozens);
        }
    }

    let mut ranked: Vec<FlavorTotal> = totals
        .into_iter()
        .map(|(flavor, total_dozens)| FlavorTotal {
            flavor,
            total_dozens,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.total_dozens
            .cmp(&a.total_dozens)
            .then_with(|| a.flavor.cmp(&b.flavor))
    });
    ranked
}

/// Client ranking for one week
///
/// Groups non-cancelled orders by trimmed client name (blank names are
/// excluded), ranked by order count descending, then total dozens
/// descending, then name ascending.
pub fn top_clients(orders: &[Order]) -> Vec<ClientTotal> {
    let mut totals: BTreeMap<String, (u32, i64)> = BTreeMap::new();
    for order in active(orders) {
        let name = order.client_name.trim();
        if name.is_empty() {
            continue;
        }
        let entry = totals.entry(name.to_string()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += i64::from(order.total_dozens);
    }

    let mut ranked: Vec<ClientTotal> = totals
        .into_iter()
        .map(|(client_name, (order_count, total_dozens))| ClientTotal {
            client_name,
            order_count,
            total_dozens,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.order_count
            .cmp(&a.order_count)
            .then_with(|| b.total_dozens.cmp(&a.total_dozens))
            .then_with(|| a.client_name.cmp(&b.client_name))
    });
    ranked
}

/// Selectable weeks: every recorded week plus the current one, newest first
///
/// A brand-new installation with zero orders still offers the current week.
/// Descending string order equals reverse chronological order by the week-id
/// format's construction.
pub fn available_weeks(recorded: &[String], current_week_id: &str) -> Vec<String> {
    let mut weeks: BTreeSet<&str> = recorded.iter().map(String::as_str).collect();
    weeks.insert(current_week_id);
    weeks.into_iter().rev().map(str::to_string).collect()
}

fn active(orders: &[Order]) -> impl Iterator<Item = &Order> {
    orders.iter().filter(|o| o.status != OrderStatus::Cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail;
    use shared::models::LineItem;

    fn order(
        client: &str,
        items: &[(&str, i32)],
        cost: i64,
        sale: i64,
        status: OrderStatus,
    ) -> Order {
        let line_items: Vec<LineItem> = items
            .iter()
            .map(|(flavor, dozens)| LineItem::new(*flavor, *dozens))
            .collect();
        Order {
            id: format!("order-{client}-{}", items.len()),
            client_name: client.to_string(),
            detail: detail::encode(&line_items),
            total_dozens: line_items.iter().map(|i| i.dozens).sum(),
            status,
            created_at: 0,
            week_id: "20240503_20240509".to_string(),
            unit_cost_per_dozen: Decimal::from(cost),
            unit_sale_per_dozen: Decimal::from(sale),
        }
    }

    #[test]
    fn summary_sums_active_orders_only() {
        let orders = vec![
            order("Ana", &[("Capresse", 2)], 100, 250, OrderStatus::Pending),
            order("Berta", &[("Ricota", 1)], 100, 250, OrderStatus::Delivered),
            order("Carla", &[("Capresse", 5)], 100, 250, OrderStatus::Cancelled),
        ];
        let summary = week_summary(&orders, 1);
        assert_eq!(summary.total_sales, Decimal::from(750));
        assert_eq!(summary.total_costs, Decimal::from(300));
        assert_eq!(summary.profit, Decimal::from(450));
        assert_eq!(summary.order_count, 2);
        assert_eq!(summary.pending_count, 1);
    }

    #[test]
    fn summary_of_no_orders_is_zeroed() {
        assert_eq!(week_summary(&[], 0), WeekSummary::default());
    }

    #[test]
    fn summary_uses_the_per_order_price_snapshot() {
        // Two orders created under different settings keep their own prices
        let orders = vec![
            order("Ana", &[("Capresse", 2)], 100, 250, OrderStatus::Pending),
            order("Berta", &[("Capresse", 2)], 120, 300, OrderStatus::Pending),
        ];
        let summary = week_summary(&orders, 2);
        assert_eq!(summary.total_sales, Decimal::from(500 + 600));
        assert_eq!(summary.total_costs, Decimal::from(200 + 240));
    }

    #[test]
    fn flavor_ranking_sums_across_orders() {
        let orders = vec![
            order("Ana", &[("Capresse", 2), ("Ricota", 1)], 0, 0, OrderStatus::Pending),
            order("Berta", &[("Capresse", 3)], 0, 0, OrderStatus::Delivered),
        ];
        let ranked = top_flavors(&orders);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].flavor, "Capresse");
        assert_eq!(ranked[0].total_dozens, 5);
        assert_eq!(ranked[1].flavor, "Ricota");
    }

    #[test]
    fn flavor_tie_breaks_alphabetically() {
        let orders = vec![
            order("Ana", &[("Ricota", 2)], 0, 0, OrderStatus::Pending),
            order("Berta", &[("Capresse", 2)], 0, 0, OrderStatus::Pending),
        ];
        let ranked = top_flavors(&orders);
        assert_eq!(ranked[0].flavor, "Capresse");
        assert_eq!(ranked[1].flavor, "Ricota");
    }

    #[test]
    fn flavor_ranking_skips_cancelled_orders() {
        let orders = vec![
            order("Ana", &[("Capresse", 1)], 0, 0, OrderStatus::Pending),
            order("Berta", &[("Capresse", 9)], 0, 0, OrderStatus::Cancelled),
        ];
        let ranked = top_flavors(&orders);
        assert_eq!(ranked[0].total_dozens, 1);
    }

    #[test]
    fn client_ranking_orders_by_count_then_dozens_then_name() {
        let orders = vec![
            order("Ana", &[("Capresse", 1)], 0, 0, OrderStatus::Pending),
            order("Ana", &[("Ricota", 2)], 0, 0, OrderStatus::Delivered),
            order("Berta", &[("Capresse", 9)], 0, 0, OrderStatus::Pending),
            order("Carla", &[("Capresse", 9)], 0, 0, OrderStatus::Pending),
        ];
        let ranked = top_clients(&orders);
        assert_eq!(ranked[0].client_name, "Ana");
        assert_eq!(ranked[0].order_count, 2);
        assert_eq!(ranked[0].total_dozens, 3);
        // Berta and Carla tie on count and dozens, name breaks it
        assert_eq!(ranked[1].client_name, "Berta");
        assert_eq!(ranked[2].client_name, "Carla");
    }

    #[test]
    fn client_ranking_trims_and_drops_blank_names() {
        let mut padded = order("  Ana  ", &[("Capresse", 1)], 0, 0, OrderStatus::Pending);
        padded.client_name = "  Ana  ".to_string();
        let blank = order("   ", &[("Capresse", 1)], 0, 0, OrderStatus::Pending);
        let ranked = top_clients(&[padded, blank]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].client_name, "Ana");
    }

    #[test]
    fn available_weeks_union_current_sorted_descending() {
        let recorded = vec![
            "20240503_20240509".to_string(),
            "20240419_20240425".to_string(),
        ];
        assert_eq!(
            available_weeks(&recorded, "20240510_20240516"),
            [
                "20240510_20240516",
                "20240503_20240509",
                "20240419_20240425"
            ]
        );
        // Current week already recorded: no duplicate
        assert_eq!(
            available_weeks(&recorded, "20240503_20240509").len(),
            2
        );
    }

    #[test]
    fn available_weeks_of_empty_store_is_just_current() {
        assert_eq!(available_weeks(&[], "20240503_20240509"), ["20240503_20240509"]);
    }
}
