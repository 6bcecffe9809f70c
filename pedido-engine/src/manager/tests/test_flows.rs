//! End-to-end command flows against recomputed weekly reports

use super::*;
use rust_decimal::Decimal;

#[test]
fn ana_order_through_delivery() {
    let manager = test_manager();
    let settings = test_settings(100, 250);

    manager
        .create_order(
            "Ana",
            &line_items(&[("Jamón y queso", 2), ("Capresse", 1)]),
            &settings,
        )
        .unwrap();

    let summary = current_summary(&manager);
    assert_eq!(summary.total_sales, Decimal::from(750));
    assert_eq!(summary.total_costs, Decimal::from(300));
    assert_eq!(summary.profit, Decimal::from(450));
    assert_eq!(summary.order_count, 1);
    assert_eq!(summary.pending_count, 1);

    manager.mark_delivered(&only_order(&manager).id).unwrap();

    let summary = current_summary(&manager);
    assert_eq!(summary.pending_count, 0);
    // Delivery changes nothing else
    assert_eq!(summary.total_sales, Decimal::from(750));
    assert_eq!(summary.total_costs, Decimal::from(300));
    assert_eq!(summary.profit, Decimal::from(450));
    assert_eq!(summary.order_count, 1);
}

#[test]
fn cancelled_order_disappears_from_the_next_summary() {
    let manager = test_manager();
    manager
        .create_order("Ana", &line_items(&[("Capresse", 2)]), &test_settings(100, 250))
        .unwrap();

    let before = current_summary(&manager);
    assert_eq!(before.order_count, 1);
    assert_eq!(before.total_sales, Decimal::from(500));

    manager.cancel_order(&only_order(&manager).id).unwrap();

    let after = current_summary(&manager);
    assert_eq!(after.order_count, 0);
    assert_eq!(after.pending_count, 0);
    assert_eq!(after.total_sales, Decimal::ZERO);
    assert_eq!(after.profit, Decimal::ZERO);

    // The order itself is never deleted
    let order = only_order(&manager);
    assert_eq!(order.status, OrderStatus::Cancelled);
}

#[test]
fn update_order_rewrites_items_but_not_the_snapshot() {
    let manager = test_manager();
    manager
        .create_order("Ana", &line_items(&[("Capresse", 1)]), &test_settings(100, 250))
        .unwrap();
    let original = only_order(&manager);

    manager
        .update_order(
            &original.id,
            "Beatriz",
            &line_items(&[("Ricota", 4), ("Capresse", 1)]),
        )
        .unwrap();

    let updated = only_order(&manager);
    assert_eq!(updated.client_name, "Beatriz");
    assert_eq!(updated.total_dozens, 5);
    assert_eq!(
        crate::detail::decode(&updated.detail),
        line_items(&[("Ricota", 4), ("Capresse", 1)])
    );
    // Untouched: status, week, creation time, price snapshot
    assert_eq!(updated.status, original.status);
    assert_eq!(updated.week_id, original.week_id);
    assert_eq!(updated.created_at, original.created_at);
    assert_eq!(updated.unit_cost_per_dozen, original.unit_cost_per_dozen);
    assert_eq!(updated.unit_sale_per_dozen, original.unit_sale_per_dozen);
}

#[test]
fn update_order_validation_leaves_the_order_alone() {
    let manager = test_manager();
    manager
        .create_order("Ana", &line_items(&[("Capresse", 1)]), &test_settings(100, 250))
        .unwrap();
    let original = only_order(&manager);

    assert!(manager.update_order(&original.id, "", &line_items(&[("Ricota", 1)])).is_err());
    assert!(manager.update_order(&original.id, "Ana", &[]).is_err());

    assert_eq!(only_order(&manager), original);
}

#[test]
fn delivered_order_can_still_be_edited() {
    // Deliberately permissive: only status transitions are guarded, edits
    // of a terminal order's items go through.
    let manager = test_manager();
    manager
        .create_order("Ana", &line_items(&[("Capresse", 1)]), &test_settings(100, 250))
        .unwrap();
    let id = only_order(&manager).id;
    manager.mark_delivered(&id).unwrap();

    manager
        .update_order(&id, "Ana", &line_items(&[("Ricota", 3)]))
        .unwrap();

    let order = only_order(&manager);
    assert_eq!(order.status, OrderStatus::Delivered);
    assert_eq!(order.total_dozens, 3);
}

#[test]
fn weekly_rankings_follow_the_store() {
    let manager = test_manager();
    let settings = test_settings(100, 250);
    manager
        .create_order("Ana", &line_items(&[("Capresse", 2), ("Ricota", 1)]), &settings)
        .unwrap();
    manager
        .create_order("Beatriz", &line_items(&[("Ricota", 2)]), &settings)
        .unwrap();

    let week_id = manager.current_week().week_id;
    let orders = manager.storage().orders_by_week(&week_id).unwrap();

    let flavors = crate::reports::top_flavors(&orders);
    assert_eq!(flavors[0].flavor, "Ricota");
    assert_eq!(flavors[0].total_dozens, 3);
    assert_eq!(flavors[1].flavor, "Capresse");

    let clients = crate::reports::top_clients(&orders);
    assert_eq!(clients[0].client_name, "Ana");
    assert_eq!(clients[1].client_name, "Beatriz");
}
