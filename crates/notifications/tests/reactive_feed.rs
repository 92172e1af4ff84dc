//! End-to-end: InMemoryInventory → change bus → worker → NotificationDeriver → feed.
//!
//! Verifies:
//! - inventory mutations reach subscribers without explicit refreshes
//! - bursts of changes are coalesced into a consistent feed
//! - dismissals made while the worker runs are never lost

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use stockwatch_core::{ItemId, ManualClock};
use stockwatch_inventory::{InMemoryInventory, InventoryItemView};
use stockwatch_notifications::{
    DeriverConfig, NotificationDeriver, NotificationKey, NotificationKind, NotificationRecord,
};

fn setup() -> (Arc<InMemoryInventory>, NotificationDeriver<Arc<InMemoryInventory>>) {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap()));
    let inventory = Arc::new(InMemoryInventory::with_clock(clock.clone()));
    let deriver = NotificationDeriver::with_clock(inventory.clone(), DeriverConfig::default(), clock);
    (inventory, deriver)
}

fn item(id: i64, quantity: u32, min: u32) -> InventoryItemView {
    InventoryItemView::new(ItemId::new(id), format!("item-{id}"), quantity).with_min_stock_level(min)
}

/// Helper: give the worker thread time to drain and recompute.
fn wait_for_processing() {
    std::thread::sleep(Duration::from_millis(400));
}

fn keys(feed: &[NotificationRecord]) -> Vec<NotificationKey> {
    feed.iter().map(|r| r.key()).collect()
}

#[test]
fn inventory_changes_flow_to_subscribers() {
    let (inventory, deriver) = setup();
    let worker = deriver.spawn_worker().unwrap();
    let mut feed = deriver.feed();
    assert!(feed.current().is_empty());

    inventory.upsert(item(1, 2, 5)).unwrap();
    let updated = feed.wait_for_update(Duration::from_secs(2)).expect("feed update");

    assert_eq!(
        keys(&updated),
        vec![NotificationKey::new(ItemId::new(1), NotificationKind::LowStock)]
    );
    assert_eq!(updated[0].message, "Only 2 left (min 5).");

    worker.shutdown();
}

#[test]
fn restocking_removes_the_alert() {
    let (inventory, deriver) = setup();
    inventory.upsert(item(1, 2, 5)).unwrap();
    let worker = deriver.spawn_worker().unwrap();
    let mut feed = deriver.feed();
    assert_eq!(feed.current().len(), 1);

    inventory.adjust_quantity(ItemId::new(1), 10).unwrap();
    wait_for_processing();

    assert!(feed.poll().is_empty());
    worker.shutdown();
}

#[test]
fn burst_of_changes_settles_on_final_state() {
    let (inventory, deriver) = setup();
    let worker = deriver.spawn_worker().unwrap();
    let mut feed = deriver.feed();

    for id in 1..=20 {
        inventory.upsert(item(id, 0, 1)).unwrap();
    }
    inventory.remove(ItemId::new(20)).unwrap();
    wait_for_processing();

    let visible = feed.poll();
    assert_eq!(visible.len(), 19);
    assert!(visible.iter().all(|r| r.kind == NotificationKind::LowStock));
    worker.shutdown();
}

#[test]
fn dismissals_survive_concurrent_recomputes() {
    let (inventory, deriver) = setup();
    for id in 1..=5 {
        inventory.upsert(item(id, 0, 1)).unwrap();
    }
    let worker = deriver.spawn_worker().unwrap();
    let mut feed = deriver.feed();

    let writer = {
        let inventory = inventory.clone();
        std::thread::spawn(move || {
            for round in 0..50 {
                let _ = inventory.adjust_quantity(ItemId::new(1 + round % 5), 1);
                let _ = inventory.adjust_quantity(ItemId::new(1 + round % 5), -1);
            }
        })
    };
    for id in 1..=5 {
        deriver.mark_item_read(ItemId::new(id));
    }
    writer.join().unwrap();
    wait_for_processing();

    assert!(feed.poll().is_empty());
    assert!(deriver.current().is_empty());
    worker.shutdown();
}

#[test]
fn clear_all_then_new_low_stock_item() {
    let (inventory, deriver) = setup();
    for id in 1..=3 {
        inventory.upsert(item(id, 1, 2)).unwrap();
    }
    let worker = deriver.spawn_worker().unwrap();
    let mut feed = deriver.feed();
    assert_eq!(feed.current().len(), 3);

    deriver.clear_all();
    assert!(feed.poll().is_empty());

    inventory.upsert(item(4, 0, 3)).unwrap();
    wait_for_processing();

    assert_eq!(
        keys(feed.poll()),
        vec![NotificationKey::new(ItemId::new(4), NotificationKind::LowStock)]
    );
    worker.shutdown();
}

#[test]
fn dropping_the_handle_stops_the_worker() {
    let (inventory, deriver) = setup();
    drop(deriver.spawn_worker().unwrap());
    wait_for_processing();

    let _feed = deriver.feed();
    inventory.upsert(item(1, 0, 1)).unwrap();
    wait_for_processing();

    // No worker left to react; an explicit refresh still works.
    assert!(deriver.current().is_empty());
    assert_eq!(deriver.refresh().len(), 1);
}
