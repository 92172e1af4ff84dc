//! Pure feed derivation: inventory snapshot + dismissals → ordered feed.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use stockwatch_inventory::{InventoryItemView, InventorySource};

use crate::config::DeriverConfig;
use crate::dismissal::DismissalSet;
use crate::kind::NotificationKind;
use crate::record::NotificationRecord;

pub use stockwatch_inventory::InventorySnapshot;

/// Read one snapshot from `source`. A failing read contributes nothing this cycle.
pub fn capture<S>(source: &S) -> InventorySnapshot
where
    S: InventorySource + ?Sized,
{
    source.snapshot().unwrap_or_else(|err| {
        warn!(error = ?err, "inventory snapshot unavailable; treating as empty");
        InventorySnapshot::default()
    })
}

/// `now + window`, saturating at the latest representable instant.
pub(crate) fn window_end(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Items expiring within the configured window.
pub fn expiring_items<'a>(
    snapshot: &'a InventorySnapshot,
    now: DateTime<Utc>,
    config: &DeriverConfig,
) -> impl Iterator<Item = &'a InventoryItemView> {
    let cutoff = window_end(now, config.expiring_window());
    snapshot.all_items.iter().filter(move |item| item.expires_by(cutoff))
}

/// Items whose warranty ends within the configured window.
pub fn warranty_items<'a>(
    snapshot: &'a InventorySnapshot,
    now: DateTime<Utc>,
    config: &DeriverConfig,
) -> impl Iterator<Item = &'a InventoryItemView> {
    let cutoff = window_end(now, config.warranty_window());
    snapshot.all_items.iter().filter(move |item| item.warranty_ends_by(cutoff))
}

/// Records for the low-stock view.
pub fn low_stock_records(
    snapshot: &InventorySnapshot,
    now: DateTime<Utc>,
    config: &DeriverConfig,
) -> impl Iterator<Item = NotificationRecord> {
    snapshot.low_stock.iter().map(move |item| {
        NotificationRecord::for_item(item, NotificationKind::LowStock, now, &config.date_format)
    })
}

/// Records for items expiring within the configured window.
pub fn expiring_records(
    snapshot: &InventorySnapshot,
    now: DateTime<Utc>,
    config: &DeriverConfig,
) -> impl Iterator<Item = NotificationRecord> {
    expiring_items(snapshot, now, config).map(move |item| {
        NotificationRecord::for_item(item, NotificationKind::ExpiringSoon, now, &config.date_format)
    })
}

/// Records for items whose warranty ends within the configured window.
pub fn warranty_records(
    snapshot: &InventorySnapshot,
    now: DateTime<Utc>,
    config: &DeriverConfig,
) -> impl Iterator<Item = NotificationRecord> {
    warranty_items(snapshot, now, config).map(move |item| {
        NotificationRecord::for_item(item, NotificationKind::WarrantyExpiring, now, &config.date_format)
    })
}

/// Merge every source into the visible feed.
///
/// 1. union: low stock, expiring, warranty, then `direct` records
/// 2. keep the first record per (item, kind)
/// 3. drop dismissed keys
/// 4. stable sort by `generated_at`, newest first
pub fn derive_feed(
    snapshot: &InventorySnapshot,
    direct: &[NotificationRecord],
    dismissed: &DismissalSet,
    now: DateTime<Utc>,
    config: &DeriverConfig,
) -> Vec<NotificationRecord> {
    let candidates = low_stock_records(snapshot, now, config)
        .chain(expiring_records(snapshot, now, config))
        .chain(warranty_records(snapshot, now, config))
        .chain(direct.iter().cloned());

    let mut seen = HashSet::new();
    let mut feed: Vec<NotificationRecord> = candidates
        .filter(|record| seen.insert(record.key()))
        .filter(|record| !dismissed.contains(&record.key()))
        .collect();

    feed.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
    feed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use stockwatch_core::ItemId;
    use stockwatch_events::EventBus;

    use crate::record::NotificationKey;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 1, 10, 0, 0).unwrap()
    }

    fn item(id: i64, quantity: u32, min: u32) -> InventoryItemView {
        InventoryItemView::new(ItemId::new(id), format!("item-{id}"), quantity).with_min_stock_level(min)
    }

    fn derive(items: Vec<InventoryItemView>, dismissed: &DismissalSet) -> Vec<NotificationRecord> {
        derive_feed(
            &InventorySnapshot::from_items(items),
            &[],
            dismissed,
            now(),
            &DeriverConfig::default(),
        )
    }

    #[test]
    fn low_stock_item_without_dates_yields_one_record() {
        let feed = derive(vec![item(1, 2, 5)], &DismissalSet::new());

        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].kind, NotificationKind::LowStock);
        assert_eq!(feed[0].message, "Only 2 left (min 5).");
    }

    #[test]
    fn expiring_window_is_seven_days() {
        let b = item(2, 10, 0).with_expiration_date(now() + Duration::days(3));
        let c = item(3, 10, 0).with_expiration_date(now() + Duration::days(10));

        let feed = derive(vec![b.clone(), c], &DismissalSet::new());

        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].key(), NotificationKey::new(b.id, NotificationKind::ExpiringSoon));
        assert_eq!(feed[0].message, "Expires on Apr 04, 2026.");
    }

    #[test]
    fn already_expired_items_are_still_expiring_soon() {
        let stale = item(4, 10, 0).with_expiration_date(now() - Duration::days(2));
        let feed = derive(vec![stale], &DismissalSet::new());
        assert_eq!(feed[0].kind, NotificationKind::ExpiringSoon);
    }

    #[test]
    fn warranty_window_is_thirty_days() {
        let soon = item(5, 10, 0).with_warranty_date(now() + Duration::days(30));
        let later = item(6, 10, 0).with_warranty_date(now() + Duration::days(31));

        let feed = derive(vec![soon, later], &DismissalSet::new());

        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].item_id, ItemId::new(5));
        assert_eq!(feed[0].kind, NotificationKind::WarrantyExpiring);
    }

    #[test]
    fn one_item_can_raise_several_kinds() {
        let a = item(1, 0, 1)
            .with_expiration_date(now() + Duration::days(1))
            .with_warranty_date(now() + Duration::days(1));

        let kinds: Vec<_> = derive(vec![a], &DismissalSet::new())
            .into_iter()
            .map(|r| r.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                NotificationKind::LowStock,
                NotificationKind::ExpiringSoon,
                NotificationKind::WarrantyExpiring
            ]
        );
    }

    #[test]
    fn duplicates_keep_the_first_occurrence() {
        let a = item(1, 2, 5);
        let snapshot = InventorySnapshot {
            low_stock: vec![a.clone(), a.clone()],
            all_items: vec![a],
        };
        let direct = NotificationRecord::new(
            ItemId::new(1),
            NotificationKind::LowStock,
            "posted",
            "posted",
            now(),
        );

        let feed = derive_feed(&snapshot, &[direct], &DismissalSet::new(), now(), &DeriverConfig::default());

        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].title, "Low stock: item-1");
    }

    #[test]
    fn dismissed_keys_are_filtered() {
        let mut dismissed = DismissalSet::new();
        dismissed.dismiss(NotificationKey::new(ItemId::new(1), NotificationKind::LowStock));

        let feed = derive(vec![item(1, 2, 5), item(2, 2, 5)], &dismissed);

        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].item_id, ItemId::new(2));
    }

    #[test]
    fn direct_records_sort_by_their_own_timestamp() {
        let newer = NotificationRecord::new(
            ItemId::new(9),
            NotificationKind::ItemUpdated,
            "Item updated: x",
            "",
            now() + Duration::minutes(1),
        );
        let older = NotificationRecord::new(
            ItemId::new(8),
            NotificationKind::ItemDeleted,
            "Item deleted: y",
            "",
            now() - Duration::hours(1),
        );

        let feed = derive_feed(
            &InventorySnapshot::from_items(vec![item(1, 0, 0)]),
            &[older, newer],
            &DismissalSet::new(),
            now(),
            &DeriverConfig::default(),
        );

        let order: Vec<_> = feed.iter().map(|r| r.item_id.get()).collect();
        assert_eq!(order, vec![9, 1, 8]);
    }

    #[test]
    fn configured_windows_are_honored() {
        let config = DeriverConfig::default().with_expiring_window_days(14);
        let c = item(3, 10, 0).with_expiration_date(now() + Duration::days(10));

        let feed = derive_feed(
            &InventorySnapshot::from_items(vec![c]),
            &[],
            &DismissalSet::new(),
            now(),
            &config,
        );
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn oversized_windows_saturate_instead_of_overflowing() {
        let config = DeriverConfig::default()
            .with_expiring_window_days(u32::MAX)
            .with_warranty_window_days(u32::MAX);
        let far = item(7, 10, 0)
            .with_expiration_date(now() + Duration::days(365 * 1000))
            .with_warranty_date(now() + Duration::days(365 * 1000));

        let feed = derive_feed(
            &InventorySnapshot::from_items(vec![far]),
            &[],
            &DismissalSet::new(),
            now(),
            &config,
        );

        let kinds: Vec<_> = feed.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::ExpiringSoon, NotificationKind::WarrantyExpiring]);
        assert_eq!(window_end(DateTime::<Utc>::MAX_UTC, Duration::days(1)), DateTime::<Utc>::MAX_UTC);
    }

    /// Storage whose separate view queries race a concurrent delete.
    struct RacingDeletes {
        items: std::sync::Mutex<Vec<InventoryItemView>>,
        changes: stockwatch_events::InMemoryEventBus<stockwatch_inventory::InventoryChange>,
    }

    impl InventorySource for RacingDeletes {
        type Error = String;

        fn low_stock_items(&self) -> Result<Vec<InventoryItemView>, Self::Error> {
            let mut items = self.items.lock().map_err(|e| e.to_string())?;
            let low = items.iter().filter(|i| i.is_low_stock()).cloned().collect();
            // Another writer deletes everything right after this read.
            items.clear();
            Ok(low)
        }

        fn all_items(&self) -> Result<Vec<InventoryItemView>, Self::Error> {
            Ok(self.items.lock().map_err(|e| e.to_string())?.clone())
        }

        fn snapshot(&self) -> Result<InventorySnapshot, Self::Error> {
            let items = self.items.lock().map_err(|e| e.to_string())?;
            Ok(InventorySnapshot::from_items(items.iter().cloned()))
        }

        fn subscribe(&self) -> stockwatch_events::Subscription<stockwatch_inventory::InventoryChange> {
            self.changes.subscribe()
        }
    }

    #[test]
    fn capture_reads_both_views_at_one_instant() {
        let source = RacingDeletes {
            items: std::sync::Mutex::new(vec![
                item(1, 0, 5).with_expiration_date(now() + Duration::days(1)),
            ]),
            changes: stockwatch_events::InMemoryEventBus::new(),
        };

        let snapshot = capture(&source);
        let feed = derive_feed(&snapshot, &[], &DismissalSet::new(), now(), &DeriverConfig::default());

        assert_eq!(snapshot.low_stock.len(), 1);
        assert_eq!(snapshot.all_items.len(), 1);
        let kinds: Vec<_> = feed.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::LowStock, NotificationKind::ExpiringSoon]);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_item() -> impl Strategy<Value = InventoryItemView> {
            (
                0i64..12,
                0u32..10,
                0u32..10,
                proptest::option::of(-10i64..40),
                proptest::option::of(-10i64..60),
            )
                .prop_map(|(id, quantity, min, exp_days, war_days)| {
                    let mut item = item(id, quantity, min);
                    item.expiration_date = exp_days.map(|d| now() + Duration::days(d));
                    item.warranty_date = war_days.map(|d| now() + Duration::days(d));
                    item
                })
        }

        fn arb_direct() -> impl Strategy<Value = NotificationRecord> {
            (0i64..12, 0usize..6, -120i64..120).prop_map(|(id, k, minutes)| {
                NotificationRecord::new(
                    ItemId::new(id),
                    NotificationKind::ALL[k],
                    "posted",
                    "",
                    now() + Duration::minutes(minutes),
                )
            })
        }

        fn arb_dismissed() -> impl Strategy<Value = DismissalSet> {
            proptest::collection::vec((0i64..12, 0usize..6), 0..20).prop_map(|keys| {
                let mut set = DismissalSet::new();
                set.dismiss_all(
                    keys.into_iter()
                        .map(|(id, k)| NotificationKey::new(ItemId::new(id), NotificationKind::ALL[k])),
                );
                set
            })
        }

        proptest! {
            /// Property: no two records in the feed share a key.
            #[test]
            fn feed_keys_are_unique(
                items in proptest::collection::vec(arb_item(), 0..30),
                direct in proptest::collection::vec(arb_direct(), 0..10),
                dismissed in arb_dismissed(),
            ) {
                let feed = derive_feed(
                    &InventorySnapshot::from_items(items),
                    &direct,
                    &dismissed,
                    now(),
                    &DeriverConfig::default(),
                );
                let mut seen = HashSet::new();
                for record in &feed {
                    prop_assert!(seen.insert(record.key()));
                }
            }

            /// Property: dismissed keys never appear.
            #[test]
            fn dismissed_keys_never_appear(
                items in proptest::collection::vec(arb_item(), 0..30),
                direct in proptest::collection::vec(arb_direct(), 0..10),
                dismissed in arb_dismissed(),
            ) {
                let feed = derive_feed(
                    &InventorySnapshot::from_items(items),
                    &direct,
                    &dismissed,
                    now(),
                    &DeriverConfig::default(),
                );
                for record in &feed {
                    prop_assert!(!dismissed.contains(&record.key()));
                }
            }

            /// Property: feed is ordered newest first.
            #[test]
            fn feed_is_newest_first(
                items in proptest::collection::vec(arb_item(), 0..30),
                direct in proptest::collection::vec(arb_direct(), 0..10),
            ) {
                let feed = derive_feed(
                    &InventorySnapshot::from_items(items),
                    &direct,
                    &DismissalSet::new(),
                    now(),
                    &DeriverConfig::default(),
                );
                for pair in feed.windows(2) {
                    prop_assert!(pair[0].generated_at >= pair[1].generated_at);
                }
            }

            /// Property: every low-stock item surfaces unless dismissed.
            #[test]
            fn low_stock_items_surface_unless_dismissed(
                items in proptest::collection::vec(arb_item(), 0..30),
                dismissed in arb_dismissed(),
            ) {
                let feed = derive_feed(
                    &InventorySnapshot::from_items(items.clone()),
                    &[],
                    &dismissed,
                    now(),
                    &DeriverConfig::default(),
                );
                let keys: HashSet<_> = feed.iter().map(|r| r.key()).collect();
                for item in items.iter().filter(|i| i.is_low_stock()) {
                    let key = NotificationKey::new(item.id, NotificationKind::LowStock);
                    prop_assert_eq!(keys.contains(&key), !dismissed.contains(&key));
                }
            }
        }
    }
}
