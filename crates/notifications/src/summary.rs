//! Per-kind roll-up alerts ("3 items are running low on stock").
//!
//! Summaries count the underlying views and ignore dismissals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DeriverConfig;
use crate::derive::{InventorySnapshot, expiring_items, warranty_items};
use crate::format;
use crate::kind::NotificationKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub kind: NotificationKind,
    pub count: usize,
    pub title: String,
    pub message: String,
}

/// One summary per derived kind with at least one matching item, in
/// low stock, expiring, warranty order.
pub fn summaries(snapshot: &InventorySnapshot, now: DateTime<Utc>, config: &DeriverConfig) -> Vec<Summary> {
    let counts = [
        (NotificationKind::LowStock, snapshot.low_stock.len(), 0),
        (
            NotificationKind::ExpiringSoon,
            expiring_items(snapshot, now, config).count(),
            config.expiring_window_days,
        ),
        (
            NotificationKind::WarrantyExpiring,
            warranty_items(snapshot, now, config).count(),
            config.warranty_window_days,
        ),
    ];

    counts
        .into_iter()
        .filter(|(_, count, _)| *count > 0)
        .filter_map(|(kind, count, window_days)| {
            let (title, message) = format::summary(kind, count, window_days)?;
            Some(Summary {
                kind,
                count,
                title: title.to_string(),
                message,
            })
        })
        .collect()
}
