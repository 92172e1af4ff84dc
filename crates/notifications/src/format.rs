//! Per-kind title and message templates.

use core::fmt::Write;

use chrono::{DateTime, Utc};
use tracing::debug;

use stockwatch_inventory::InventoryItemView;

use crate::config::DEFAULT_DATE_FORMAT;
use crate::kind::NotificationKind;

pub fn title(kind: NotificationKind, name: &str) -> String {
    match kind {
        NotificationKind::LowStock => format!("Low stock: {name}"),
        NotificationKind::ExpiringSoon => format!("Expiring soon: {name}"),
        NotificationKind::WarrantyExpiring => format!("Warranty expiring: {name}"),
        NotificationKind::ItemUpdated => format!("Item updated: {name}"),
        NotificationKind::ItemDeleted => format!("Item deleted: {name}"),
        NotificationKind::General => format!("Notice: {name}"),
    }
}

/// Message body; empty for kinds that carry no item-derived detail.
pub fn message(kind: NotificationKind, item: &InventoryItemView, date_format: &str) -> String {
    match kind {
        NotificationKind::LowStock => format!(
            "Only {} left (min {}).",
            item.quantity, item.min_stock_level
        ),
        NotificationKind::ExpiringSoon => format!(
            "Expires on {}.",
            format_date(item.expiration_date, date_format)
        ),
        NotificationKind::WarrantyExpiring => format!(
            "Warranty ends on {}.",
            format_date(item.warranty_date, date_format)
        ),
        NotificationKind::ItemUpdated | NotificationKind::ItemDeleted | NotificationKind::General => {
            String::new()
        }
    }
}

/// Roll-up title and message for `count` items of a derived kind.
///
/// `None` for event kinds, which are never summarized.
pub fn summary(kind: NotificationKind, count: usize, window_days: u32) -> Option<(&'static str, String)> {
    let one = count == 1;
    let within = match window_days {
        1 => "within 1 day".to_string(),
        days => format!("within {days} days"),
    };

    match kind {
        NotificationKind::LowStock => Some((
            "Low Stock Alert",
            if one {
                "1 item is running low on stock".to_string()
            } else {
                format!("{count} items are running low on stock")
            },
        )),
        NotificationKind::ExpiringSoon => Some((
            "Items Expiring Soon",
            if one {
                format!("1 item expires {within}")
            } else {
                format!("{count} items expire {within}")
            },
        )),
        NotificationKind::WarrantyExpiring => Some((
            "Warranties Expiring Soon",
            if one {
                format!("1 item warranty expires {within}")
            } else {
                format!("{count} item warranties expire {within}")
            },
        )),
        NotificationKind::ItemUpdated | NotificationKind::ItemDeleted | NotificationKind::General => None,
    }
}

/// Render a date (UTC) with `date_format`, or `"unknown"` when absent.
///
/// An invalid strftime pattern falls back to the default pattern.
pub fn format_date(at: Option<DateTime<Utc>>, date_format: &str) -> String {
    let Some(at) = at else {
        return "unknown".to_string();
    };

    let mut out = String::new();
    if write!(out, "{}", at.format(date_format)).is_ok() {
        return out;
    }

    debug!(date_format, "invalid date format; rendering with the default");
    at.format(DEFAULT_DATE_FORMAT).to_string()
}

/// Whether `date_format` renders without error.
pub fn is_valid_date_format(date_format: &str) -> bool {
    let mut out = String::new();
    write!(out, "{}", DateTime::<Utc>::default().format(date_format)).is_ok()
}
