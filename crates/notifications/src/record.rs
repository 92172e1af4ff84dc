use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockwatch_core::ItemId;
use stockwatch_inventory::InventoryItemView;

use crate::format;
use crate::kind::NotificationKind;

/// Identity of a notification: one per (item, kind).
///
/// Used for deduplication, dismissal, and as a stable list key by renderers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NotificationKey {
    pub item_id: ItemId,
    pub kind: NotificationKind,
}

impl NotificationKey {
    pub fn new(item_id: ItemId, kind: NotificationKind) -> Self {
        Self { item_id, kind }
    }
}

impl core::fmt::Display for NotificationKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.item_id, self.kind)
    }
}

/// A derived, ephemeral notification.
///
/// `is_read` is always `false` on creation; dismissal is tracked in a
/// [`DismissalSet`](crate::DismissalSet), never by flipping this flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub item_id: ItemId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub generated_at: DateTime<Utc>,
    pub is_read: bool,
}

impl NotificationRecord {
    pub fn new(
        item_id: ItemId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            item_id,
            kind,
            title: title.into(),
            message: message.into(),
            generated_at,
            is_read: false,
        }
    }

    /// Build the record for `item` under `kind` using the fixed templates.
    pub fn for_item(
        item: &InventoryItemView,
        kind: NotificationKind,
        generated_at: DateTime<Utc>,
        date_format: &str,
    ) -> Self {
        Self::new(
            item.id,
            kind,
            format::title(kind, &item.name),
            format::message(kind, item, date_format),
            generated_at,
        )
    }

    pub fn key(&self) -> NotificationKey {
        NotificationKey::new(self.item_id, self.kind)
    }

    /// Same visible entry, ignoring when it was generated.
    pub fn same_content(&self, other: &Self) -> bool {
        self.key() == other.key() && self.title == other.title && self.message == other.message
    }
}
