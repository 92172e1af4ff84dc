use serde::{Deserialize, Serialize};

/// Closed set of notification kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    LowStock,
    ExpiringSoon,
    WarrantyExpiring,
    ItemUpdated,
    ItemDeleted,
    General,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 6] = [
        NotificationKind::LowStock,
        NotificationKind::ExpiringSoon,
        NotificationKind::WarrantyExpiring,
        NotificationKind::ItemUpdated,
        NotificationKind::ItemDeleted,
        NotificationKind::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::LowStock => "low_stock",
            NotificationKind::ExpiringSoon => "expiring_soon",
            NotificationKind::WarrantyExpiring => "warranty_expiring",
            NotificationKind::ItemUpdated => "item_updated",
            NotificationKind::ItemDeleted => "item_deleted",
            NotificationKind::General => "general",
        }
    }

    /// Kinds computed from inventory state (as opposed to posted directly).
    pub fn is_derived(self) -> bool {
        matches!(
            self,
            NotificationKind::LowStock
                | NotificationKind::ExpiringSoon
                | NotificationKind::WarrantyExpiring
        )
    }
}

impl core::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
