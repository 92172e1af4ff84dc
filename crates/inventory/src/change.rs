use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockwatch_core::ItemId;
use stockwatch_events::Event;

/// Event: an item was created or any of its fields changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpserted {
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: an item was deleted from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Change notification published by the storage collaborator.
///
/// Carries no item data: subscribers re-read the views they need, so any
/// burst of changes can be coalesced into one read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryChange {
    ItemUpserted(ItemUpserted),
    ItemRemoved(ItemRemoved),
}

impl InventoryChange {
    pub fn item_id(&self) -> ItemId {
        match self {
            InventoryChange::ItemUpserted(e) => e.item_id,
            InventoryChange::ItemRemoved(e) => e.item_id,
        }
    }
}

impl Event for InventoryChange {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryChange::ItemUpserted(_) => "inventory.item.upserted",
            InventoryChange::ItemRemoved(_) => "inventory.item.removed",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryChange::ItemUpserted(e) => e.occurred_at,
            InventoryChange::ItemRemoved(e) => e.occurred_at,
        }
    }
}
