//! In-memory inventory storage for tests/dev and the demo binary.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use stockwatch_core::{Clock, DomainError, DomainResult, ItemId, SystemClock};
use stockwatch_events::{Event, EventBus, InMemoryEventBus, Subscription};

use crate::change::{InventoryChange, ItemRemoved, ItemUpserted};
use crate::item::InventoryItemView;
use crate::source::{InventorySnapshot, InventorySource};

/// In-memory inventory keyed by item id.
///
/// Every successful mutation publishes an [`InventoryChange`] after the write
/// lock is released, so subscribers that re-read immediately see the new state.
pub struct InMemoryInventory {
    items: RwLock<BTreeMap<ItemId, InventoryItemView>>,
    changes: InMemoryEventBus<InventoryChange>,
    clock: Arc<dyn Clock>,
}

impl core::fmt::Debug for InMemoryInventory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryInventory")
            .field("items", &self.items)
            .field("changes", &self.changes)
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            changes: InMemoryEventBus::new(),
            clock,
        }
    }

    /// Build a store pre-populated with `items` (no change events are published).
    pub fn seeded(items: impl IntoIterator<Item = InventoryItemView>) -> DomainResult<Self> {
        let store = Self::new();
        {
            let mut map = store.write()?;
            for item in items {
                item.validate()?;
                map.insert(item.id, item);
            }
        }
        Ok(store)
    }

    pub fn get(&self, id: ItemId) -> Option<InventoryItemView> {
        self.items.read().ok()?.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert or replace an item.
    pub fn upsert(&self, item: InventoryItemView) -> DomainResult<()> {
        item.validate()?;
        let item_id = item.id;
        self.write()?.insert(item_id, item);

        self.announce(InventoryChange::ItemUpserted(ItemUpserted {
            item_id,
            occurred_at: self.clock.now(),
        }));
        Ok(())
    }

    /// Delete an item, returning its last view.
    pub fn remove(&self, id: ItemId) -> DomainResult<InventoryItemView> {
        let removed = self.write()?.remove(&id).ok_or_else(DomainError::not_found)?;

        self.announce(InventoryChange::ItemRemoved(ItemRemoved {
            item_id: id,
            occurred_at: self.clock.now(),
        }));
        Ok(removed)
    }

    /// Apply a signed quantity change and return the new quantity.
    pub fn adjust_quantity(&self, id: ItemId, delta: i64) -> DomainResult<u32> {
        if delta == 0 {
            return Err(DomainError::validation("delta cannot be zero"));
        }

        let quantity = {
            let mut map = self.write()?;
            let item = map.get_mut(&id).ok_or_else(DomainError::not_found)?;

            let next = i64::from(item.quantity) + delta;
            if next < 0 {
                return Err(DomainError::invariant("quantity cannot go negative"));
            }
            item.quantity = u32::try_from(next)
                .map_err(|_| DomainError::invariant("quantity overflow"))?;
            item.quantity
        };

        self.announce(InventoryChange::ItemUpserted(ItemUpserted {
            item_id: id,
            occurred_at: self.clock.now(),
        }));
        Ok(quantity)
    }

    fn write(
        &self,
    ) -> DomainResult<std::sync::RwLockWriteGuard<'_, BTreeMap<ItemId, InventoryItemView>>> {
        self.items
            .write()
            .map_err(|_| DomainError::invariant("inventory lock poisoned"))
    }

    fn read(
        &self,
    ) -> DomainResult<std::sync::RwLockReadGuard<'_, BTreeMap<ItemId, InventoryItemView>>> {
        self.items
            .read()
            .map_err(|_| DomainError::invariant("inventory lock poisoned"))
    }

    fn announce(&self, change: InventoryChange) {
        debug!(item_id = %change.item_id(), change = change.event_type(), "inventory changed");
        if let Err(err) = self.changes.publish(change) {
            // Storage already holds the new state; subscribers catch up on the next change.
            warn!(error = ?err, "failed to publish inventory change");
        }
    }
}

impl InventorySource for InMemoryInventory {
    type Error = DomainError;

    fn low_stock_items(&self) -> Result<Vec<InventoryItemView>, Self::Error> {
        let map = self.read()?;
        Ok(map.values().filter(|i| i.is_low_stock()).cloned().collect())
    }

    fn all_items(&self) -> Result<Vec<InventoryItemView>, Self::Error> {
        Ok(self.read()?.values().cloned().collect())
    }

    fn snapshot(&self) -> Result<InventorySnapshot, Self::Error> {
        let map = self.read()?;
        Ok(InventorySnapshot::from_items(map.values().cloned()))
    }

    fn subscribe(&self) -> Subscription<InventoryChange> {
        self.changes.subscribe()
    }
}
