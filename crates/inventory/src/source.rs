use std::sync::Arc;

use stockwatch_events::Subscription;

use crate::{InventoryChange, InventoryItemView};

/// One point-in-time read of the inventory views the notification core uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventorySnapshot {
    pub low_stock: Vec<InventoryItemView>,
    pub all_items: Vec<InventoryItemView>,
}

impl InventorySnapshot {
    /// Snapshot over a plain item list, computing the low-stock view locally.
    pub fn from_items(items: impl IntoIterator<Item = InventoryItemView>) -> Self {
        let all_items: Vec<_> = items.into_iter().collect();
        let low_stock = all_items.iter().filter(|i| i.is_low_stock()).cloned().collect();
        Self {
            low_stock,
            all_items,
        }
    }
}

/// Read-only port onto inventory storage.
///
/// Each query is a point-in-time read; `subscribe` turns the queries into live
/// views by announcing when a re-read is worthwhile.
pub trait InventorySource: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    /// Items whose quantity is at or below their minimum stock level.
    fn low_stock_items(&self) -> Result<Vec<InventoryItemView>, Self::Error>;

    /// Every item in storage.
    fn all_items(&self) -> Result<Vec<InventoryItemView>, Self::Error>;

    /// Both views from a single read. Writes never land between them.
    fn snapshot(&self) -> Result<InventorySnapshot, Self::Error>;

    /// Change feed for the collection.
    fn subscribe(&self) -> Subscription<InventoryChange>;
}

impl<S> InventorySource for Arc<S>
where
    S: InventorySource + ?Sized,
{
    type Error = S::Error;

    fn low_stock_items(&self) -> Result<Vec<InventoryItemView>, Self::Error> {
        (**self).low_stock_items()
    }

    fn all_items(&self) -> Result<Vec<InventoryItemView>, Self::Error> {
        (**self).all_items()
    }

    fn snapshot(&self) -> Result<InventorySnapshot, Self::Error> {
        (**self).snapshot()
    }

    fn subscribe(&self) -> Subscription<InventoryChange> {
        (**self).subscribe()
    }
}
