use std::collections::HashSet;

use stockwatch_core::ItemId;

use crate::kind::NotificationKind;
use crate::record::NotificationKey;

/// Keys the user has dismissed or marked read.
///
/// Grows until [`clear`](Self::clear) is called. Process-local: nothing here
/// is persisted, so dismissals reset when the process restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DismissalSet {
    keys: HashSet<NotificationKey>,
}

impl DismissalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the key was not already dismissed.
    pub fn dismiss(&mut self, key: NotificationKey) -> bool {
        self.keys.insert(key)
    }

    /// Dismiss every kind for `item_id`; returns how many keys were new.
    pub fn dismiss_item(&mut self, item_id: ItemId) -> usize {
        NotificationKind::ALL
            .into_iter()
            .filter(|kind| self.keys.insert(NotificationKey::new(item_id, *kind)))
            .count()
    }

    /// Dismiss many keys at once; returns how many were new.
    pub fn dismiss_all(&mut self, keys: impl IntoIterator<Item = NotificationKey>) -> usize {
        keys.into_iter().filter(|key| self.keys.insert(*key)).count()
    }

    pub fn contains(&self, key: &NotificationKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}
