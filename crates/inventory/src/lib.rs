//! Inventory collaborator boundary.
//!
//! The notification core only reads inventory. This crate defines the read-only
//! item view, the change events storage emits, the `InventorySource` port the
//! core consumes, and an in-memory implementation of that port.

pub mod change;
pub mod in_memory;
pub mod item;
pub mod source;

pub use change::{InventoryChange, ItemRemoved, ItemUpserted};
pub use in_memory::InMemoryInventory;
pub use item::InventoryItemView;
pub use source::{InventorySnapshot, InventorySource};
