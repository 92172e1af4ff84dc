//! `stockwatch-events`: change notification plumbing.
//!
//! A transport-agnostic pub/sub contract plus an in-memory implementation.
//! Inventory changes and published notification feeds both travel over it.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
