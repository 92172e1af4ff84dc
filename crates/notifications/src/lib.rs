//! Notification derivation engine.
//!
//! Watches inventory through an [`InventorySource`](stockwatch_inventory::InventorySource),
//! turns low-stock, expiring and warranty-expiring items into notification
//! records, and publishes one deduplicated, dismissal-aware, newest-first feed.
//!
//! - [`derive::derive_feed`] is the pure merge: inputs + dismissals in, feed out.
//! - [`NotificationDeriver`] owns dismissal state and re-runs the merge whenever
//!   inventory or dismissals change.
//! - [`summary::summaries`] rolls each derived view up into one count-based alert.
//!
//! Dismissals live in process memory only and are lost on restart.

pub mod config;
pub mod derive;
pub mod deriver;
pub mod dismissal;
pub mod feed;
pub mod format;
pub mod kind;
pub mod record;
pub mod summary;
mod worker;

pub use config::DeriverConfig;
pub use derive::{InventorySnapshot, capture, derive_feed};
pub use deriver::NotificationDeriver;
pub use dismissal::DismissalSet;
pub use feed::{Feed, FeedSubscription};
pub use kind::NotificationKind;
pub use record::{NotificationKey, NotificationRecord};
pub use summary::{Summary, summaries};
pub use worker::WorkerHandle;
