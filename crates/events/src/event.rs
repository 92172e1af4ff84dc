use chrono::{DateTime, Utc};

/// A change notification that can travel over an [`EventBus`](crate::EventBus).
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - **named** (stable type string for logs)
/// - **timestamped** (business time)
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "inventory.item.upserted").
    fn event_type(&self) -> &'static str;

    /// When the change occurred.
    fn occurred_at(&self) -> DateTime<Utc>;
}
