//! Live feed handles given to the presentation layer.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use stockwatch_events::Subscription;

use crate::deriver::DeriverState;
use crate::record::NotificationRecord;

/// A published feed: immutable, newest first, cheap to clone.
pub type Feed = Arc<[NotificationRecord]>;

/// Subscriber handle onto the deriver's feed.
///
/// Holds the last feed it has seen; `poll`/`wait_for_update` pull newer ones.
/// Dropping the last handle starts the deriver's grace window.
pub struct FeedSubscription {
    current: Feed,
    updates: Subscription<Feed>,
    state: Arc<Mutex<DeriverState>>,
}

impl core::fmt::Debug for FeedSubscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FeedSubscription")
            .field("current", &self.current.len())
            .finish_non_exhaustive()
    }
}

impl FeedSubscription {
    pub(crate) fn new(current: Feed, updates: Subscription<Feed>, state: Arc<Mutex<DeriverState>>) -> Self {
        Self {
            current,
            updates,
            state,
        }
    }

    /// Last feed this handle has observed.
    pub fn current(&self) -> &[NotificationRecord] {
        &self.current
    }

    pub fn snapshot(&self) -> Feed {
        Arc::clone(&self.current)
    }

    /// Adopt the newest published feed, if any arrived, and return it.
    pub fn poll(&mut self) -> &[NotificationRecord] {
        if let Some(latest) = self.updates.latest() {
            self.current = latest;
        }
        &self.current
    }

    /// Block up to `timeout` for a newer feed.
    ///
    /// Any further queued updates are collapsed into the newest one.
    pub fn wait_for_update(&mut self, timeout: Duration) -> Option<Feed> {
        let first = self.updates.recv_timeout(timeout).ok()?;
        self.current = self.updates.latest().unwrap_or(first);
        Some(Arc::clone(&self.current))
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.subscribers = state.subscribers.saturating_sub(1);
        if state.subscribers == 0 {
            state.idle_since = Some(Instant::now());
        }
    }
}
