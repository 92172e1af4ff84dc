//! Reactive owner of the notification feed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing::{debug, info, warn};

use stockwatch_core::{Clock, ItemId, SystemClock};
use stockwatch_events::{EventBus, InMemoryEventBus};
use stockwatch_inventory::{InventoryItemView, InventorySource};

use crate::config::DeriverConfig;
use crate::derive::{capture, derive_feed};
use crate::dismissal::DismissalSet;
use crate::feed::{Feed, FeedSubscription};
use crate::kind::NotificationKind;
use crate::record::{NotificationKey, NotificationRecord};
use crate::summary::{self, Summary};
use crate::worker::{self, WorkerHandle};

/// Mutable deriver state. One mutex guards all of it, so recomputation and
/// dismissals are serialized.
#[derive(Debug)]
pub(crate) struct DeriverState {
    pub(crate) dismissed: DismissalSet,
    /// Records posted directly (item updated/deleted, general notices).
    pub(crate) direct: Vec<NotificationRecord>,
    pub(crate) published: Feed,
    pub(crate) subscribers: usize,
    /// When the subscriber count last dropped to zero.
    pub(crate) idle_since: Option<Instant>,
    /// Inventory changed while nobody was listening.
    pub(crate) stale: bool,
}

impl DeriverState {
    fn new() -> Self {
        Self {
            dismissed: DismissalSet::new(),
            direct: Vec::new(),
            published: Arc::from(Vec::new()),
            subscribers: 0,
            idle_since: None,
            stale: true,
        }
    }

    fn forget_direct(&mut self, dismissed: impl Fn(&NotificationKey) -> bool) {
        self.direct.retain(|record| !dismissed(&record.key()));
    }
}

struct Shared<S> {
    source: S,
    clock: Arc<dyn Clock>,
    config: DeriverConfig,
    state: Arc<Mutex<DeriverState>>,
    feeds: InMemoryEventBus<Feed>,
}

/// Derives the notification feed from an [`InventorySource`].
///
/// Cloning is cheap; clones share the same dismissal state and feed.
///
/// ```ignore
/// let inventory = Arc::new(InMemoryInventory::new());
/// let deriver = NotificationDeriver::new(inventory.clone(), DeriverConfig::from_env());
/// let worker = deriver.spawn_worker()?;
///
/// let mut feed = deriver.feed();
/// inventory.upsert(item)?;
/// let latest = feed.wait_for_update(Duration::from_secs(1));
///
/// worker.shutdown();
/// ```
pub struct NotificationDeriver<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for NotificationDeriver<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S> core::fmt::Debug for NotificationDeriver<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NotificationDeriver")
            .field("config", &self.shared.config)
            .field("state", &self.shared.state)
            .finish_non_exhaustive()
    }
}

impl<S> NotificationDeriver<S>
where
    S: InventorySource,
{
    pub fn new(source: S, config: DeriverConfig) -> Self {
        Self::with_clock(source, config, Arc::new(SystemClock))
    }

    pub fn with_clock(source: S, config: DeriverConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            shared: Arc::new(Shared {
                source,
                clock,
                config,
                state: Arc::new(Mutex::new(DeriverState::new())),
                feeds: InMemoryEventBus::new(),
            }),
        }
    }

    pub fn config(&self) -> &DeriverConfig {
        &self.shared.config
    }

    pub fn source(&self) -> &S {
        &self.shared.source
    }

    /// Attach to the live feed.
    ///
    /// Reuses the held feed while it is fresh; recomputes first if inventory
    /// changed while nobody was subscribed.
    pub fn feed(&self) -> FeedSubscription {
        let mut state = self.lock_state();
        state.subscribers += 1;
        state.idle_since = None;
        if state.stale {
            self.recompute(&mut state);
        }

        // Subscribe under the lock so no publish slips between snapshot and subscription.
        let updates = self.shared.feeds.subscribe();
        FeedSubscription::new(
            Arc::clone(&state.published),
            updates,
            Arc::clone(&self.shared.state),
        )
    }

    /// Last published feed, without recomputing.
    pub fn current(&self) -> Feed {
        Arc::clone(&self.lock_state().published)
    }

    /// Recompute now, e.g. so date windows move forward without an inventory change.
    pub fn refresh(&self) -> Feed {
        let mut state = self.lock_state();
        self.recompute(&mut state)
    }

    /// Dismiss the clicked record's (item, kind).
    pub fn on_notification_clicked(&self, record: &NotificationRecord) {
        let key = record.key();
        let mut state = self.lock_state();
        if state.dismissed.dismiss(key) {
            info!(item_id = %key.item_id, kind = %key.kind, "notification dismissed");
        }
        state.forget_direct(|k| *k == key);
        self.recompute(&mut state);
    }

    /// Dismiss every kind of notification for `item_id`, present or not.
    pub fn mark_item_read(&self, item_id: ItemId) {
        let mut state = self.lock_state();
        let added = state.dismissed.dismiss_item(item_id);
        info!(item_id = %item_id, added, "item marked read");
        state.forget_direct(|k| k.item_id == item_id);
        self.recompute(&mut state);
    }

    /// Hide everything currently visible. Inventory is untouched.
    pub fn clear_all(&self) {
        let mut state = self.lock_state();
        if state.published.is_empty() {
            return;
        }

        let keys: Vec<NotificationKey> = state.published.iter().map(|r| r.key()).collect();
        let added = state.dismissed.dismiss_all(keys.iter().copied());
        info!(visible = keys.len(), added, "cleared all notifications");

        let DeriverState {
            dismissed, direct, ..
        } = &mut *state;
        direct.retain(|record| !dismissed.contains(&record.key()));
        self.recompute(&mut state);
    }

    /// Forget every dismissal; derived alerts that still apply reappear.
    pub fn clear_dismissals(&self) {
        let mut state = self.lock_state();
        let cleared = state.dismissed.len();
        state.dismissed.clear();
        info!(cleared, "dismissals cleared");
        self.recompute(&mut state);
    }

    /// Add a directly posted record (item updated/deleted, general notice).
    ///
    /// A record with the same key replaces the earlier one. Records for
    /// already-dismissed keys are ignored.
    pub fn post(&self, record: NotificationRecord) {
        let key = record.key();
        let mut state = self.lock_state();
        if state.dismissed.contains(&key) {
            debug!(%key, "ignoring post for dismissed notification");
            return;
        }

        state.direct.retain(|r| r.key() != key);
        state.direct.push(record);
        debug!(%key, direct = state.direct.len(), "notification posted");
        self.recompute(&mut state);
    }

    /// Post a templated record for `item`, stamped with the current time.
    pub fn post_for_item(&self, item: &InventoryItemView, kind: NotificationKind) {
        let record = NotificationRecord::for_item(
            item,
            kind,
            self.shared.clock.now(),
            &self.shared.config.date_format,
        );
        self.post(record);
    }

    /// Per-kind roll-ups over a fresh inventory read.
    pub fn summaries(&self) -> Vec<Summary> {
        let shared = &*self.shared;
        let snapshot = capture(&shared.source);
        summary::summaries(&snapshot, shared.clock.now(), &shared.config)
    }

    pub fn is_dismissed(&self, key: &NotificationKey) -> bool {
        self.lock_state().dismissed.contains(key)
    }

    pub fn dismissed_len(&self) -> usize {
        self.lock_state().dismissed.len()
    }

    /// React to a coalesced batch of inventory changes.
    pub(crate) fn on_inventory_changed(&self, changes: usize) {
        let mut state = self.lock_state();
        if self.is_active(&state) {
            debug!(changes, "inventory changed; recomputing feed");
            self.recompute(&mut state);
        } else {
            debug!(changes, "inventory changed with no subscribers; feed marked stale");
            state.stale = true;
        }
    }

    fn is_active(&self, state: &DeriverState) -> bool {
        state.subscribers > 0
            || state
                .idle_since
                .is_some_and(|since| since.elapsed() < self.shared.config.grace_period())
    }

    fn lock_state(&self) -> MutexGuard<'_, DeriverState> {
        self.shared.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-derive from a fresh snapshot; broadcasts only when visible entries changed.
    fn recompute(&self, state: &mut DeriverState) -> Feed {
        let shared = &*self.shared;
        let snapshot = capture(&shared.source);
        let records = derive_feed(
            &snapshot,
            &state.direct,
            &state.dismissed,
            shared.clock.now(),
            &shared.config,
        );
        state.stale = false;

        if same_entries(&state.published, &records) {
            debug!(records = records.len(), "feed unchanged");
            return Arc::clone(&state.published);
        }

        let feed: Feed = records.into();
        state.published = Arc::clone(&feed);
        debug!(
            records = feed.len(),
            dismissed = state.dismissed.len(),
            "notification feed recomputed"
        );

        if let Err(err) = shared.feeds.publish(Arc::clone(&feed)) {
            warn!(error = ?err, "failed to publish notification feed");
        }
        feed
    }
}

impl<S> NotificationDeriver<S>
where
    S: InventorySource + 'static,
{
    /// Start a worker that recomputes on inventory changes.
    pub fn spawn_worker(&self) -> std::io::Result<WorkerHandle> {
        worker::spawn("notification-deriver", self.clone())
    }
}

fn same_entries(a: &[NotificationRecord], b: &[NotificationRecord]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_content(y))
}
