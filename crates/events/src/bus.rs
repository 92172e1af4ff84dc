//! Event publishing/subscription abstraction (mechanics only).
//!
//! The bus distributes messages to every live subscriber (broadcast). It makes
//! no persistence or exactly-once promises: subscribers re-derive their state
//! from the source of truth, so a duplicate or coalesced message is harmless.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvError, RecvTimeoutError, TryRecvError};
use std::time::Duration;

/// A subscription to a message stream.
///
/// Each subscription receives its own copy of every message published after it
/// was created. Dropping it detaches from the bus on the next publish.
///
/// ```ignore
/// let sub = bus.subscribe();
/// loop {
///     match sub.recv_timeout(Duration::from_millis(250)) {
///         Ok(first) => {
///             let batch = sub.drain_after(first);
///             recompute(batch);
///         }
///         Err(RecvTimeoutError::Timeout) => continue,
///         Err(RecvTimeoutError::Disconnected) => break,
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Collect `first` plus every message already queued behind it.
    ///
    /// Used to coalesce a burst of changes into a single unit of work.
    pub fn drain_after(&self, first: M) -> Vec<M> {
        let mut batch = vec![first];
        while let Ok(next) = self.receiver.try_recv() {
            batch.push(next);
        }
        batch
    }

    /// Return the most recent queued message, discarding older ones.
    pub fn latest(&self) -> Option<M> {
        let mut last = None;
        while let Ok(next) = self.receiver.try_recv() {
            last = Some(next);
        }
        last
    }
}

/// Domain-agnostic pub/sub contract.
///
/// Implementations must be safe to share across threads; multiple producers
/// may publish concurrently.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
