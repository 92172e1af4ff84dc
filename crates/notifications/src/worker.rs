use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use stockwatch_events::Subscription;
use stockwatch_inventory::{InventoryChange, InventorySource};

use crate::deriver::NotificationDeriver;

/// Handle to control and join the deriver's background worker.
///
/// Dropping the handle also stops the worker, without waiting for it.
#[derive(Debug)]
#[must_use = "dropping the handle stops the worker"]
pub struct WorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Spawn a thread that recomputes the feed whenever inventory changes.
///
/// The change subscription is taken before the thread starts, so no change
/// published after this call returns is missed.
pub(crate) fn spawn<S>(name: &'static str, deriver: NotificationDeriver<S>) -> std::io::Result<WorkerHandle>
where
    S: InventorySource + 'static,
{
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
    let changes = deriver.source().subscribe();

    let join = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || worker_loop(name, changes, shutdown_rx, deriver))?;

    Ok(WorkerHandle {
        shutdown: shutdown_tx,
        join: Some(join),
    })
}

fn worker_loop<S>(
    name: &'static str,
    changes: Subscription<InventoryChange>,
    shutdown_rx: mpsc::Receiver<()>,
    deriver: NotificationDeriver<S>,
) where
    S: InventorySource,
{
    let tick = Duration::from_millis(250);
    info!(worker = name, "notification worker started");

    loop {
        // Explicit shutdown or a dropped handle.
        match shutdown_rx.try_recv() {
            Err(TryRecvError::Empty) => {}
            Ok(()) | Err(TryRecvError::Disconnected) => break,
        }

        match changes.recv_timeout(tick) {
            Ok(first) => {
                // Coalesce the burst: one recompute per drained batch.
                let batch = changes.drain_after(first);
                deriver.on_inventory_changed(batch.len());
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                warn!(worker = name, "inventory change feed closed");
                break;
            }
        }
    }

    info!(worker = name, "notification worker stopped");
}
