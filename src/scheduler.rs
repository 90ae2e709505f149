//! Deferred batch delivery.
//!
//! A loader that enters its Loading state asks the scheduler to deliver a
//! [`BatchReady`] event after the configured delay. Delivery happens on a
//! spawned tokio task that sends the event back over an mpsc channel, so the
//! event loop never blocks while a batch is pending.

use crate::loader::BatchTicket;
use crate::types::ColumnId;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Which loader a pending batch belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoaderTarget {
    /// The board-wide column loader.
    Columns,
    /// The task loader of one column.
    Tasks(ColumnId),
}

/// A delay has elapsed and the target loader may reveal its next batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReady {
    pub target: LoaderTarget,
    pub ticket: BatchTicket,
}

/// Cancellable handle to a scheduled delivery.
///
/// Dropping the handle cancels the delivery if it has not happened yet.
#[derive(Debug)]
pub struct TimerHandle {
    handle: JoinHandle<()>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Schedules [`BatchReady`] deliveries onto a channel.
#[derive(Debug, Clone)]
pub struct BatchScheduler {
    tx: mpsc::UnboundedSender<BatchReady>,
}

impl BatchScheduler {
    /// Create a scheduler and the receiver its deliveries arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<BatchReady>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Deliver `ready` after `delay`. Must be called from within a tokio
    /// runtime.
    pub fn schedule(&self, ready: BatchReady, delay: Duration) -> TimerHandle {
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            trace!(target_loader = ?ready.target, "Batch delay elapsed");
            // Receiver gone means the controller shut down.
            let _ = tx.send(ready);
        });
        TimerHandle { handle }
    }
}
