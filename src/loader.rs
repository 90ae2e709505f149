//! Progressive reveal of an ordered list.
//!
//! A [`ViewportLoader`] exposes a prefix of some source list and grows it by a
//! fixed batch each time a proximity signal arrives, after a delay. It does not
//! own the list: it tracks how many items are revealed and slices whatever
//! source it is handed.
//!
//! ```text
//!   Idle --signal--> Loading --batch ready--> Idle ... --> Drained
//! ```
//!
//! Signals are dropped while Loading and once Drained. When the source list
//! changes the loader is reset to its first batch and any pending batch is
//! cancelled; a long list that gains an item snaps back to the first batch.

use crate::config::RevealConfig;
use crate::scheduler::TimerHandle;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, trace};

/// Observable state of a loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderPhase {
    Idle,
    Loading,
    /// Everything is revealed; signals are inert.
    Drained,
}

/// Proof that a batch was requested during a particular loader epoch.
///
/// Resetting a loader starts a new epoch, so tickets from before the reset
/// are rejected by [`ViewportLoader::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchTicket {
    epoch: u64,
}

#[derive(Debug)]
pub struct ViewportLoader {
    batch_size: usize,
    delay: Duration,
    source_len: usize,
    revealed: usize,
    loading: bool,
    epoch: u64,
    timer: Option<TimerHandle>,
}

impl ViewportLoader {
    pub fn new(config: &RevealConfig, source_len: usize) -> Self {
        Self::with_batch(config.batch_size, config.delay(), source_len)
    }

    /// A zero batch size is treated as one.
    pub fn with_batch(batch_size: usize, delay: Duration, source_len: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            batch_size,
            delay,
            source_len,
            revealed: batch_size.min(source_len),
            loading: false,
            epoch: 0,
            timer: None,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn source_len(&self) -> usize {
        self.source_len
    }

    pub fn revealed_len(&self) -> usize {
        self.revealed
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_drained(&self) -> bool {
        !self.loading && self.revealed >= self.source_len
    }

    pub fn phase(&self) -> LoaderPhase {
        if self.loading {
            LoaderPhase::Loading
        } else if self.revealed >= self.source_len {
            LoaderPhase::Drained
        } else {
            LoaderPhase::Idle
        }
    }

    /// The revealed prefix of `source`.
    pub fn visible<'a, T>(&self, source: &'a [T]) -> &'a [T] {
        &source[..self.revealed.min(source.len())]
    }

    /// Handle a proximity signal.
    ///
    /// Returns a ticket if the loader moved from Idle to Loading; the caller
    /// is expected to complete it after [`delay`](Self::delay). Returns `None`
    /// when the signal is dropped.
    pub fn signal(&mut self) -> Option<BatchTicket> {
        match self.phase() {
            LoaderPhase::Idle => {
                self.loading = true;
                trace!(revealed = self.revealed, total = self.source_len, "Loader entering loading state");
                Some(BatchTicket { epoch: self.epoch })
            }
            LoaderPhase::Loading => {
                trace!("Proximity signal dropped, batch already pending");
                None
            }
            LoaderPhase::Drained => None,
        }
    }

    /// Keep the timer that will deliver the pending batch. Replacing or
    /// dropping the loader cancels it.
    pub fn attach_timer(&mut self, timer: TimerHandle) {
        self.timer = Some(timer);
    }

    pub fn has_pending_timer(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Reveal the next batch for a ticket issued by [`signal`](Self::signal).
    ///
    /// Returns `false` without changing anything if the ticket is stale or no
    /// batch is pending.
    pub fn complete(&mut self, ticket: BatchTicket) -> bool {
        if !self.loading || ticket.epoch != self.epoch {
            debug!(ticket_epoch = ticket.epoch, epoch = self.epoch, "Ignoring stale batch");
            return false;
        }

        self.revealed = (self.revealed + self.batch_size).min(self.source_len);
        self.loading = false;
        self.timer = None;
        trace!(revealed = self.revealed, total = self.source_len, "Batch revealed");
        true
    }

    /// Cancel any pending batch without touching the revealed count.
    pub fn cancel_pending(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        if self.loading {
            self.loading = false;
            self.epoch += 1;
        }
    }

    /// Restart from the first batch of a new source.
    pub fn reset(&mut self, source_len: usize) {
        self.cancel_pending();
        self.epoch += 1;
        self.source_len = source_len;
        self.revealed = self.batch_size.min(source_len);
    }
}
