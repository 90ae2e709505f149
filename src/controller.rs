//! Board controller: the single owner of board state.
//!
//! The controller validates intents, applies them to a working copy of the
//! current [`Board`] and publishes the copy as the new snapshot. Readers hold
//! `Arc<Board>` snapshots and never see a partially applied mutation.
//!
//! It also owns the reveal loaders: one over the column list and one per
//! column over its tasks. Any mutation that changes a list resets the loader
//! over that list. Batches are delivered through [`BatchScheduler`] and
//! applied by [`BoardController::apply_batch`], either from [`run`] or by
//! awaiting [`next_batch`]/[`settle`] directly.
//!
//! [`run`]: BoardController::run
//! [`next_batch`]: BoardController::next_batch
//! [`settle`]: BoardController::settle

use crate::board::seed::repair;
use crate::board::tasks::Relocation;
use crate::config::BoardConfig;
use crate::error::{BoardResult, validate_id};
use crate::intent::{Intent, IntentOutcome, IntentRequest};
use crate::loader::ViewportLoader;
use crate::scheduler::{BatchReady, BatchScheduler, LoaderTarget};
use crate::transfer::DragPayload;
use crate::types::{Board, BoardStats, BoardView, ColumnId, ColumnView, Task, TaskId};
use crate::viewport::ScrollMetrics;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

/// Cloneable, lock-free read handle on the current board snapshot.
#[derive(Clone)]
pub struct BoardReader {
    snapshot: Arc<ArcSwap<Board>>,
}

impl BoardReader {
    pub fn load(&self) -> Arc<Board> {
        self.snapshot.load_full()
    }
}

pub struct BoardController {
    config: BoardConfig,
    snapshot: Arc<ArcSwap<Board>>,
    column_loader: ViewportLoader,
    task_loaders: HashMap<ColumnId, ViewportLoader>,
    scheduler: BatchScheduler,
    batches: mpsc::UnboundedReceiver<BatchReady>,
    /// Bumped whenever the snapshot or reveal state changes.
    revision: watch::Sender<u64>,
}

impl BoardController {
    /// Take ownership of `board`. A board with empty or duplicate ids is
    /// repaired first (first occurrence wins), since loaders are keyed by
    /// column id.
    pub fn new(board: Board, config: BoardConfig) -> Self {
        let violations = board.check_invariants();
        let board = if violations.is_empty() {
            board
        } else {
            let (columns, dropped) = repair(board.into_columns());
            warn!(violations = violations.len(), dropped, "Repaired board before taking ownership");
            Board::from_columns(columns)
        };

        let column_loader = ViewportLoader::new(&config.columns, board.column_count());
        let task_loaders = board
            .columns()
            .map(|c| (c.id.clone(), ViewportLoader::new(&config.tasks, c.tasks.len())))
            .collect();
        let (scheduler, batches) = BatchScheduler::channel();
        let (revision, _) = watch::channel(0);

        Self {
            config,
            snapshot: Arc::new(ArcSwap::from_pointee(board)),
            column_loader,
            task_loaders,
            scheduler,
            batches,
            revision,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// The current board snapshot.
    pub fn snapshot(&self) -> Arc<Board> {
        self.snapshot.load_full()
    }

    pub fn reader(&self) -> BoardReader {
        BoardReader {
            snapshot: Arc::clone(&self.snapshot),
        }
    }

    /// Receive a notification each time the rendered state may have changed.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn column_loader(&self) -> &ViewportLoader {
        &self.column_loader
    }

    pub fn task_loader(&self, column_id: &str) -> Option<&ViewportLoader> {
        self.task_loaders.get(column_id)
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|r| *r += 1);
    }

    /// Apply `op` to a copy of the board and publish the copy on success.
    fn mutate<T>(&mut self, op: &'static str, f: impl FnOnce(&mut Board) -> BoardResult<T>) -> Option<T> {
        let mut next = Board::clone(&self.snapshot.load_full());
        match f(&mut next) {
            Ok(value) => {
                self.snapshot.store(Arc::new(next));
                self.bump_revision();
                Some(value)
            }
            Err(e) => {
                debug!(op, code = e.code().as_str(), "Ignoring intent: {}", e);
                None
            }
        }
    }

    /// Restart the column loader after the column list changed.
    fn reset_columns(&mut self) {
        let count = self.snapshot.load().column_count();
        self.column_loader.reset(count);
    }

    /// Restart a column's task loader after its task list changed.
    fn reset_tasks(&mut self, column_id: &str) {
        let Some(len) = self.snapshot.load().column(column_id).map(|c| c.tasks.len()) else {
            return;
        };
        let settings = &self.config.tasks;
        self.task_loaders
            .entry(column_id.to_string())
            .or_insert_with(|| ViewportLoader::new(settings, len))
            .reset(len);
    }

    // =========================================================================
    // Board intents
    // =========================================================================

    /// Add a column. A blank title becomes `Column {n}`.
    pub fn add_column(&mut self, title: &str) -> ColumnId {
        let title = match title.trim() {
            "" => format!("Column {}", self.snapshot.load().column_count() + 1),
            t => t.to_string(),
        };
        let edge = self.config.insertion.column_edge;
        let id = self
            .mutate("add_column", |board| Ok(board.add_column(&title, edge)))
            .unwrap_or_default();

        self.task_loaders
            .insert(id.clone(), ViewportLoader::new(&self.config.tasks, 0));
        self.reset_columns();
        info!(column_id = %id, title = %title, "Column added");
        id
    }

    /// Remove a column and its tasks. Any batch pending for its task loader
    /// is cancelled.
    pub fn remove_column(&mut self, column_id: &str) -> bool {
        if let Err(e) = validate_id("column_id", column_id) {
            debug!(code = e.code().as_str(), "Ignoring remove_column: {}", e);
            return false;
        }
        let Some(removed) = self.mutate("remove_column", |board| board.remove_column(column_id)) else {
            return false;
        };

        // Dropping the loader drops its timer handle, which aborts the timer.
        self.task_loaders.remove(column_id);
        self.reset_columns();
        info!(column_id, tasks = removed.tasks.len(), "Column removed");
        true
    }

    /// Add a task. Titles are trimmed; an empty title is a no-op.
    pub fn add_task(&mut self, column_id: &str, title: &str) -> Option<TaskId> {
        if let Err(e) = validate_id("column_id", column_id) {
            debug!(code = e.code().as_str(), "Ignoring add_task: {}", e);
            return None;
        }
        let title = title.trim();
        if title.is_empty() {
            debug!(column_id, "Ignoring add_task with empty title");
            return None;
        }

        let edge = self.config.insertion.task_edge;
        let id = self.mutate("add_task", |board| board.add_task(column_id, title, edge))?;
        self.reset_tasks(column_id);
        debug!(column_id, task_id = %id, "Task added");
        Some(id)
    }

    pub fn delete_task(&mut self, column_id: &str, task_id: &str) -> bool {
        if let Err(e) = validate_id("column_id", column_id).and(validate_id("task_id", task_id)) {
            debug!(code = e.code().as_str(), "Ignoring delete_task: {}", e);
            return false;
        }
        if self
            .mutate("delete_task", |board| board.delete_task(column_id, task_id))
            .is_none()
        {
            return false;
        }
        self.reset_tasks(column_id);
        debug!(column_id, task_id, "Task deleted");
        true
    }

    /// Move `task` between columns as one conditional relocation.
    pub fn move_task(&mut self, from_column_id: &str, to_column_id: &str, task: &Task) -> bool {
        let valid = validate_id("from_column_id", from_column_id)
            .and(validate_id("to_column_id", to_column_id))
            .and(validate_id("task_id", &task.id));
        if let Err(e) = valid {
            debug!(code = e.code().as_str(), "Ignoring move: {}", e);
            return false;
        }

        let Some(relocation) = self.mutate("move_task", |board| {
            board.move_task(from_column_id, to_column_id, task)
        }) else {
            return false;
        };
        self.after_move(relocation, from_column_id, to_column_id, &task.id);
        true
    }

    fn after_move(&mut self, relocation: Relocation, from_column_id: &str, to_column_id: &str, task_id: &str) {
        if relocation == Relocation::MergedIntoExisting {
            info!(task_id, to_column_id, "Moved task already present in destination, kept existing entry");
        }
        self.reset_tasks(from_column_id);
        self.reset_tasks(to_column_id);
        debug!(task_id, from_column_id, to_column_id, "Task moved");
    }

    // =========================================================================
    // Drag and drop
    // =========================================================================

    /// Start dragging a task; returns the encoded payload for the gesture.
    pub fn drag_start(&self, column_id: &str, task_id: &str) -> Option<String> {
        let board = self.snapshot.load();
        let Some(payload) = DragPayload::pick_up(&board, column_id, task_id) else {
            debug!(column_id, task_id, "Ignoring drag_start for unknown task");
            return None;
        };
        match payload.encode() {
            Ok(encoded) => {
                trace!(column_id, task_id, "Task picked up");
                Some(encoded)
            }
            Err(e) => {
                debug!(code = e.code().as_str(), "Ignoring drag_start: {}", e);
                None
            }
        }
    }

    /// Drop a gesture's payload onto a column.
    ///
    /// Returns the moved task id. Missing or malformed payloads, drops onto
    /// the source column and stale payloads are all no-ops.
    pub fn drop_payload(&mut self, payload: Option<&str>, to_column_id: &str) -> Option<TaskId> {
        let Some(raw) = payload else {
            debug!(to_column_id, "Ignoring drop without payload");
            return None;
        };
        let payload = match DragPayload::decode(raw) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(code = e.code().as_str(), to_column_id, "Ignoring drop: {}", e);
                return None;
            }
        };
        if payload.from_column_id == to_column_id {
            trace!(to_column_id, "Task dropped onto its own column");
            return None;
        }

        if let Err(e) = validate_id("to_column_id", to_column_id) {
            debug!(code = e.code().as_str(), "Ignoring drop: {}", e);
            return None;
        }

        let relocation = self.mutate("drop", |board| payload.apply(board, to_column_id))?;
        self.after_move(relocation, &payload.from_column_id, to_column_id, &payload.task.id);
        Some(payload.task.id)
    }

    // =========================================================================
    // Progressive reveal
    // =========================================================================

    /// Start loading the next batch for `target`, unless it is already
    /// loading or drained.
    fn request_batch(&mut self, target: LoaderTarget) -> bool {
        let loader = match &target {
            LoaderTarget::Columns => &mut self.column_loader,
            LoaderTarget::Tasks(column_id) => match self.task_loaders.get_mut(column_id) {
                Some(loader) => loader,
                None => return false,
            },
        };
        let Some(ticket) = loader.signal() else {
            return false;
        };

        let delay = loader.delay();
        trace!(target_loader = ?target, ?delay, "Batch requested");
        let timer = self.scheduler.schedule(BatchReady { target, ticket }, delay);
        loader.attach_timer(timer);
        self.bump_revision();
        true
    }

    /// Proximity signal for the column loader.
    pub fn signal_columns(&mut self) -> bool {
        self.request_batch(LoaderTarget::Columns)
    }

    /// Proximity signal for one column's task loader.
    pub fn signal_tasks(&mut self, column_id: &str) -> bool {
        self.request_batch(LoaderTarget::Tasks(column_id.to_string()))
    }

    /// Horizontal scroll of the board container.
    pub fn on_board_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        if !metrics.is_near_end(self.config.columns.edge_threshold_px) {
            return false;
        }
        self.signal_columns()
    }

    /// Vertical scroll of the page. Every revealed column hears it, as each
    /// mounted column watches the page independently.
    ///
    /// Returns how many task loaders started a batch.
    pub fn on_page_scroll(&mut self, metrics: ScrollMetrics) -> usize {
        if !metrics.is_near_end(self.config.tasks.edge_threshold_px) {
            return 0;
        }
        let board = self.snapshot.load_full();
        self.column_loader
            .visible(&board.columns)
            .iter()
            .filter(|column| self.request_batch(LoaderTarget::Tasks(column.id.clone())))
            .count()
    }

    /// Apply a delivered batch. Returns `false` for batches that were
    /// cancelled or belong to a removed column.
    pub fn apply_batch(&mut self, ready: BatchReady) -> bool {
        let loader = match &ready.target {
            LoaderTarget::Columns => Some(&mut self.column_loader),
            LoaderTarget::Tasks(column_id) => self.task_loaders.get_mut(column_id),
        };
        let Some(loader) = loader else {
            debug!(target_loader = ?ready.target, "Dropping batch for removed column");
            return false;
        };
        if !loader.complete(ready.ticket) {
            return false;
        }

        debug!(
            target_loader = ?ready.target,
            revealed = loader.revealed_len(),
            total = loader.source_len(),
            "Batch revealed"
        );
        self.bump_revision();
        true
    }

    pub fn has_pending_batches(&self) -> bool {
        self.column_loader.is_loading() || self.task_loaders.values().any(|l| l.is_loading())
    }

    /// Wait for the next delivered batch and apply it. Returns the target if
    /// it was applied, `None` if it was stale.
    pub async fn next_batch(&mut self) -> Option<LoaderTarget> {
        let ready = self.batches.recv().await?;
        let target = ready.target.clone();
        self.apply_batch(ready).then_some(target)
    }

    /// Wait until no loader has a batch pending.
    pub async fn settle(&mut self) {
        while self.has_pending_batches() {
            if self.batches.recv().await.map(|r| self.apply_batch(r)).is_none() {
                break;
            }
        }
    }

    // =========================================================================
    // Derived state
    // =========================================================================

    pub fn stats(&self) -> BoardStats {
        self.snapshot.load().stats()
    }

    /// Revealed columns with their revealed tasks.
    pub fn view(&self) -> BoardView {
        let board = self.snapshot.load_full();
        let columns = self
            .column_loader
            .visible(&board.columns)
            .iter()
            .map(|column| {
                let tasks = match self.task_loaders.get(&column.id) {
                    Some(loader) => loader.visible(&column.tasks),
                    None => &column.tasks[..self.config.tasks.batch_size.min(column.tasks.len())],
                };
                ColumnView {
                    id: column.id.clone(),
                    title: column.title.clone(),
                    color: column.color.clone(),
                    tasks: tasks.to_vec(),
                    total_tasks: column.tasks.len(),
                    loading: self
                        .task_loaders
                        .get(&column.id)
                        .is_some_and(|l| l.is_loading()),
                }
            })
            .collect();

        BoardView {
            columns,
            total_columns: board.column_count(),
            loading_columns: self.column_loader.is_loading(),
            stats: board.stats(),
        }
    }

    // =========================================================================
    // Intent dispatch
    // =========================================================================

    pub fn dispatch(&mut self, intent: Intent) -> IntentOutcome {
        let name = intent.name();
        let outcome = match intent {
            Intent::AddColumn { title } => IntentOutcome::ColumnAdded {
                column_id: self.add_column(title.as_deref().unwrap_or("")),
            },
            Intent::RemoveColumn { column_id } => {
                if self.remove_column(&column_id) {
                    IntentOutcome::ColumnRemoved { column_id }
                } else {
                    IntentOutcome::Ignored
                }
            }
            Intent::AddTask { column_id, title } => match self.add_task(&column_id, &title) {
                Some(task_id) => IntentOutcome::TaskAdded { task_id },
                None => IntentOutcome::Ignored,
            },
            Intent::DeleteTask { column_id, task_id } => {
                if self.delete_task(&column_id, &task_id) {
                    IntentOutcome::TaskDeleted { task_id }
                } else {
                    IntentOutcome::Ignored
                }
            }
            Intent::DragStart { column_id, task_id } => match self.drag_start(&column_id, &task_id) {
                Some(payload) => IntentOutcome::PickedUp { payload },
                None => IntentOutcome::Ignored,
            },
            Intent::Drop {
                payload,
                to_column_id,
            } => match self.drop_payload(payload.as_deref(), &to_column_id) {
                Some(task_id) => IntentOutcome::Moved {
                    task_id,
                    to_column_id,
                },
                None => IntentOutcome::Ignored,
            },
            Intent::ScrollBoard { metrics } => IntentOutcome::RevealRequested {
                loaders: usize::from(self.on_board_scroll(metrics)),
            },
            Intent::ScrollPage { metrics } => IntentOutcome::RevealRequested {
                loaders: self.on_page_scroll(metrics),
            },
        };
        trace!(intent = name, ?outcome, "Intent dispatched");
        outcome
    }

    /// Event loop: handle intents and batch deliveries one at a time until
    /// the intent channel closes. Returns the controller for inspection.
    pub async fn run(mut self, mut intents: mpsc::Receiver<IntentRequest>) -> Self {
        info!("Board controller started");
        loop {
            tokio::select! {
                request = intents.recv() => {
                    let Some(request) = request else { break };
                    let outcome = self.dispatch(request.intent);
                    if let Some(reply) = request.reply {
                        // The requester may have stopped waiting.
                        let _ = reply.send(outcome);
                    }
                }
                Some(ready) = self.batches.recv() => {
                    self.apply_batch(ready);
                }
            }
        }
        info!("Board controller stopped");
        self
    }
}
