//! User intents and their outcomes.
//!
//! Intents are the only way a UI talks to the board. They deserialize from
//! scripts in the form `{ intent: add_task, column_id: ..., title: ... }`.

use crate::types::{ColumnId, TaskId};
use crate::viewport::ScrollMetrics;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    AddColumn {
        #[serde(default)]
        title: Option<String>,
    },
    RemoveColumn {
        column_id: ColumnId,
    },
    AddTask {
        column_id: ColumnId,
        title: String,
    },
    DeleteTask {
        column_id: ColumnId,
        task_id: TaskId,
    },
    /// Pick a task up; the outcome carries the encoded drag payload.
    DragStart {
        column_id: ColumnId,
        task_id: TaskId,
    },
    /// Drop a payload onto a column. A missing payload is a no-op.
    Drop {
        #[serde(default)]
        payload: Option<String>,
        to_column_id: ColumnId,
    },
    /// Horizontal scroll of the board container.
    ScrollBoard { metrics: ScrollMetrics },
    /// Vertical scroll of the page.
    ScrollPage { metrics: ScrollMetrics },
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::AddColumn { .. } => "add_column",
            Intent::RemoveColumn { .. } => "remove_column",
            Intent::AddTask { .. } => "add_task",
            Intent::DeleteTask { .. } => "delete_task",
            Intent::DragStart { .. } => "drag_start",
            Intent::Drop { .. } => "drop",
            Intent::ScrollBoard { .. } => "scroll_board",
            Intent::ScrollPage { .. } => "scroll_page",
        }
    }
}

/// What an intent did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IntentOutcome {
    ColumnAdded { column_id: ColumnId },
    ColumnRemoved { column_id: ColumnId },
    TaskAdded { task_id: TaskId },
    TaskDeleted { task_id: TaskId },
    PickedUp { payload: String },
    Moved { task_id: TaskId, to_column_id: ColumnId },
    /// Number of loaders that started loading a batch.
    RevealRequested { loaders: usize },
    /// The intent was a no-op.
    Ignored,
}

impl IntentOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, IntentOutcome::Ignored)
    }
}

/// An intent sent to a running controller, with an optional reply channel.
#[derive(Debug)]
pub struct IntentRequest {
    pub intent: Intent,
    pub reply: Option<oneshot::Sender<IntentOutcome>>,
}

impl IntentRequest {
    /// Fire-and-forget request.
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            reply: None,
        }
    }

    /// Request whose outcome is delivered on the returned receiver.
    pub fn with_reply(intent: Intent) -> (Self, oneshot::Receiver<IntentOutcome>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                intent,
                reply: Some(tx),
            },
            rx,
        )
    }
}

impl From<Intent> for IntentRequest {
    fn from(intent: Intent) -> Self {
        Self::new(intent)
    }
}
