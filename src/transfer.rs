//! Drag-and-drop transfer protocol.
//!
//! A drag gesture has two phases. On pick-up the task is snapshotted by value
//! into a [`DragPayload`] and encoded to text; the text travels with the
//! gesture. On drop the text is decoded and validated, then applied to the
//! board as a single conditional relocation.

use crate::board::tasks::Relocation;
use crate::error::{BoardError, BoardResult, TransferError, TransferResult};
use crate::types::{Board, ColumnId, Task};
use serde::{Deserialize, Serialize};

/// Wire form of a picked-up task: `{"task":{"id","title"},"fromColumnId"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    pub task: Task,
    pub from_column_id: ColumnId,
}

/// Loose shape used while decoding so that missing fields are reported by
/// name instead of as a generic parse error.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPayload {
    task: Option<RawTask>,
    from_column_id: Option<String>,
}

#[derive(Deserialize)]
struct RawTask {
    id: Option<String>,
    title: Option<String>,
}

fn required(value: Option<String>, field: &'static str) -> TransferResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(TransferError::MissingField(field)),
    }
}

impl DragPayload {
    /// Snapshot a task for dragging. Returns `None` if the column does not
    /// hold that task.
    pub fn pick_up(board: &Board, column_id: &str, task_id: &str) -> Option<Self> {
        let task = board
            .column(column_id)?
            .tasks
            .iter()
            .find(|t| t.id == task_id)?
            .clone();
        Some(Self {
            task,
            from_column_id: column_id.to_string(),
        })
    }

    pub fn encode(&self) -> TransferResult<String> {
        serde_json::to_string(self).map_err(TransferError::Encode)
    }

    /// Parse and validate a payload. Ids must be present and non-empty; the
    /// title must be present but may be empty.
    pub fn decode(raw: &str) -> TransferResult<Self> {
        let raw: RawPayload = serde_json::from_str(raw).map_err(TransferError::Malformed)?;
        let task = raw.task.ok_or(TransferError::MissingField("task"))?;
        let id = required(task.id, "task.id")?;
        let title = task.title.ok_or(TransferError::MissingField("task.title"))?;
        let from_column_id = required(raw.from_column_id, "fromColumnId")?;

        Ok(Self {
            task: Task { id, title },
            from_column_id,
        })
    }

    /// Move the payload's task into `to_column_id`.
    ///
    /// Dropping onto the source column is a no-op, as is a payload whose task
    /// is no longer in its source column.
    pub fn apply(&self, board: &mut Board, to_column_id: &str) -> BoardResult<Relocation> {
        if self.from_column_id == to_column_id {
            return Err(BoardError::SameColumn(to_column_id.to_string()));
        }
        board.move_task(&self.from_column_id, to_column_id, &self.task)
    }
}
