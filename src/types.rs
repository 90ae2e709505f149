//! Core types for the kanban board.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Opaque task identifier, unique across the whole board.
pub type TaskId = String;

/// Opaque column identifier, unique across the board.
pub type ColumnId = String;

/// A single work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// A named, ordered list of tasks.
///
/// Task order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            tasks: Vec::new(),
            color: None,
        }
    }

    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Position of the task with this id, if present.
    pub fn position(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.position(task_id).is_some()
    }
}

/// The root aggregate: an ordered list of columns.
///
/// Columns are reference counted so that a mutated snapshot shares every
/// untouched column with the snapshot it was derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub(crate) columns: Vec<Arc<Column>>,
}

/// Which end of an ordered list new items are inserted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertEdge {
    Start,
    #[default]
    End,
}

impl InsertEdge {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsertEdge::Start => "start",
            InsertEdge::End => "end",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "start" | "front" | "prepend" => Some(InsertEdge::Start),
            "end" | "back" | "append" => Some(InsertEdge::End),
            _ => None,
        }
    }

    /// Insert `item` into `list` at this edge.
    pub fn insert<T>(&self, list: &mut Vec<T>, item: T) {
        match self {
            InsertEdge::Start => list.insert(0, item),
            InsertEdge::End => list.push(item),
        }
    }
}

/// Task count summary for a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub id: ColumnId,
    pub title: String,
    pub task_count: usize,
}

/// Aggregate statistics over the whole board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardStats {
    pub total_columns: usize,
    pub total_tasks: usize,
    /// Column holding the most tasks; first in column order on ties.
    pub busiest: Option<ColumnSummary>,
    /// Column holding the fewest tasks; first in column order on ties.
    pub quietest: Option<ColumnSummary>,
}

/// Renderable state of one revealed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    pub id: ColumnId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Revealed prefix of the column's tasks.
    pub tasks: Vec<Task>,
    pub total_tasks: usize,
    pub loading: bool,
}

/// Renderable state of the whole board: revealed columns plus stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    pub columns: Vec<ColumnView>,
    pub total_columns: usize,
    pub loading_columns: bool,
    pub stats: BoardStats,
}
