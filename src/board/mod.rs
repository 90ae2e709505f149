//! Authoritative in-memory board model.
//!
//! A [`Board`] is a plain value. Every mutation either succeeds completely or
//! returns a [`BoardError`](crate::error::BoardError) and leaves the board
//! exactly as it was, so callers can apply operations to a working copy and
//! discard it on failure.

pub mod columns;
pub mod seed;
pub mod stats;
pub mod tasks;

use crate::types::{Board, Column, Task};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// A structural problem found by [`Board::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    EmptyColumnId { index: usize },
    EmptyTaskId { column_id: String, index: usize },
    DuplicateColumnId(String),
    DuplicateTaskId(String),
}

impl Board {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from an ordered list of columns as given.
    ///
    /// No validation is performed; see [`seed::repair`] for untrusted input.
    pub fn from_columns(columns: Vec<Column>) -> Self {
        Self {
            columns: columns.into_iter().map(Arc::new).collect(),
        }
    }

    /// Take the columns out of the board, cloning any still shared with
    /// another snapshot.
    pub fn into_columns(self) -> Vec<Column> {
        self.columns.into_iter().map(Arc::unwrap_or_clone).collect()
    }

    pub fn columns(&self) -> impl ExactSizeIterator<Item = &Column> + '_ {
        self.columns.iter().map(|c| c.as_ref())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_ids(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.id.clone()).collect()
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.id == column_id)
            .map(|c| c.as_ref())
    }

    pub(crate) fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == column_id)
    }

    /// Mutable access to a column, cloning it first if it is shared with
    /// another snapshot.
    pub(crate) fn column_mut(&mut self, column_id: &str) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.id == column_id)
            .map(Arc::make_mut)
    }

    /// Locate a task anywhere on the board.
    pub fn find_task(&self, task_id: &str) -> Option<(&Column, &Task)> {
        self.columns().find_map(|column| {
            column
                .tasks
                .iter()
                .find(|t| t.id == task_id)
                .map(|task| (column, task))
        })
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }

    pub fn contains_task(&self, task_id: &str) -> bool {
        self.find_task(task_id).is_some()
    }

    /// Whether two snapshots still share the same allocation for a column.
    pub fn shares_column(&self, other: &Board, column_id: &str) -> bool {
        let find = |b: &Board| b.columns.iter().find(|c| c.id == column_id).cloned();
        match (find(self), find(other)) {
            (Some(a), Some(b)) => Arc::ptr_eq(&a, &b),
            _ => false,
        }
    }

    /// Generate a column id not used by any column on this board.
    pub(crate) fn fresh_column_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.column(&id).is_none() {
                return id;
            }
        }
    }

    /// Generate a task id not used by any task on this board.
    pub(crate) fn fresh_task_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if !self.contains_task(&id) {
                return id;
            }
        }
    }

    /// Report every invariant violation on the board.
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        let mut column_ids = HashSet::new();
        let mut task_ids = HashSet::new();

        for (index, column) in self.columns().enumerate() {
            if column.id.is_empty() {
                violations.push(InvariantViolation::EmptyColumnId { index });
            } else if !column_ids.insert(column.id.as_str()) {
                violations.push(InvariantViolation::DuplicateColumnId(column.id.clone()));
            }

            for (index, task) in column.tasks.iter().enumerate() {
                if task.id.is_empty() {
                    violations.push(InvariantViolation::EmptyTaskId {
                        column_id: column.id.clone(),
                        index,
                    });
                } else if !task_ids.insert(task.id.as_str()) {
                    violations.push(InvariantViolation::DuplicateTaskId(task.id.clone()));
                }
            }
        }

        violations
    }
}
