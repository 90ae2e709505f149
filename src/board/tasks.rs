//! Task add/delete/move operations.

use crate::error::{BoardError, BoardResult, validate_id};
use crate::types::{Board, InsertEdge, Task, TaskId};

/// How a successful move landed in the destination column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relocation {
    /// Removed from the source and appended to the destination.
    Moved,
    /// Removed from the source; the destination already held a task with the
    /// same id, which was kept instead of adding a second entry.
    MergedIntoExisting,
}

impl Board {
    /// Add a task with a fresh id to `column_id` at `edge`.
    pub fn add_task(&mut self, column_id: &str, title: &str, edge: InsertEdge) -> BoardResult<TaskId> {
        validate_id("column_id", column_id)?;
        if title.trim().is_empty() {
            return Err(BoardError::EmptyTitle);
        }
        if self.column(column_id).is_none() {
            return Err(BoardError::column_not_found(column_id));
        }

        let id = self.fresh_task_id();
        let task = Task::new(id.clone(), title);
        let column = self
            .column_mut(column_id)
            .ok_or_else(|| BoardError::column_not_found(column_id))?;
        edge.insert(&mut column.tasks, task);
        Ok(id)
    }

    /// Delete a task from the named column. Returns the removed task.
    pub fn delete_task(&mut self, column_id: &str, task_id: &str) -> BoardResult<Task> {
        validate_id("column_id", column_id)?;
        validate_id("task_id", task_id)?;

        let index = self
            .column(column_id)
            .ok_or_else(|| BoardError::column_not_found(column_id))?
            .position(task_id)
            .ok_or_else(|| BoardError::task_not_found(column_id, task_id))?;

        let column = self
            .column_mut(column_id)
            .ok_or_else(|| BoardError::column_not_found(column_id))?;
        Ok(column.tasks.remove(index))
    }

    /// Relocate `task` from one column to the end of another.
    ///
    /// The move is conditional: it only happens if the source column still
    /// holds a task with `task.id`. Every precondition is checked before the
    /// board is touched.
    pub fn move_task(&mut self, from_column_id: &str, to_column_id: &str, task: &Task) -> BoardResult<Relocation> {
        validate_id("from_column_id", from_column_id)?;
        validate_id("to_column_id", to_column_id)?;
        validate_id("task_id", &task.id)?;

        if from_column_id == to_column_id {
            return Err(BoardError::SameColumn(to_column_id.to_string()));
        }

        let already_in_destination = self
            .column(to_column_id)
            .ok_or_else(|| BoardError::column_not_found(to_column_id))?
            .contains(&task.id);

        let index = self
            .column(from_column_id)
            .ok_or_else(|| BoardError::column_not_found(from_column_id))?
            .position(&task.id)
            .ok_or_else(|| BoardError::task_not_found(from_column_id, &task.id))?;

        if let Some(source) = self.column_mut(from_column_id) {
            source.tasks.remove(index);
        }

        if already_in_destination {
            return Ok(Relocation::MergedIntoExisting);
        }

        if let Some(destination) = self.column_mut(to_column_id) {
            destination.tasks.push(task.clone());
        }
        Ok(Relocation::Moved)
    }
}
