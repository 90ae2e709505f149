//! Column add/remove operations.

use crate::error::{BoardError, BoardResult, validate_id};
use crate::types::{Board, Column, ColumnId, InsertEdge};
use std::sync::Arc;

impl Board {
    /// Add an empty column at `edge` and return its fresh id.
    pub fn add_column(&mut self, title: &str, edge: InsertEdge) -> ColumnId {
        let id = self.fresh_column_id();
        edge.insert(&mut self.columns, Arc::new(Column::new(id.clone(), title)));
        id
    }

    /// Remove a column together with every task it owns.
    ///
    /// Returns the removed column.
    pub fn remove_column(&mut self, column_id: &str) -> BoardResult<Column> {
        validate_id("column_id", column_id)?;
        let index = self
            .column_index(column_id)
            .ok_or_else(|| BoardError::column_not_found(column_id))?;
        let removed = self.columns.remove(index);
        Ok(Arc::unwrap_or_clone(removed))
    }
}
