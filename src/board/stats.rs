//! Aggregate board statistics.

use crate::types::{Board, BoardStats, Column, ColumnSummary};

fn summarize(column: &Column) -> ColumnSummary {
    ColumnSummary {
        id: column.id.clone(),
        title: column.title.clone(),
        task_count: column.tasks.len(),
    }
}

impl Board {
    /// Compute totals and the busiest/quietest columns.
    ///
    /// Ties go to the column that comes first in board order.
    pub fn stats(&self) -> BoardStats {
        let mut busiest: Option<&Column> = None;
        let mut quietest: Option<&Column> = None;

        for column in self.columns() {
            let count = column.tasks.len();
            if busiest.is_none_or(|b| count > b.tasks.len()) {
                busiest = Some(column);
            }
            if quietest.is_none_or(|q| count < q.tasks.len()) {
                quietest = Some(column);
            }
        }

        BoardStats {
            total_columns: self.column_count(),
            total_tasks: self.task_count(),
            busiest: busiest.map(summarize),
            quietest: quietest.map(summarize),
        }
    }
}
