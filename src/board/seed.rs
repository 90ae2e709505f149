//! Initial board data.
//!
//! The built-in seed is the ten-column demo board. A seed can also be read
//! from a YAML or JSON file; untrusted seeds go through [`repair`] so the
//! board starts out satisfying its invariants.

use crate::types::{Board, Column, Task};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

/// On-disk seed format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub columns: Vec<Column>,
}

/// (column number, title, task count) for the demo board.
const DEMO_COLUMNS: &[(usize, &str, usize)] = &[
    (1, "To Do", 20),
    (2, "In Progress", 10),
    (3, "Done", 8),
    (4, "Review", 5),
    (5, "Backlog", 12),
    (6, "QA", 6),
    (7, "Staging", 4),
    (8, "Deployed", 7),
    (9, "Blocked", 3),
    (10, "Archived", 2),
];

fn demo_task_id(column_number: usize, index: usize) -> String {
    // The first column numbers its tasks plainly; the others prefix the
    // column number ("task-201", "task-5012").
    if column_number == 1 {
        format!("task-{}", index)
    } else {
        format!("task-{}0{}", column_number, index)
    }
}

/// The built-in demo board.
pub fn demo_board() -> Board {
    let columns = DEMO_COLUMNS
        .iter()
        .map(|&(number, title, count)| {
            let tasks = (1..=count)
                .map(|i| Task::new(demo_task_id(number, i), format!("{} Task {}", title, i)))
                .collect();
            Column::new(format!("column-{}", number), title).with_tasks(tasks)
        })
        .collect();
    Board::from_columns(columns)
}

/// Drop columns and tasks that would break board invariants.
///
/// Empty ids are dropped; for duplicate ids the first occurrence in board
/// order wins. Returns the repaired columns and the number of entries dropped.
pub fn repair(columns: Vec<Column>) -> (Vec<Column>, usize) {
    let mut column_ids = HashSet::new();
    let mut task_ids = HashSet::new();
    let mut dropped = 0;
    let mut repaired = Vec::with_capacity(columns.len());

    for mut column in columns {
        if column.id.trim().is_empty() || !column_ids.insert(column.id.clone()) {
            warn!(column_id = %column.id, "Dropping seed column with empty or duplicate id");
            dropped += 1 + column.tasks.len();
            continue;
        }

        let before = column.tasks.len();
        column.tasks.retain(|task| {
            let keep = !task.id.trim().is_empty() && task_ids.insert(task.id.clone());
            if !keep {
                warn!(column_id = %column.id, task_id = %task.id, "Dropping seed task with empty or duplicate id");
            }
            keep
        });
        dropped += before - column.tasks.len();
        repaired.push(column);
    }

    (repaired, dropped)
}

/// Load and repair a seed file. YAML is accepted, and so is JSON.
pub fn load_seed<P: AsRef<Path>>(path: P) -> Result<Board> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let seed: SeedFile = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse seed file {}", path.display()))?;

    let (columns, dropped) = repair(seed.columns);
    if dropped > 0 {
        warn!(path = %path.display(), dropped, "Seed contained invalid entries");
    }
    Ok(Board::from_columns(columns))
}
