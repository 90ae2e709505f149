//! Output formatting for markdown and JSON.

use crate::intent::IntentOutcome;
use crate::types::{BoardStats, BoardView, ColumnSummary, ColumnView, Task};
use anyhow::Result;
use serde::Serialize;

/// Output format for driver results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    #[default]
    Markdown,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "markdown" | "md" => Some(OutputFormat::Markdown),
            _ => None,
        }
    }
}

/// Format the revealed part of the board as markdown.
pub fn format_board_markdown(view: &BoardView) -> String {
    let mut md = String::new();

    md.push_str(&format!(
        "# Board ({}/{} columns, {} tasks)\n\n",
        view.columns.len(),
        view.total_columns,
        view.stats.total_tasks
    ));

    for column in &view.columns {
        md.push_str(&format_column_markdown(column));
    }

    if view.loading_columns {
        md.push_str("_Loading more columns..._\n\n");
    } else if view.columns.len() < view.total_columns {
        md.push_str(&format!(
            "_{} more columns not yet revealed_\n\n",
            view.total_columns - view.columns.len()
        ));
    }

    md.push_str(&format_stats_markdown(&view.stats));
    md
}

fn format_column_markdown(column: &ColumnView) -> String {
    let mut md = String::new();

    md.push_str(&format!("## {} ({})\n", column.title, column.total_tasks));
    md.push_str(&format!("- **id**: `{}`\n", column.id));
    if let Some(ref color) = column.color {
        md.push_str(&format!("- **color**: {}\n", color));
    }
    md.push('\n');

    if column.tasks.is_empty() && column.total_tasks == 0 {
        md.push_str("_No tasks_\n");
    }
    for task in &column.tasks {
        md.push_str(&format_task_short(task));
    }

    let hidden = column.total_tasks.saturating_sub(column.tasks.len());
    if column.loading {
        md.push_str("- _loading..._\n");
    } else if hidden > 0 {
        md.push_str(&format!("- _{} more_\n", hidden));
    }

    md.push('\n');
    md
}

/// Format a task in short form for lists.
fn format_task_short(task: &Task) -> String {
    let short_id: String = task.id.chars().take(8).collect();
    format!("- {} `{}`\n", task.title, short_id)
}

fn format_summary(summary: &Option<ColumnSummary>) -> String {
    match summary {
        Some(s) => format!("{} ({})", s.title, s.task_count),
        None => "-".to_string(),
    }
}

/// Format board statistics as markdown.
pub fn format_stats_markdown(stats: &BoardStats) -> String {
    let mut md = String::new();

    md.push_str("## Stats\n");
    md.push_str(&format!("- **columns**: {}\n", stats.total_columns));
    md.push_str(&format!("- **tasks**: {}\n", stats.total_tasks));
    md.push_str(&format!("- **busiest**: {}\n", format_summary(&stats.busiest)));
    md.push_str(&format!("- **quietest**: {}\n", format_summary(&stats.quietest)));

    md
}

/// One line per replayed intent.
pub fn format_outcome_markdown(index: usize, intent: &str, outcome: &IntentOutcome) -> String {
    let detail = match outcome {
        IntentOutcome::ColumnAdded { column_id } => format!("added column `{}`", column_id),
        IntentOutcome::ColumnRemoved { column_id } => format!("removed column `{}`", column_id),
        IntentOutcome::TaskAdded { task_id } => format!("added task `{}`", task_id),
        IntentOutcome::TaskDeleted { task_id } => format!("deleted task `{}`", task_id),
        IntentOutcome::PickedUp { .. } => "picked up".to_string(),
        IntentOutcome::Moved {
            task_id,
            to_column_id,
        } => format!("moved `{}` to `{}`", task_id, to_column_id),
        IntentOutcome::RevealRequested { loaders } => format!("{} loader(s) loading", loaders),
        IntentOutcome::Ignored => "ignored".to_string(),
    };
    format!("{}. **{}**: {}\n", index + 1, intent, detail)
}

/// Serialize any result as pretty JSON.
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
