//! Intent script replay.
//!
//! A script is a YAML list of intents:
//!
//! ```yaml
//! - intent: drag_start
//!   column_id: column-1
//!   task_id: task-1
//! - intent: drop
//!   to_column_id: column-3
//! - intent: scroll_page
//!   metrics: { offset: 900, viewport: 800, content: 1700 }
//! ```
//!
//! A `drop` without a `payload` uses the payload of the drag in progress, as
//! a real gesture carries it. Without a successful `drag_start` since the
//! last drop it is a no-op.

use crate::controller::BoardController;
use crate::intent::{Intent, IntentOutcome};
use crate::types::BoardView;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize)]
pub struct ReplayStep {
    pub intent: &'static str,
    #[serde(flatten)]
    pub outcome: IntentOutcome,
}

/// Outcome of every step plus the settled view.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<ReplayStep>,
    pub view: BoardView,
}

impl ReplayReport {
    pub fn ignored(&self) -> usize {
        self.steps.iter().filter(|s| s.outcome.is_ignored()).count()
    }
}

pub fn parse_script(yaml: &str) -> Result<Vec<Intent>> {
    serde_yaml::from_str(yaml).context("Invalid intent script")
}

pub fn load_script<P: AsRef<Path>>(path: P) -> Result<Vec<Intent>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    parse_script(&contents).with_context(|| format!("In {}", path.display()))
}

/// Dispatch every intent in order, then wait for all pending batches.
pub async fn replay(controller: &mut BoardController, intents: Vec<Intent>) -> ReplayReport {
    let mut in_flight: Option<String> = None;
    let mut steps = Vec::with_capacity(intents.len());

    for intent in intents {
        let intent = match intent {
            Intent::Drop {
                payload,
                to_column_id,
            } => {
                // Every drop ends the gesture in progress.
                let in_flight = in_flight.take();
                Intent::Drop {
                    payload: payload.or(in_flight),
                    to_column_id,
                }
            }
            other => other,
        };
        let name = intent.name();
        let starts_drag = matches!(intent, Intent::DragStart { .. });
        let outcome = controller.dispatch(intent);
        if starts_drag {
            // A failed pick-up starts a gesture with nothing attached.
            in_flight = match &outcome {
                IntentOutcome::PickedUp { payload } => Some(payload.clone()),
                _ => None,
            };
        }
        debug!(step = steps.len(), intent = name, ?outcome, "Replayed intent");
        steps.push(ReplayStep {
            intent: name,
            outcome,
        });
    }

    controller.settle().await;
    let report = ReplayReport {
        steps,
        view: controller.view(),
    };
    info!(
        steps = report.steps.len(),
        ignored = report.ignored(),
        "Replay finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::seed::demo_board;
    use crate::config::BoardConfig;

    #[test]
    fn test_parse_script_rejects_unknown_intent() {
        let err = parse_script("- intent: rename_column\n  column_id: x\n").unwrap_err();
        assert!(err.to_string().contains("Invalid intent script"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_uses_in_flight_payload() {
        let mut controller = BoardController::new(demo_board(), BoardConfig::default());
        let script = parse_script(
            r#"
- intent: drag_start
  column_id: column-1
  task_id: task-1
- intent: drop
  to_column_id: column-3
- intent: drop
  to_column_id: column-2
"#,
        )
        .unwrap();

        let report = replay(&mut controller, script).await;
        assert!(matches!(report.steps[0].outcome, IntentOutcome::PickedUp { .. }));
        assert_eq!(
            report.steps[1].outcome,
            IntentOutcome::Moved {
                task_id: "task-1".into(),
                to_column_id: "column-3".into()
            }
        );
        // The payload was consumed by the first drop.
        assert!(report.steps[2].outcome.is_ignored());
        assert_eq!(report.ignored(), 1);
        assert!(controller.snapshot().column("column-3").unwrap().contains("task-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_drag_start_clears_in_flight_payload() {
        let mut controller = BoardController::new(demo_board(), BoardConfig::default());
        let script = parse_script(
            r#"
- intent: drag_start
  column_id: column-1
  task_id: task-1
- intent: drag_start
  column_id: column-1
  task_id: task-999
- intent: drop
  to_column_id: column-3
"#,
        )
        .unwrap();

        let report = replay(&mut controller, script).await;
        assert!(report.steps[1].outcome.is_ignored());
        assert!(report.steps[2].outcome.is_ignored());
        assert!(controller.snapshot().column("column-1").unwrap().contains("task-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_drop_ends_gesture() {
        let mut controller = BoardController::new(demo_board(), BoardConfig::default());
        let script = parse_script(
            r#"
- intent: drag_start
  column_id: column-1
  task_id: task-1
- intent: drop
  payload: '{"task":{"id":"task-2","title":"x"},"fromColumnId":"column-1"}'
  to_column_id: column-2
- intent: drop
  to_column_id: column-3
"#,
        )
        .unwrap();

        let report = replay(&mut controller, script).await;
        assert!(matches!(report.steps[1].outcome, IntentOutcome::Moved { .. }));
        assert!(report.steps[2].outcome.is_ignored());
        let board = controller.snapshot();
        assert!(board.column("column-2").unwrap().contains("task-2"));
        assert!(board.column("column-1").unwrap().contains("task-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_settles_reveals() {
        let mut controller = BoardController::new(demo_board(), BoardConfig::default());
        let script = parse_script(
            "- intent: scroll_board\n  metrics: { offset: 1000, viewport: 400, content: 1450 }\n",
        )
        .unwrap();

        let report = replay(&mut controller, script).await;
        assert_eq!(report.steps[0].outcome, IntentOutcome::RevealRequested { loaders: 1 });
        assert_eq!(report.view.columns.len(), 8);
        assert!(!report.view.loading_columns);
    }
}
