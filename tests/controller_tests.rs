//! Integration tests for the board controller.
//!
//! Timer-driven tests run on a paused tokio clock, so batch delays elapse
//! instantly and deterministically.

use kanban_board::board::seed::demo_board;
use kanban_board::config::BoardConfig;
use kanban_board::controller::BoardController;
use kanban_board::intent::{Intent, IntentOutcome, IntentRequest};
use kanban_board::loader::LoaderPhase;
use kanban_board::scheduler::LoaderTarget;
use kanban_board::types::{Board, Column, InsertEdge, Task};
use kanban_board::viewport::ScrollMetrics;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Helper to build a controller over the demo board with default settings.
fn setup_demo() -> BoardController {
    BoardController::new(demo_board(), BoardConfig::default())
}

/// To Do holds t1..t20, Done holds `done` tasks.
fn setup_small(done: usize) -> BoardController {
    let todo = (1..=20).map(|i| Task::new(format!("t{}", i), format!("Task {}", i))).collect();
    let done = (1..=done).map(|i| Task::new(format!("d{}", i), format!("Done {}", i))).collect();
    let board = Board::from_columns(vec![
        Column::new("todo", "To Do").with_tasks(todo),
        Column::new("done", "Done").with_tasks(done),
    ]);
    BoardController::new(board, BoardConfig::default())
}

fn ids(controller: &BoardController, column_id: &str) -> Vec<String> {
    controller
        .snapshot()
        .column(column_id)
        .map(|c| c.tasks.iter().map(|t| t.id.clone()).collect())
        .unwrap_or_default()
}

fn near_end() -> ScrollMetrics {
    ScrollMetrics::new(900.0, 800.0, 1700.0)
}

fn far_from_end() -> ScrollMetrics {
    ScrollMetrics::new(0.0, 800.0, 5000.0)
}

mod mutation_tests {
    use super::*;

    #[test]
    fn move_first_task_to_done() {
        let mut controller = setup_small(0);
        let t1 = Task::new("t1", "Task 1");

        assert!(controller.move_task("todo", "done", &t1));

        let todo = ids(&controller, "todo");
        assert_eq!(todo.len(), 19);
        assert_eq!(todo.first().map(String::as_str), Some("t2"));
        assert_eq!(todo.last().map(String::as_str), Some("t20"));
        assert_eq!(ids(&controller, "done"), vec!["t1"]);
        assert_eq!(controller.snapshot().task_count(), 20);
    }

    #[test]
    fn move_onto_same_column_leaves_board_identical() {
        let mut controller = setup_small(2);
        let before = controller.snapshot();

        assert!(!controller.move_task("todo", "todo", &Task::new("t3", "Task 3")));

        assert_eq!(*controller.snapshot(), *before);
    }

    #[test]
    fn remove_column_drops_its_tasks() {
        let mut controller = setup_small(3);
        let total = controller.snapshot().task_count();

        assert!(controller.remove_column("done"));

        let board = controller.snapshot();
        assert_eq!(board.task_count(), total - 3);
        for id in ["d1", "d2", "d3"] {
            assert!(!board.contains_task(id));
        }
        assert!(board.column("done").is_none());
        assert!(controller.task_loader("done").is_none());
    }

    #[test]
    fn removing_unknown_column_is_noop() {
        let mut controller = setup_small(0);
        let before = controller.snapshot();

        assert!(!controller.remove_column("nope"));
        assert!(!controller.remove_column("  "));

        assert_eq!(*controller.snapshot(), *before);
    }

    #[test]
    fn add_task_trims_and_rejects_empty_titles() {
        let mut controller = setup_small(0);

        let id = controller.add_task("done", "  Ship it  ").unwrap();
        assert!(controller.add_task("done", "   ").is_none());
        assert!(controller.add_task("missing", "Orphan").is_none());

        let board = controller.snapshot();
        let (column, task) = board.find_task(&id).unwrap();
        assert_eq!(column.id, "done");
        assert_eq!(task.title, "Ship it");
        assert_eq!(board.task_count(), 21);
    }

    #[test]
    fn add_task_honors_configured_edge() {
        let mut config = BoardConfig::default();
        config.insertion.task_edge = InsertEdge::Start;
        let mut controller = BoardController::new(demo_board(), config);

        let id = controller.add_task("column-1", "Urgent").unwrap();

        assert_eq!(ids(&controller, "column-1")[0], id);
    }

    #[test]
    fn blank_column_title_gets_a_default() {
        let mut controller = setup_demo();

        let id = controller.add_column("");

        let board = controller.snapshot();
        let column = board.column(&id).unwrap();
        assert_eq!(column.title, "Column 11");
        assert!(column.tasks.is_empty());
        assert_eq!(board.column_ids().last(), Some(&id));
    }

    #[test]
    fn generated_ids_are_unique() {
        let mut controller = setup_small(0);
        let a = controller.add_task("todo", "A").unwrap();
        let b = controller.add_task("todo", "B").unwrap();
        let c = controller.add_column("Later");

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert!(controller.snapshot().check_invariants().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_ids_are_repaired_on_construction() {
        let long = (1..=20).map(|i| Task::new(format!("a{}", i), format!("Task {}", i))).collect();
        let board = Board::from_columns(vec![
            Column::new("a", "Long").with_tasks(long),
            Column::new("a", "Shadow").with_tasks(vec![Task::new("s1", "Shadow task")]),
            Column::new("b", "Other").with_tasks(vec![Task::new("a1", "Duplicate task")]),
        ]);
        assert!(!board.check_invariants().is_empty());

        let mut controller = BoardController::new(board, BoardConfig::default());

        let snapshot = controller.snapshot();
        assert!(snapshot.check_invariants().is_empty());
        assert_eq!(snapshot.column_ids(), vec!["a", "b"]);
        assert_eq!(snapshot.column("a").unwrap().title, "Long");
        assert!(snapshot.column("b").unwrap().tasks.is_empty());
        assert!(!snapshot.contains_task("s1"));

        // The surviving column keeps a loader of its own and can drain.
        assert!(controller.remove_column("b"));
        assert!(controller.signal_tasks("a"));
        controller.settle().await;
        assert_eq!(controller.view().columns[0].tasks.len(), 20);
    }

    #[test]
    fn delete_task_removes_exactly_one() {
        let mut controller = setup_small(0);

        assert!(controller.delete_task("todo", "t5"));
        assert!(!controller.delete_task("todo", "t5"));
        assert!(!controller.delete_task("done", "t6"));

        assert_eq!(controller.snapshot().task_count(), 19);
        assert!(!controller.snapshot().contains_task("t5"));
    }

    #[test]
    fn old_snapshots_are_unaffected_by_mutation() {
        let mut controller = setup_demo();
        let reader = controller.reader();
        let before = reader.load();

        assert!(controller.delete_task("column-1", "task-1"));

        let after = reader.load();
        assert!(before.contains_task("task-1"));
        assert!(!after.contains_task("task-1"));
        // Untouched columns are shared between snapshots.
        assert!(after.shares_column(&before, "column-2"));
        assert!(!after.shares_column(&before, "column-1"));
    }

    #[test]
    fn mutations_bump_the_revision() {
        let mut controller = setup_small(0);
        let rx = controller.subscribe();
        let start = *rx.borrow();

        controller.add_task("todo", "New");
        controller.delete_task("todo", "does-not-exist");

        assert_eq!(*rx.borrow(), start + 1);
    }
}

mod transfer_tests {
    use super::*;

    #[test]
    fn drag_and_drop_moves_task() {
        let mut controller = setup_demo();

        let payload = controller.drag_start("column-1", "task-1").unwrap();
        let moved = controller.drop_payload(Some(payload.as_str()), "column-3");

        assert_eq!(moved.as_deref(), Some("task-1"));
        assert_eq!(ids(&controller, "column-3").last().map(String::as_str), Some("task-1"));
        assert!(!ids(&controller, "column-1").contains(&"task-1".to_string()));
    }

    #[test]
    fn stale_payload_never_copies() {
        let mut controller = setup_demo();
        let total = controller.snapshot().task_count();

        let payload = controller.drag_start("column-1", "task-1").unwrap();
        assert!(controller.delete_task("column-1", "task-1"));
        let before = controller.snapshot();

        assert!(controller.drop_payload(Some(payload.as_str()), "column-3").is_none());

        assert_eq!(*controller.snapshot(), *before);
        assert_eq!(controller.snapshot().task_count(), total - 1);
        assert!(!controller.snapshot().contains_task("task-1"));
    }

    #[test]
    fn payload_replayed_twice_moves_once() {
        let mut controller = setup_demo();

        let payload = controller.drag_start("column-1", "task-2").unwrap();
        assert!(controller.drop_payload(Some(payload.as_str()), "column-2").is_some());
        assert!(controller.drop_payload(Some(payload.as_str()), "column-4").is_none());

        let board = controller.snapshot();
        let (column, _) = board.find_task("task-2").unwrap();
        assert_eq!(column.id, "column-2");
        assert!(board.check_invariants().is_empty());
    }

    #[test]
    fn bad_payloads_are_ignored() {
        let mut controller = setup_demo();
        let before = controller.snapshot();

        assert!(controller.drop_payload(None, "column-3").is_none());
        assert!(controller.drop_payload(Some("not json"), "column-3").is_none());
        assert!(
            controller
                .drop_payload(Some(r#"{"task":{"id":"task-1"},"fromColumnId":"column-1"}"#), "column-3")
                .is_none()
        );
        assert!(
            controller
                .drop_payload(Some(r#"{"task":{"id":"task-1","title":"x"},"fromColumnId":"column-9"}"#), "column-3")
                .is_none()
        );

        assert_eq!(*controller.snapshot(), *before);
    }

    #[test]
    fn drop_onto_source_column_is_noop() {
        let mut controller = setup_demo();
        let before = controller.snapshot();

        let payload = controller.drag_start("column-2", "task-201").unwrap();
        assert!(controller.drop_payload(Some(payload.as_str()), "column-2").is_none());

        assert_eq!(*controller.snapshot(), *before);
    }

    #[test]
    fn drag_start_of_unknown_task_yields_nothing() {
        let controller = setup_demo();
        assert!(controller.drag_start("column-1", "task-999").is_none());
        assert!(controller.drag_start("column-2", "task-1").is_none());
    }
}

mod reveal_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn task_batch_reveals_after_delay() {
        let mut controller = setup_demo();
        assert_eq!(controller.task_loader("column-1").unwrap().revealed_len(), 15);

        assert!(controller.signal_tasks("column-1"));
        assert_eq!(controller.task_loader("column-1").unwrap().phase(), LoaderPhase::Loading);
        assert!(controller.task_loader("column-1").unwrap().has_pending_timer());

        // Nothing arrives before the delay has elapsed.
        assert!(timeout(Duration::from_millis(650), controller.next_batch()).await.is_err());
        assert_eq!(controller.task_loader("column-1").unwrap().revealed_len(), 15);

        let target = controller.next_batch().await;
        assert_eq!(target, Some(LoaderTarget::Tasks("column-1".into())));

        let loader = controller.task_loader("column-1").unwrap();
        assert_eq!(loader.revealed_len(), 20);
        assert_eq!(loader.phase(), LoaderPhase::Drained);
        assert!(!controller.signal_tasks("column-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_signals_yield_one_batch() {
        let mut controller = setup_demo();

        assert!(controller.signal_columns());
        assert!(!controller.signal_columns());
        assert!(!controller.on_board_scroll(near_end()));

        controller.settle().await;

        assert_eq!(controller.column_loader().revealed_len(), 8);
        assert!(timeout(Duration::from_secs(5), controller.next_batch()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn columns_reveal_monotonically_until_drained() {
        let mut controller = setup_demo();
        let mut seen = vec![controller.view().columns.len()];

        while controller.on_board_scroll(near_end()) {
            controller.settle().await;
            seen.push(controller.view().columns.len());
        }

        assert_eq!(seen, vec![4, 8, 10]);
        assert_eq!(controller.column_loader().phase(), LoaderPhase::Drained);
    }

    #[tokio::test(start_paused = true)]
    async fn scroll_far_from_end_does_nothing() {
        let mut controller = setup_demo();

        assert!(!controller.on_board_scroll(far_from_end()));
        assert_eq!(controller.on_page_scroll(far_from_end()), 0);
        assert!(!controller.has_pending_batches());
    }

    #[tokio::test(start_paused = true)]
    async fn page_scroll_signals_revealed_columns_only() {
        let mut config = BoardConfig::default();
        config.tasks.batch_size = 3;
        let mut controller = BoardController::new(demo_board(), config);

        // Columns 1-4 are revealed; all hold more than three tasks.
        assert_eq!(controller.on_page_scroll(near_end()), 4);
        assert!(!controller.task_loader("column-5").unwrap().is_loading());

        controller.settle().await;

        let view = controller.view();
        assert!(view.columns.iter().all(|c| c.tasks.len() == 6usize.min(c.total_tasks)));
        assert_eq!(controller.task_loader("column-5").unwrap().revealed_len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn removing_column_cancels_its_pending_batch() {
        let mut controller = setup_demo();

        assert!(controller.signal_tasks("column-1"));
        assert!(controller.remove_column("column-1"));
        assert!(!controller.has_pending_batches());

        // The timer was aborted: nothing is delivered, even long after.
        assert!(timeout(Duration::from_secs(5), controller.next_batch()).await.is_err());
        assert!(controller.snapshot().column("column-1").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn list_change_resets_task_loader() {
        let mut controller = setup_demo();
        assert!(controller.signal_tasks("column-1"));
        controller.settle().await;
        assert_eq!(controller.task_loader("column-1").unwrap().revealed_len(), 20);

        controller.add_task("column-1", "One more");

        let loader = controller.task_loader("column-1").unwrap();
        assert_eq!(loader.source_len(), 21);
        assert_eq!(loader.revealed_len(), 15);
    }

    #[tokio::test(start_paused = true)]
    async fn mutation_during_load_discards_the_batch() {
        let mut controller = setup_demo();
        assert!(controller.signal_tasks("column-1"));

        controller.delete_task("column-1", "task-20");

        let loader = controller.task_loader("column-1").unwrap();
        assert!(!loader.is_loading());
        assert_eq!(loader.revealed_len(), 15);
        controller.settle().await;
        assert_eq!(controller.task_loader("column-1").unwrap().revealed_len(), 15);
    }

    #[tokio::test(start_paused = true)]
    async fn column_add_resets_column_loader() {
        let mut controller = setup_demo();
        assert!(controller.signal_columns());

        let id = controller.add_column("Icebox");

        assert!(!controller.column_loader().is_loading());
        assert_eq!(controller.column_loader().source_len(), 11);
        assert_eq!(controller.task_loader(&id).unwrap().phase(), LoaderPhase::Drained);
    }

    #[tokio::test(start_paused = true)]
    async fn view_reports_loading_state() {
        let mut controller = setup_demo();
        controller.signal_tasks("column-1");
        controller.signal_columns();

        let view = controller.view();
        assert!(view.loading_columns);
        assert!(view.columns[0].loading);
        assert_eq!(view.columns[0].tasks.len(), 15);
        assert_eq!(view.columns[0].total_tasks, 20);
        assert_eq!(view.stats.total_tasks, 77);
    }
}

mod dispatch_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn dispatch_maps_outcomes() {
        let mut controller = setup_small(0);

        let outcome = controller.dispatch(Intent::AddTask {
            column_id: "todo".into(),
            title: "".into(),
        });
        assert!(outcome.is_ignored());

        let outcome = controller.dispatch(Intent::DeleteTask {
            column_id: "todo".into(),
            task_id: "t1".into(),
        });
        assert_eq!(outcome, IntentOutcome::TaskDeleted { task_id: "t1".into() });

        let outcome = controller.dispatch(Intent::ScrollPage { metrics: near_end() });
        assert_eq!(outcome, IntentOutcome::RevealRequested { loaders: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_serves_requests_and_batches() {
        let controller = setup_demo();
        let reader = controller.reader();
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(controller.run(rx));

        let (request, reply) = IntentRequest::with_reply(Intent::DragStart {
            column_id: "column-1".into(),
            task_id: "task-3".into(),
        });
        tx.send(request).await.unwrap();
        let payload = match reply.await.unwrap() {
            IntentOutcome::PickedUp { payload } => payload,
            other => panic!("unexpected outcome: {:?}", other),
        };

        let (request, reply) = IntentRequest::with_reply(Intent::Drop {
            payload: Some(payload),
            to_column_id: "column-10".into(),
        });
        tx.send(request).await.unwrap();
        assert!(matches!(reply.await.unwrap(), IntentOutcome::Moved { .. }));
        assert!(reader.load().column("column-10").unwrap().contains("task-3"));

        tx.send(Intent::ScrollBoard { metrics: near_end() }.into()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        drop(tx);
        let controller = handle.await.unwrap();
        assert_eq!(controller.column_loader().revealed_len(), 8);
    }
}
