//! The effectful half of the move protocol.
//!
//! The optimistic update always lands in the cache before the network call
//! goes out; the call itself is awaited and its failure is absorbed here,
//! never propagated as a panic or a blocking error. A failed single move is
//! undone locally from the plan's rollback data. A failed bulk reorder
//! cannot be undone locally (the server may hold a partially applied batch),
//! so the board's tasks are refetched wholesale and the snapshot replaced.

use log::warn;

use crate::api::BoardApi;
use crate::error::ClientResult;

use super::moves::{plan_auto_complete, plan_drop, MovePlan};
use super::state::{BoardCache, BoardID, BoardSnapshot, Task, TaskID};

/// How a drop was resolved, mostly for callers that want to surface state
/// changes; failures have already been reconciled by the time this returns.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Cross-column move confirmed by the server.
    Moved(Task),
    /// Same-column reorder confirmed by the server.
    Reordered,
    /// The move failed; the task snapped back to where it was.
    RolledBack,
    /// The reorder failed; local state was replaced by the server's.
    Refetched,
    /// The drop did not resolve to a change.
    Ignored,
}

pub struct DragController<A: BoardApi> {
    api: A,
    cache: BoardCache,
    active_task: Option<TaskID>,
}

impl<A: BoardApi> DragController<A> {
    pub fn new(api: A) -> DragController<A> {
        DragController {
            api,
            cache: BoardCache::new(),
            active_task: None,
        }
    }

    pub fn cache(&self) -> &BoardCache {
        &self.cache
    }

    pub fn snapshot(&self, board_id: BoardID) -> Option<&BoardSnapshot> {
        self.cache.snapshot(board_id)
    }

    pub fn insert_snapshot(&mut self, snapshot: BoardSnapshot) {
        self.cache.insert(snapshot);
    }

    /// Replaces a cached board's tasks with the server's authoritative list.
    pub async fn refresh_board(&mut self, board_id: BoardID) -> ClientResult<()> {
        let tasks = self.api.board_tasks(board_id).await?;
        self.cache
            .update(board_id, |snapshot| snapshot.with_tasks(tasks.clone()));
        Ok(())
    }

    pub fn begin_drag(&mut self, task_id: TaskID) {
        self.active_task = Some(task_id);
    }

    pub fn active_task(&self) -> Option<TaskID> {
        self.active_task
    }

    /// Finishes the drag gesture. The transient active-task state clears no
    /// matter how the drop resolves.
    pub async fn drop_on(
        &mut self,
        board_id: BoardID,
        over: Option<&str>,
    ) -> ClientResult<DropOutcome> {
        let active_task_id = match self.active_task.take() {
            Some(task_id) => task_id,
            None => return Ok(DropOutcome::Ignored),
        };

        let plan = match self.cache.snapshot(board_id) {
            Some(snapshot) => plan_drop(snapshot, active_task_id, over),
            None => return Ok(DropOutcome::Ignored),
        };

        self.execute(board_id, plan).await
    }

    /// Applies the checklist auto-completion convention: a task whose
    /// checklist just became fully checked moves to the board's last column.
    pub async fn sync_checklist_completion(
        &mut self,
        board_id: BoardID,
        task_id: TaskID,
    ) -> ClientResult<DropOutcome> {
        let plan = match self.cache.snapshot(board_id) {
            Some(snapshot) => plan_auto_complete(snapshot, task_id),
            None => return Ok(DropOutcome::Ignored),
        };

        self.execute(board_id, plan).await
    }

    async fn execute(&mut self, board_id: BoardID, plan: MovePlan) -> ClientResult<DropOutcome> {
        match plan {
            MovePlan::NoOp => Ok(DropOutcome::Ignored),
            MovePlan::CrossColumn {
                task_id,
                from_status,
                from_order,
                to_status,
                to_order,
            } => {
                self.cache.update(board_id, |snapshot| {
                    snapshot.with_task_moved(task_id, &to_status, to_order)
                });

                match self.api.move_task(task_id, &to_status, to_order).await {
                    Ok(task) => {
                        self.cache
                            .update(board_id, |snapshot| snapshot.with_task_replaced(task.clone()));
                        Ok(DropOutcome::Moved(task))
                    }
                    Err(e) => {
                        warn!("move of task {} failed, rolling back: {}", task_id, e);
                        self.cache.update(board_id, |snapshot| {
                            snapshot.with_task_moved(task_id, &from_status, from_order)
                        });
                        Ok(DropOutcome::RolledBack)
                    }
                }
            }
            MovePlan::Reorder { updates, .. } => {
                self.cache
                    .update(board_id, |snapshot| snapshot.with_orders(&updates));

                match self.api.update_orders(board_id, &updates).await {
                    Ok(()) => Ok(DropOutcome::Reordered),
                    Err(e) => {
                        warn!(
                            "bulk reorder on board {} failed, refetching: {}",
                            board_id, e
                        );
                        // The server may have applied part of the batch;
                        // only its view of the board is trustworthy now.
                        self.refresh_board(board_id).await?;
                        Ok(DropOutcome::Refetched)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::state::{ChecklistItem, OrderUpdate};
    use crate::board::testing::{snapshot_with, task_in, TEST_BOARD};
    use crate::error::ClientError;

    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, PartialEq)]
    enum Call {
        Move(TaskID, String, i64),
        Orders(BoardID, Vec<OrderUpdate>),
        Fetch(BoardID),
    }

    /// Scripted backend: records calls, optionally fails, and serves a
    /// canned authoritative task list for refetches.
    struct ScriptedApi {
        fail_moves: bool,
        fail_orders: bool,
        server_tasks: Vec<Task>,
        calls: Mutex<Vec<Call>>,
    }

    impl ScriptedApi {
        fn new() -> ScriptedApi {
            ScriptedApi {
                fail_moves: false,
                fail_orders: false,
                server_tasks: vec![],
                calls: Mutex::new(vec![]),
            }
        }

        fn failure() -> ClientError {
            ClientError::Api {
                status: 500,
                message: "scripted failure".to_string(),
            }
        }
    }

    #[async_trait]
    impl BoardApi for ScriptedApi {
        async fn move_task(&self, task_id: TaskID, status: &str, order: i64) -> ClientResult<Task> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Move(task_id, status.to_string(), order));

            if self.fail_moves {
                return Err(ScriptedApi::failure());
            }

            let mut task = task_in(task_id, status, order);
            task.title = format!("server copy {}", task_id);
            Ok(task)
        }

        async fn update_orders(
            &self,
            board_id: BoardID,
            updates: &[OrderUpdate],
        ) -> ClientResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Orders(board_id, updates.to_vec()));

            if self.fail_orders {
                return Err(ScriptedApi::failure());
            }
            Ok(())
        }

        async fn board_tasks(&self, board_id: BoardID) -> ClientResult<Vec<Task>> {
            self.calls.lock().unwrap().push(Call::Fetch(board_id));
            Ok(self.server_tasks.clone())
        }
    }

    fn controller_with(
        api: ScriptedApi,
        tasks: Vec<Task>,
    ) -> DragController<ScriptedApi> {
        let mut controller = DragController::new(api);
        controller.insert_snapshot(snapshot_with(tasks));
        controller
    }

    fn column_ids(controller: &DragController<ScriptedApi>, status: &str) -> Vec<TaskID> {
        controller
            .snapshot(TEST_BOARD)
            .unwrap()
            .column_tasks(status)
            .iter()
            .map(|task| task.id)
            .collect()
    }

    #[tokio::test]
    async fn cross_column_drop_persists_and_confirms() {
        let api = ScriptedApi::new();
        let mut controller = controller_with(
            api,
            vec![task_in(1, "backlog", 0), task_in(2, "backlog", 1)],
        );

        controller.begin_drag(1);
        let outcome = controller.drop_on(TEST_BOARD, Some("done")).await.unwrap();

        match outcome {
            DropOutcome::Moved(task) => {
                assert_eq!(task.status, "done");
                assert_eq!(task.order, 0);
            }
            other => panic!("expected a confirmed move, got {:?}", other),
        }

        let snapshot = controller.snapshot(TEST_BOARD).unwrap();
        let moved = snapshot.task(1).unwrap();
        assert_eq!(moved.status, "done");
        assert_eq!(moved.order, 0);
        // The server's copy replaced the optimistic one.
        assert_eq!(moved.title, "server copy 1");
        // The neighbour kept its order.
        assert_eq!(snapshot.task(2).unwrap().order, 1);

        let calls = controller.api.calls.lock().unwrap();
        assert_eq!(*calls, vec![Call::Move(1, "done".to_string(), 0)]);
    }

    #[tokio::test]
    async fn failed_move_rolls_back_to_the_previous_snapshot() {
        let mut api = ScriptedApi::new();
        api.fail_moves = true;

        let tasks = vec![task_in(1, "backlog", 0), task_in(2, "backlog", 1)];
        let mut controller = controller_with(api, tasks.clone());
        let before = controller.snapshot(TEST_BOARD).unwrap().clone();

        controller.begin_drag(1);
        let outcome = controller.drop_on(TEST_BOARD, Some("done")).await.unwrap();

        assert_eq!(outcome, DropOutcome::RolledBack);
        assert_eq!(controller.snapshot(TEST_BOARD).unwrap(), &before);
        assert_eq!(controller.active_task(), None);
    }

    #[tokio::test]
    async fn same_column_reorder_sends_the_whole_column() {
        let api = ScriptedApi::new();
        let mut controller = controller_with(
            api,
            vec![
                task_in(1, "backlog", 0),
                task_in(2, "backlog", 1),
                task_in(3, "backlog", 2),
                task_in(4, "done", 0),
            ],
        );

        controller.begin_drag(1);
        let outcome = controller.drop_on(TEST_BOARD, Some("3")).await.unwrap();

        assert_eq!(outcome, DropOutcome::Reordered);
        assert_eq!(column_ids(&controller, "backlog"), vec![2, 3, 1]);
        // Untouched column stays untouched.
        assert_eq!(column_ids(&controller, "done"), vec![4]);

        let calls = controller.api.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![Call::Orders(
                TEST_BOARD,
                vec![
                    OrderUpdate { id: 2, order: 0 },
                    OrderUpdate { id: 3, order: 1 },
                    OrderUpdate { id: 1, order: 2 },
                ]
            )]
        );
    }

    #[tokio::test]
    async fn failed_reorder_converges_on_the_server_state() {
        let mut api = ScriptedApi::new();
        api.fail_orders = true;
        // The server's authoritative answer disagrees with what the client
        // was trying to do; after recovery the client must hold it.
        api.server_tasks = vec![
            task_in(3, "backlog", 0),
            task_in(1, "backlog", 1),
            task_in(2, "backlog", 2),
        ];

        let mut controller = controller_with(
            api,
            vec![
                task_in(1, "backlog", 0),
                task_in(2, "backlog", 1),
                task_in(3, "backlog", 2),
            ],
        );

        controller.begin_drag(1);
        let outcome = controller.drop_on(TEST_BOARD, Some("3")).await.unwrap();

        assert_eq!(outcome, DropOutcome::Refetched);
        assert_eq!(column_ids(&controller, "backlog"), vec![3, 1, 2]);

        let calls = controller.api.calls.lock().unwrap();
        assert!(matches!(calls[0], Call::Orders(..)));
        assert_eq!(calls[1], Call::Fetch(TEST_BOARD));
    }

    #[tokio::test]
    async fn unresolved_drops_clear_the_active_task() {
        let api = ScriptedApi::new();
        let mut controller = controller_with(api, vec![task_in(1, "backlog", 0)]);

        controller.begin_drag(1);
        let outcome = controller.drop_on(TEST_BOARD, None).await.unwrap();
        assert_eq!(outcome, DropOutcome::Ignored);
        assert_eq!(controller.active_task(), None);

        // Dropping with no drag in progress is also a no-op.
        let outcome = controller.drop_on(TEST_BOARD, Some("done")).await.unwrap();
        assert_eq!(outcome, DropOutcome::Ignored);
        assert!(controller.api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn completed_checklist_auto_moves_to_the_last_column() {
        let api = ScriptedApi::new();

        let mut task = task_in(1, "in-progress", 0);
        task.checklist = vec![
            ChecklistItem {
                text: "a".to_string(),
                completed: true,
            },
            ChecklistItem {
                text: "b".to_string(),
                completed: true,
            },
        ];
        let mut controller = controller_with(api, vec![task, task_in(2, "done", 0)]);

        let outcome = controller
            .sync_checklist_completion(TEST_BOARD, 1)
            .await
            .unwrap();

        match outcome {
            DropOutcome::Moved(task) => assert_eq!(task.status, "done"),
            other => panic!("expected an auto move, got {:?}", other),
        }

        let calls = controller.api.calls.lock().unwrap();
        assert_eq!(*calls, vec![Call::Move(1, "done".to_string(), 1)]);
    }
}
