//! The pure half of the move protocol: turning a drop gesture into a plan.
//!
//! A plan is computed against a snapshot and carries everything needed to
//! apply it optimistically and to undo it, so the effectful layer never has
//! to look back at the pre-move state.

use super::state::{BoardSnapshot, OrderUpdate, Task, TaskID};

#[derive(Debug, Clone, PartialEq)]
pub enum MovePlan {
    /// The task changes column: append it to the target column and remember
    /// where it came from for rollback.
    CrossColumn {
        task_id: TaskID,
        from_status: String,
        from_order: i64,
        to_status: String,
        to_order: i64,
    },
    /// The task stays in its column: the whole column gets contiguous
    /// orders recomputed from the new arrangement.
    Reorder {
        status: String,
        updates: Vec<OrderUpdate>,
    },
    /// Nothing to do; the drop target did not resolve to a change.
    NoOp,
}

/// End-of-column position: max order + 1, or 0 for an empty column.
fn append_order(snapshot: &BoardSnapshot, status: &str) -> i64 {
    snapshot
        .column_tasks(status)
        .last()
        .map(|task| task.order + 1)
        .unwrap_or(0)
}

/// Resolves a drop gesture. `over` is whatever the drag landed on: a column
/// id, another task's id, or nothing at all. Column ids win over task ids.
pub fn plan_drop(snapshot: &BoardSnapshot, active_task_id: TaskID, over: Option<&str>) -> MovePlan {
    let over = match over {
        Some(over) => over,
        None => return MovePlan::NoOp,
    };

    let active = match snapshot.task(active_task_id) {
        Some(task) => task,
        None => return MovePlan::NoOp,
    };

    let (target_status, target_task) = if snapshot.column(over).is_some() {
        (over.to_string(), None)
    } else {
        match over
            .parse::<TaskID>()
            .ok()
            .and_then(|id| snapshot.task(id))
        {
            Some(task) => (task.status.clone(), Some(task.id)),
            None => return MovePlan::NoOp,
        }
    };

    if target_status != active.status {
        return MovePlan::CrossColumn {
            task_id: active_task_id,
            from_status: active.status.clone(),
            from_order: active.order,
            to_status: target_status.clone(),
            to_order: append_order(snapshot, &target_status),
        };
    }

    let target_task_id = match target_task {
        Some(id) if id != active_task_id => id,
        _ => return MovePlan::NoOp,
    };

    plan_reorder(snapshot, active_task_id, target_task_id)
}

/// Stable array-move within a column: remove the active task from its index,
/// reinsert at the target task's index, then hand out orders 0..N-1.
fn plan_reorder(snapshot: &BoardSnapshot, active_task_id: TaskID, target_task_id: TaskID) -> MovePlan {
    let status = match snapshot.task(active_task_id) {
        Some(task) => task.status.clone(),
        None => return MovePlan::NoOp,
    };

    let mut ids: Vec<TaskID> = snapshot
        .column_tasks(&status)
        .iter()
        .map(|task| task.id)
        .collect();

    let from_index = ids.iter().position(|id| *id == active_task_id);
    let to_index = ids.iter().position(|id| *id == target_task_id);

    let (from_index, to_index) = match (from_index, to_index) {
        (Some(from), Some(to)) if from != to => (from, to),
        _ => return MovePlan::NoOp,
    };

    let moved = ids.remove(from_index);
    ids.insert(to_index, moved);

    MovePlan::Reorder {
        status,
        updates: ids
            .iter()
            .enumerate()
            .map(|(index, id)| OrderUpdate {
                id: *id,
                order: index as i64,
            })
            .collect(),
    }
}

/// Non-empty checklist with every item ticked.
pub fn checklist_complete(task: &Task) -> bool {
    !task.checklist.is_empty() && task.checklist.iter().all(|item| item.completed)
}

/// The auto-completion heuristic: a fully checked-off task is moved into
/// the board's highest-order column, appended at the end. Purely a client
/// convention; the server never does this on its own.
pub fn plan_auto_complete(snapshot: &BoardSnapshot, task_id: TaskID) -> MovePlan {
    let task = match snapshot.task(task_id) {
        Some(task) => task,
        None => return MovePlan::NoOp,
    };

    if !checklist_complete(task) {
        return MovePlan::NoOp;
    }

    let done = match snapshot.highest_column() {
        Some(column) => column,
        None => return MovePlan::NoOp,
    };

    if task.status == done.id {
        return MovePlan::NoOp;
    }

    MovePlan::CrossColumn {
        task_id,
        from_status: task.status.clone(),
        from_order: task.order,
        to_status: done.id.clone(),
        to_order: append_order(snapshot, &done.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::state::ChecklistItem;
    use crate::board::testing::{snapshot_with, task_in};

    #[test]
    fn drop_on_empty_column_appends_at_zero() {
        let snapshot = snapshot_with(vec![
            task_in(1, "backlog", 0),
            task_in(2, "backlog", 1),
        ]);

        let plan = plan_drop(&snapshot, 1, Some("done"));
        assert_eq!(
            plan,
            MovePlan::CrossColumn {
                task_id: 1,
                from_status: "backlog".to_string(),
                from_order: 0,
                to_status: "done".to_string(),
                to_order: 0,
            }
        );
    }

    #[test]
    fn drop_on_occupied_column_appends_after_max() {
        let snapshot = snapshot_with(vec![
            task_in(1, "backlog", 0),
            task_in(2, "done", 0),
            task_in(3, "done", 4),
        ]);

        let plan = plan_drop(&snapshot, 1, Some("done"));
        match plan {
            MovePlan::CrossColumn { to_order, .. } => assert_eq!(to_order, 5),
            other => panic!("expected cross-column plan, got {:?}", other),
        }
    }

    #[test]
    fn drop_on_task_in_another_column_targets_that_column() {
        let snapshot = snapshot_with(vec![
            task_in(1, "backlog", 0),
            task_in(2, "in-progress", 0),
        ]);

        let plan = plan_drop(&snapshot, 1, Some("2"));
        match plan {
            MovePlan::CrossColumn {
                to_status, to_order, ..
            } => {
                assert_eq!(to_status, "in-progress");
                assert_eq!(to_order, 1);
            }
            other => panic!("expected cross-column plan, got {:?}", other),
        }
    }

    #[test]
    fn same_column_reorder_recomputes_contiguously() {
        // A(0), B(1), C(2); dragging A onto C ends with B=0, C=1, A=2.
        let snapshot = snapshot_with(vec![
            task_in(1, "backlog", 0),
            task_in(2, "backlog", 1),
            task_in(3, "backlog", 2),
        ]);

        let plan = plan_drop(&snapshot, 1, Some("3"));
        assert_eq!(
            plan,
            MovePlan::Reorder {
                status: "backlog".to_string(),
                updates: vec![
                    OrderUpdate { id: 2, order: 0 },
                    OrderUpdate { id: 3, order: 1 },
                    OrderUpdate { id: 1, order: 2 },
                ],
            }
        );
    }

    #[test]
    fn reorder_handles_gapped_orders() {
        // Orders need not be contiguous before a reorder; the plan makes
        // them contiguous after.
        let snapshot = snapshot_with(vec![
            task_in(1, "backlog", 3),
            task_in(2, "backlog", 7),
            task_in(3, "backlog", 20),
        ]);

        let plan = plan_drop(&snapshot, 3, Some("1"));
        assert_eq!(
            plan,
            MovePlan::Reorder {
                status: "backlog".to_string(),
                updates: vec![
                    OrderUpdate { id: 3, order: 0 },
                    OrderUpdate { id: 1, order: 1 },
                    OrderUpdate { id: 2, order: 2 },
                ],
            }
        );
    }

    #[test]
    fn unresolvable_drops_are_noops() {
        let snapshot = snapshot_with(vec![task_in(1, "backlog", 0)]);

        assert_eq!(plan_drop(&snapshot, 1, None), MovePlan::NoOp);
        assert_eq!(plan_drop(&snapshot, 1, Some("no-such-column")), MovePlan::NoOp);
        assert_eq!(plan_drop(&snapshot, 1, Some("1")), MovePlan::NoOp);
        assert_eq!(plan_drop(&snapshot, 1, Some("backlog")), MovePlan::NoOp);
        assert_eq!(plan_drop(&snapshot, 99, Some("done")), MovePlan::NoOp);
    }

    #[test]
    fn completed_checklist_plans_a_move_to_the_last_column() {
        let mut task = task_in(1, "backlog", 0);
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
        let snapshot = snapshot_with(vec![task, task_in(2, "done", 0)]);

        let plan = plan_auto_complete(&snapshot, 1);
        assert_eq!(
            plan,
            MovePlan::CrossColumn {
                task_id: 1,
                from_status: "backlog".to_string(),
                from_order: 0,
                to_status: "done".to_string(),
                to_order: 1,
            }
        );
    }

    #[test]
    fn incomplete_or_empty_checklists_do_not_auto_move() {
        let mut partial = task_in(1, "backlog", 0);
        partial.checklist = vec![
            ChecklistItem {
                text: "a".to_string(),
                completed: true,
            },
            ChecklistItem {
                text: "b".to_string(),
                completed: false,
            },
        ];
        let empty = task_in(2, "backlog", 1);

        let mut already_done = task_in(3, "done", 0);
        already_done.checklist = vec![ChecklistItem {
            text: "a".to_string(),
            completed: true,
        }];

        let snapshot = snapshot_with(vec![partial, empty, already_done]);

        assert_eq!(plan_auto_complete(&snapshot, 1), MovePlan::NoOp);
        assert_eq!(plan_auto_complete(&snapshot, 2), MovePlan::NoOp);
        assert_eq!(plan_auto_complete(&snapshot, 3), MovePlan::NoOp);
    }
}
