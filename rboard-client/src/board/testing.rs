//! Shared fixtures for the board tests.

use super::state::*;

pub const TEST_BOARD: BoardID = 7;

pub fn task_in(id: TaskID, status: &str, order: i64) -> Task {
    Task {
        id,
        board_id: TEST_BOARD,
        title: format!("task {}", id),
        description: String::new(),
        status: status.to_string(),
        priority: Priority::Medium,
        color: None,
        owner: OwnerRef::Id(1),
        checklist: vec![],
        order,
        created_at: "2024-01-01T00:00:00Z".to_string(),
    }
}

pub fn columns() -> Vec<Column> {
    ["backlog", "up-next", "in-progress", "done"]
        .iter()
        .enumerate()
        .map(|(order, id)| Column {
            id: id.to_string(),
            title: id.to_string(),
            color: "#888888".to_string(),
            order: order as i64,
        })
        .collect()
}

pub fn snapshot_with(tasks: Vec<Task>) -> BoardSnapshot {
    BoardSnapshot::new(TEST_BOARD, columns(), tasks)
}
