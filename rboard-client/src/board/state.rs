use serde::{Deserialize, Serialize};

use std::collections::HashMap;

pub type TaskID = i64;
pub type BoardID = i64;
pub type UserID = i64;
pub type ColorID = i64;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Color {
    pub id: ColorID,
    pub name: String,
    pub hex: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: UserID,
    pub username: String,
    pub avatar: Option<String>,
}

/// A reference that arrives over the wire either as a bare id or as the
/// populated object. Resolved once here, at the data boundary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ColorRef {
    Id(ColorID),
    Resolved(Color),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum OwnerRef {
    Id(UserID),
    Resolved(UserSummary),
}

impl OwnerRef {
    pub fn id(&self) -> UserID {
        match self {
            OwnerRef::Id(id) => *id,
            OwnerRef::Resolved(user) => user.id,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub text: String,
    pub completed: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskID,
    pub board_id: BoardID,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: Priority,
    pub color: Option<ColorRef>,
    pub owner: OwnerRef,
    pub checklist: Vec<ChecklistItem>,
    pub order: i64,
    pub created_at: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub id: String,
    pub title: String,
    pub color: String,
    pub order: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OrderUpdate {
    pub id: TaskID,
    pub order: i64,
}

/// One board's tasks and columns as the client last saw them. Snapshots are
/// immutable: every update returns a new value, and the cache swaps whole
/// snapshots, so a failed persistence call can drop back to the previous
/// one without partial mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub board_id: BoardID,
    pub columns: Vec<Column>,
    pub tasks: Vec<Task>,
}

impl BoardSnapshot {
    pub fn new(board_id: BoardID, columns: Vec<Column>, tasks: Vec<Task>) -> BoardSnapshot {
        BoardSnapshot {
            board_id,
            columns,
            tasks,
        }
    }

    pub fn task(&self, task_id: TaskID) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == column_id)
    }

    /// Tasks of one column, sorted by order ascending with the id breaking
    /// ties the way insertion sequence does on the server.
    pub fn column_tasks(&self, status: &str) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| task.status == status)
            .collect();
        tasks.sort_by_key(|task| (task.order, task.id));
        tasks
    }

    /// The "done by convention" column: the one with the highest order.
    pub fn highest_column(&self) -> Option<&Column> {
        self.columns.iter().max_by_key(|column| column.order)
    }

    pub fn with_task_moved(&self, task_id: TaskID, status: &str, order: i64) -> BoardSnapshot {
        let tasks = self
            .tasks
            .iter()
            .map(|task| {
                if task.id == task_id {
                    let mut moved = task.clone();
                    moved.status = status.to_string();
                    moved.order = order;
                    moved
                } else {
                    task.clone()
                }
            })
            .collect();

        BoardSnapshot {
            board_id: self.board_id,
            columns: self.columns.clone(),
            tasks,
        }
    }

    pub fn with_orders(&self, updates: &[OrderUpdate]) -> BoardSnapshot {
        let orders: HashMap<TaskID, i64> = updates
            .iter()
            .map(|update| (update.id, update.order))
            .collect();

        let tasks = self
            .tasks
            .iter()
            .map(|task| match orders.get(&task.id) {
                Some(order) => {
                    let mut updated = task.clone();
                    updated.order = *order;
                    updated
                }
                None => task.clone(),
            })
            .collect();

        BoardSnapshot {
            board_id: self.board_id,
            columns: self.columns.clone(),
            tasks,
        }
    }

    /// Replaces one task with the server's authoritative copy.
    pub fn with_task_replaced(&self, replacement: Task) -> BoardSnapshot {
        let tasks = self
            .tasks
            .iter()
            .map(|task| {
                if task.id == replacement.id {
                    replacement.clone()
                } else {
                    task.clone()
                }
            })
            .collect();

        BoardSnapshot {
            board_id: self.board_id,
            columns: self.columns.clone(),
            tasks,
        }
    }

    /// Replaces the whole task list, keeping the columns. This is the full
    /// reconciliation path after a failed bulk reorder.
    pub fn with_tasks(&self, tasks: Vec<Task>) -> BoardSnapshot {
        BoardSnapshot {
            board_id: self.board_id,
            columns: self.columns.clone(),
            tasks,
        }
    }
}

/// Client-side cache of board snapshots, keyed by board id.
#[derive(Debug, Default)]
pub struct BoardCache {
    boards: HashMap<BoardID, BoardSnapshot>,
}

impl BoardCache {
    pub fn new() -> BoardCache {
        BoardCache::default()
    }

    pub fn snapshot(&self, board_id: BoardID) -> Option<&BoardSnapshot> {
        self.boards.get(&board_id)
    }

    pub fn insert(&mut self, snapshot: BoardSnapshot) {
        self.boards.insert(snapshot.board_id, snapshot);
    }

    pub fn remove(&mut self, board_id: BoardID) {
        self.boards.remove(&board_id);
    }

    /// Applies a functional update to one board's snapshot, if cached.
    pub fn update(&mut self, board_id: BoardID, f: impl FnOnce(&BoardSnapshot) -> BoardSnapshot) {
        if let Some(snapshot) = self.boards.get(&board_id) {
            let updated = f(snapshot);
            self.boards.insert(board_id, updated);
        }
    }
}
