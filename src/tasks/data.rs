use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

use std::collections::HashMap;

use crate::auth::data::{UserID, UserSummary};
use crate::boards::data::BoardID;
use crate::colors::data::{Color, ColorID};

pub type TaskID = i64;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Priority> {
        match value {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl ToSql for Priority {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Priority {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Priority::parse(value.as_str()?).ok_or(FromSqlError::InvalidType)
    }
}

/// A color reference is either a bare id or the populated palette entry.
/// The data-access layer resolves references before they leave the server,
/// so handlers only ever see the `Resolved` shape; `Id` survives only for
/// dangling references.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum ColorRef {
    Id(ColorID),
    Resolved(Color),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum OwnerRef {
    Id(UserID),
    Resolved(UserSummary),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub text: String,
    pub completed: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
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

pub type ChecklistNum = i64;
pub type ChecklistMap = HashMap<TaskID, Vec<(ChecklistItem, ChecklistNum)>>;

#[derive(Deserialize, Debug)]
pub struct CreateTaskRequest {
    pub board_id: BoardID,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<Priority>,
    pub color_id: Option<ColorID>,
}

#[derive(Serialize, Debug)]
pub struct AddTaskResult {
    pub task_id: TaskID,
}

#[derive(Deserialize, Debug)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub color_id: Option<ColorID>,
    pub checklist: Option<Vec<ChecklistItem>>,
}

#[derive(Deserialize, Debug)]
pub struct MoveTaskRequest {
    pub status: String,
    pub order: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OrderUpdate {
    pub id: TaskID,
    pub order: i64,
}

#[derive(Deserialize, Debug)]
pub struct UpdateOrdersRequest {
    pub updates: Vec<OrderUpdate>,
}

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}
