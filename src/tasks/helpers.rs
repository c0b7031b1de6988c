use chrono::offset::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::api_error::{ApiError, ApiResult};
use crate::auth::data::{UserID, UserSummary};
use crate::boards::data::BoardID;
use crate::colors::data::{Color, ColorID};

use super::data::*;

const TASK_COLUMNS: &str = "tasks.rowid, tasks.board_id, tasks.title, tasks.description, tasks.status, tasks.priority, tasks.ord, tasks.created_at, tasks.owner_id, users.username, users.avatar, tasks.color_id, colors.name, colors.hex";

/// Maps a joined task row into a `Task` with owner and color already
/// resolved. The checklist is attached separately.
fn get_task_from_row(row: &Row) -> rusqlite::Result<Task> {
    let owner = OwnerRef::Resolved(UserSummary {
        id: row.get(8)?,
        username: row.get(9)?,
        avatar: row.get(10)?,
    });

    let color_id: Option<ColorID> = row.get(11)?;
    let color = match color_id {
        Some(id) => {
            let name: Option<String> = row.get(12)?;
            let hex: Option<String> = row.get(13)?;
            match (name, hex) {
                (Some(name), Some(hex)) => Some(ColorRef::Resolved(Color { id, name, hex })),
                // Dangling reference: keep the id rather than inventing a color.
                _ => Some(ColorRef::Id(id)),
            }
        }
        None => None,
    };

    Ok(Task {
        id: row.get(0)?,
        board_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: row.get(4)?,
        priority: row.get(5)?,
        color,
        owner,
        checklist: vec![],
        order: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn get_board_checklists_from_db(
    board_id: BoardID,
    db_connection: &Connection,
) -> ApiResult<ChecklistMap> {
    let mut statement = db_connection.prepare(
        "SELECT checklist_items.task_id, checklist_items.text, checklist_items.completed, checklist_items.item_num FROM checklist_items JOIN tasks ON tasks.rowid = checklist_items.task_id WHERE tasks.board_id = (?1)",
    )?;

    let mut checklists = ChecklistMap::new();
    let rows = statement.query_map(params![board_id], |row| {
        Ok((
            row.get::<_, TaskID>(0)?,
            ChecklistItem {
                text: row.get(1)?,
                completed: row.get(2)?,
            },
            row.get::<_, ChecklistNum>(3)?,
        ))
    })?;

    for row_result in rows {
        let (task_id, item, num) = row_result?;
        checklists.entry(task_id).or_default().push((item, num));
    }

    Ok(checklists)
}

fn get_task_checklist_from_db(
    task_id: TaskID,
    db_connection: &Connection,
) -> ApiResult<Vec<ChecklistItem>> {
    let mut statement = db_connection.prepare(
        "SELECT text, completed, item_num FROM checklist_items WHERE task_id = (?1)",
    )?;

    let mut items = statement
        .query_map(params![task_id], |row| {
            Ok((
                ChecklistItem {
                    text: row.get(0)?,
                    completed: row.get(1)?,
                },
                row.get::<_, ChecklistNum>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<(ChecklistItem, ChecklistNum)>>>()?;

    items.sort_by_key(|(_, num)| *num);

    Ok(items.into_iter().map(|(item, _)| item).collect())
}

/// Replaces a task's checklist wholesale: delete everything, reinsert in
/// the given order.
pub fn set_task_checklist(
    task_id: TaskID,
    items: &[ChecklistItem],
    db_connection: &Connection,
) -> ApiResult<()> {
    db_connection.execute(
        "DELETE FROM checklist_items WHERE task_id = (?1)",
        params![task_id],
    )?;

    for (num, item) in items.iter().enumerate() {
        db_connection.execute(
            "INSERT INTO checklist_items (task_id, item_num, text, completed) VALUES (?1, ?2, ?3, ?4)",
            params![task_id, num as ChecklistNum, item.text, item.completed],
        )?;
    }

    Ok(())
}

/// All tasks for a board, column-major: sorted by status, then order, with
/// the insertion sequence breaking ties.
pub fn get_board_tasks_from_db(
    board_id: BoardID,
    db_connection: &Connection,
) -> ApiResult<Vec<Task>> {
    let query = format!(
        "SELECT {} FROM tasks JOIN users ON users.rowid = tasks.owner_id LEFT JOIN colors ON colors.rowid = tasks.color_id WHERE tasks.board_id = (?1) ORDER BY tasks.status, tasks.ord, tasks.rowid",
        TASK_COLUMNS
    );
    let mut statement = db_connection.prepare(&query)?;

    let mut tasks = statement
        .query_map(params![board_id], get_task_from_row)?
        .collect::<rusqlite::Result<Vec<Task>>>()?;

    let mut checklists = get_board_checklists_from_db(board_id, db_connection)?;
    for task in tasks.iter_mut() {
        if let Some(mut items) = checklists.remove(&task.id) {
            items.sort_by_key(|(_, num)| *num);
            task.checklist = items.into_iter().map(|(item, _)| item).collect();
        }
    }

    Ok(tasks)
}

pub fn get_task_from_db(task_id: TaskID, db_connection: &Connection) -> ApiResult<Task> {
    let query = format!(
        "SELECT {} FROM tasks JOIN users ON users.rowid = tasks.owner_id LEFT JOIN colors ON colors.rowid = tasks.color_id WHERE tasks.rowid = (?1)",
        TASK_COLUMNS
    );

    let task = db_connection
        .query_row(&query, params![task_id], get_task_from_row)
        .optional()?;

    let mut task = task.ok_or(ApiError::NotFound("task"))?;
    task.checklist = get_task_checklist_from_db(task_id, db_connection)?;

    Ok(task)
}

pub fn board_id_of_task(task_id: TaskID, db_connection: &Connection) -> ApiResult<BoardID> {
    db_connection
        .query_row(
            "SELECT board_id FROM tasks WHERE rowid = (?1)",
            params![task_id],
            |row| row.get::<_, BoardID>(0),
        )
        .optional()?
        .ok_or(ApiError::NotFound("task"))
}

/// Next free position at the end of a column: max + 1, or 0 when empty.
pub fn next_order_in_column(
    board_id: BoardID,
    status: &str,
    db_connection: &Connection,
) -> ApiResult<i64> {
    Ok(db_connection.query_row(
        "SELECT COALESCE(MAX(ord), -1) + 1 FROM tasks WHERE board_id = (?1) AND status = (?2)",
        params![board_id, status],
        |row| row.get(0),
    )?)
}

fn first_board_column(board_id: BoardID, db_connection: &Connection) -> ApiResult<String> {
    db_connection
        .query_row(
            "SELECT column_id FROM board_columns WHERE board_id = (?1) ORDER BY ord LIMIT 1",
            params![board_id],
            |row| row.get::<_, String>(0),
        )
        .optional()?
        .ok_or(ApiError::NotFound("board"))
}

pub fn add_task_to_db(
    request: CreateTaskRequest,
    owner_id: UserID,
    db_connection: &Connection,
) -> ApiResult<AddTaskResult> {
    if request.title.trim().is_empty() {
        return Err(ApiError::Validation("task title is required".to_string()));
    }

    let status = match request.status {
        Some(status) => status,
        None => first_board_column(request.board_id, db_connection)?,
    };
    let ord = next_order_in_column(request.board_id, &status, db_connection)?;

    db_connection.execute(
        "INSERT INTO tasks (board_id, title, description, status, priority, color_id, owner_id, ord, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            request.board_id,
            request.title.trim(),
            request.description.unwrap_or_default(),
            status,
            request.priority.unwrap_or(Priority::Medium),
            request.color_id,
            owner_id,
            ord,
            Utc::now().to_rfc3339(),
        ],
    )?;

    Ok(AddTaskResult {
        task_id: db_connection.last_insert_rowid(),
    })
}

pub fn update_task_in_db(
    task_id: TaskID,
    request: UpdateTaskRequest,
    db_connection: &Connection,
) -> ApiResult<Task> {
    let current = get_task_from_db(task_id, db_connection)?;

    let title = request.title.unwrap_or(current.title);
    if title.trim().is_empty() {
        return Err(ApiError::Validation("task title is required".to_string()));
    }
    let description = request.description.unwrap_or(current.description);
    let priority = request.priority.unwrap_or(current.priority);
    let color_id = match request.color_id {
        Some(id) => Some(id),
        None => match current.color {
            Some(ColorRef::Resolved(color)) => Some(color.id),
            Some(ColorRef::Id(id)) => Some(id),
            None => None,
        },
    };

    db_connection.execute(
        "UPDATE tasks SET title = (?1), description = (?2), priority = (?3), color_id = (?4) WHERE rowid = (?5)",
        params![title.trim(), description, priority, color_id, task_id],
    )?;

    if let Some(checklist) = request.checklist {
        set_task_checklist(task_id, &checklist, db_connection)?;
    }

    get_task_from_db(task_id, db_connection)
}

/// The single-task half of the order store: reassigns column and position in
/// one write. Other tasks are left untouched.
pub fn move_task_in_db(
    task_id: TaskID,
    status: &str,
    order: i64,
    db_connection: &Connection,
) -> ApiResult<Task> {
    let changed = db_connection.execute(
        "UPDATE tasks SET status = (?1), ord = (?2) WHERE rowid = (?3)",
        params![status, order, task_id],
    )?;

    if changed == 0 {
        return Err(ApiError::NotFound("task"));
    }

    get_task_from_db(task_id, db_connection)
}

/// The bulk half of the order store: one unordered update per entry, scoped
/// to the board. Ids that do not exist, or belong to another board, change
/// nothing. There is deliberately no surrounding transaction; a failure
/// mid-batch leaves the applied prefix in place and the client reconciles by
/// refetching.
pub fn update_orders_in_db(
    board_id: BoardID,
    updates: &[OrderUpdate],
    db_connection: &Connection,
) -> ApiResult<()> {
    for update in updates {
        db_connection.execute(
            "UPDATE tasks SET ord = (?1) WHERE rowid = (?2) AND board_id = (?3)",
            params![update.order, update.id, board_id],
        )?;
    }

    Ok(())
}

pub fn delete_task_from_db(task_id: TaskID, db_connection: &Connection) -> ApiResult<()> {
    db_connection.execute(
        "DELETE FROM checklist_items WHERE task_id = (?1)",
        params![task_id],
    )?;

    let deleted =
        db_connection.execute("DELETE FROM tasks WHERE rowid = (?1)", params![task_id])?;
    if deleted == 0 {
        return Err(ApiError::NotFound("task"));
    }

    Ok(())
}
