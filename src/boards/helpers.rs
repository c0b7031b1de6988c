use chrono::offset::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::api_error::{ApiError, ApiResult};
use crate::auth::data::{UserID, UserSummary};
use crate::auth::helpers::{get_user_by_username, get_user_summary};
use crate::templates::data::Column;
use crate::templates::helpers::get_template_columns;

use super::data::*;

/// Creates a board and copies the template's columns into `board_columns`.
/// The copy is what makes a board's columns immutable: later template edits
/// do not reach existing boards.
pub fn add_board_to_db(
    request: CreateBoardRequest,
    creator_id: UserID,
    db_connection: &Connection,
) -> ApiResult<AddBoardResult> {
    if request.name.trim().is_empty() {
        return Err(ApiError::Validation("board name is required".to_string()));
    }

    let columns = get_template_columns(request.template_id, db_connection)?;
    if columns.is_empty() {
        return Err(ApiError::NotFound("template"));
    }

    db_connection.execute(
        "INSERT INTO boards (name, creator_id, created_at) VALUES (?1, ?2, ?3)",
        params![request.name.trim(), creator_id, Utc::now().to_rfc3339()],
    )?;
    let board_id = db_connection.last_insert_rowid();

    for column in columns {
        db_connection.execute(
            "INSERT INTO board_columns (board_id, column_id, title, color, ord) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![board_id, column.id, column.title, column.color, column.order],
        )?;
    }

    Ok(AddBoardResult { board_id })
}

pub fn get_board_columns(
    board_id: BoardID,
    db_connection: &Connection,
) -> ApiResult<Vec<Column>> {
    let mut statement = db_connection.prepare(
        "SELECT column_id, title, color, ord FROM board_columns WHERE board_id = (?1) ORDER BY ord",
    )?;

    let columns = statement
        .query_map(params![board_id], |row| {
            Ok(Column {
                id: row.get(0)?,
                title: row.get(1)?,
                color: row.get(2)?,
                order: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<Column>>>()?;

    Ok(columns)
}

pub fn get_board_members(
    board_id: BoardID,
    db_connection: &Connection,
) -> ApiResult<Vec<UserSummary>> {
    let mut statement = db_connection.prepare(
        "SELECT users.rowid, users.username, users.avatar FROM board_members JOIN users ON users.rowid = board_members.user_id WHERE board_members.board_id = (?1) ORDER BY users.rowid",
    )?;

    let members = statement
        .query_map(params![board_id], |row| {
            Ok(UserSummary {
                id: row.get(0)?,
                username: row.get(1)?,
                avatar: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<UserSummary>>>()?;

    Ok(members)
}

pub fn get_board_from_db(board_id: BoardID, db_connection: &Connection) -> ApiResult<Board> {
    let row = db_connection
        .query_row(
            "SELECT name, creator_id, created_at FROM boards WHERE rowid = (?1)",
            params![board_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, UserID>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    let (name, creator_id, created_at) = row.ok_or(ApiError::NotFound("board"))?;

    Ok(Board {
        id: board_id,
        name,
        creator: get_user_summary(creator_id, db_connection)?,
        members: get_board_members(board_id, db_connection)?,
        columns: get_board_columns(board_id, db_connection)?,
        created_at,
    })
}

/// Boards the user created or was added to, newest first.
pub fn get_boards_for_user(
    user_id: UserID,
    db_connection: &Connection,
) -> ApiResult<Vec<BoardSummary>> {
    let mut statement = db_connection.prepare(
        "SELECT DISTINCT boards.rowid, boards.name, boards.created_at FROM boards LEFT JOIN board_members ON board_members.board_id = boards.rowid WHERE boards.creator_id = (?1) OR board_members.user_id = (?1) ORDER BY boards.rowid DESC",
    )?;

    let boards = statement
        .query_map(params![user_id], |row| {
            Ok(BoardSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<BoardSummary>>>()?;

    Ok(boards)
}

pub fn delete_board_from_db(board_id: BoardID, db_connection: &Connection) -> ApiResult<()> {
    db_connection.execute(
        "DELETE FROM checklist_items WHERE task_id IN (SELECT rowid FROM tasks WHERE board_id = (?1))",
        params![board_id],
    )?;
    db_connection.execute("DELETE FROM tasks WHERE board_id = (?1)", params![board_id])?;
    db_connection.execute(
        "DELETE FROM board_columns WHERE board_id = (?1)",
        params![board_id],
    )?;
    db_connection.execute(
        "DELETE FROM board_members WHERE board_id = (?1)",
        params![board_id],
    )?;

    let deleted =
        db_connection.execute("DELETE FROM boards WHERE rowid = (?1)", params![board_id])?;
    if deleted == 0 {
        return Err(ApiError::NotFound("board"));
    }

    Ok(())
}

pub fn add_member_to_db(
    board_id: BoardID,
    username: &str,
    db_connection: &Connection,
) -> ApiResult<UserSummary> {
    let user =
        get_user_by_username(username, db_connection)?.ok_or(ApiError::NotFound("user"))?;

    let already_member: i64 = db_connection.query_row(
        "SELECT COUNT(*) FROM board_members WHERE board_id = (?1) AND user_id = (?2)",
        params![board_id, user.id],
        |row| row.get(0),
    )?;

    if already_member == 0 {
        db_connection.execute(
            "INSERT INTO board_members (board_id, user_id) VALUES (?1, ?2)",
            params![board_id, user.id],
        )?;
    }

    Ok(user)
}

pub fn board_creator_id(board_id: BoardID, db_connection: &Connection) -> ApiResult<UserID> {
    db_connection
        .query_row(
            "SELECT creator_id FROM boards WHERE rowid = (?1)",
            params![board_id],
            |row| row.get::<_, UserID>(0),
        )
        .optional()?
        .ok_or(ApiError::NotFound("board"))
}

/// Every board-scoped operation goes through this: the board must exist and
/// the caller must be its creator or a listed member.
pub fn authorize_board_access(
    board_id: BoardID,
    user_id: UserID,
    db_connection: &Connection,
) -> ApiResult<()> {
    let creator_id = board_creator_id(board_id, db_connection)?;
    if creator_id == user_id {
        return Ok(());
    }

    let is_member: i64 = db_connection.query_row(
        "SELECT COUNT(*) FROM board_members WHERE board_id = (?1) AND user_id = (?2)",
        params![board_id, user_id],
        |row| row.get(0),
    )?;

    if is_member == 0 {
        return Err(ApiError::Forbidden(
            "not a member of this board".to_string(),
        ));
    }

    Ok(())
}
