use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub type DBConnection = Arc<Mutex<Connection>>;

/// Creates every table the application uses. All statements are
/// `IF NOT EXISTS`, so calling this on an existing database is a no-op.
pub fn create_tables(connection: &Connection) -> rusqlite::Result<()> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS users (username TEXT NOT NULL UNIQUE, password_hash TEXT NOT NULL, salt TEXT NOT NULL, token TEXT, avatar TEXT)",
        [],
    )?;
    connection.execute(
        "CREATE TABLE IF NOT EXISTS boards (name TEXT NOT NULL, creator_id INTEGER NOT NULL, created_at TEXT NOT NULL)",
        [],
    )?;
    connection.execute(
        "CREATE TABLE IF NOT EXISTS board_members (board_id INTEGER NOT NULL, user_id INTEGER NOT NULL)",
        [],
    )?;
    connection.execute(
        "CREATE TABLE IF NOT EXISTS board_columns (board_id INTEGER NOT NULL, column_id TEXT NOT NULL, title TEXT NOT NULL, color TEXT NOT NULL, ord INTEGER NOT NULL)",
        [],
    )?;
    connection.execute("CREATE TABLE IF NOT EXISTS templates (name TEXT NOT NULL)", [])?;
    connection.execute(
        "CREATE TABLE IF NOT EXISTS template_columns (template_id INTEGER NOT NULL, column_id TEXT NOT NULL, title TEXT NOT NULL, color TEXT NOT NULL, ord INTEGER NOT NULL)",
        [],
    )?;
    connection.execute(
        "CREATE TABLE IF NOT EXISTS colors (name TEXT NOT NULL, hex TEXT NOT NULL)",
        [],
    )?;
    connection.execute(
        "CREATE TABLE IF NOT EXISTS tasks (board_id INTEGER NOT NULL, title TEXT NOT NULL, description TEXT NOT NULL, status TEXT NOT NULL, priority TEXT NOT NULL, color_id INTEGER, owner_id INTEGER NOT NULL, ord INTEGER NOT NULL, created_at TEXT NOT NULL)",
        [],
    )?;
    connection.execute(
        "CREATE TABLE IF NOT EXISTS checklist_items (task_id INTEGER NOT NULL, item_num INTEGER NOT NULL, text TEXT NOT NULL, completed INTEGER NOT NULL)",
        [],
    )?;

    Ok(())
}
