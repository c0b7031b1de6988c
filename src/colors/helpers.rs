use rusqlite::{params, Connection, OptionalExtension};

use crate::api_error::ApiResult;

use super::data::*;

pub fn get_all_colors_from_db(db_connection: &Connection) -> ApiResult<Vec<Color>> {
    let mut statement = db_connection.prepare("SELECT rowid, name, hex FROM colors ORDER BY rowid")?;

    let colors = statement
        .query_map([], |row| {
            Ok(Color {
                id: row.get(0)?,
                name: row.get(1)?,
                hex: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<Color>>>()?;

    Ok(colors)
}

pub fn get_color_from_db(
    color_id: ColorID,
    db_connection: &Connection,
) -> ApiResult<Option<Color>> {
    Ok(db_connection
        .query_row(
            "SELECT rowid, name, hex FROM colors WHERE rowid = (?1)",
            params![color_id],
            |row| {
                Ok(Color {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    hex: row.get(2)?,
                })
            },
        )
        .optional()?)
}

/// Seeds the default palette on first launch.
pub fn seed_default_colors(db_connection: &Connection) -> ApiResult<()> {
    let count: i64 = db_connection.query_row("SELECT COUNT(*) FROM colors", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(());
    }

    let palette = [
        ("slate", "#64748b"),
        ("red", "#ef4444"),
        ("amber", "#f59e0b"),
        ("green", "#22c55e"),
        ("sky", "#0ea5e9"),
        ("violet", "#8b5cf6"),
    ];

    for (name, hex) in palette.iter() {
        db_connection.execute(
            "INSERT INTO colors (name, hex) VALUES (?1, ?2)",
            params![name, hex],
        )?;
    }

    Ok(())
}
