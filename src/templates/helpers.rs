use rusqlite::{params, Connection, OptionalExtension, Row};

use std::collections::HashMap;

use crate::api_error::{ApiError, ApiResult};

use super::data::*;

fn get_column_from_row(row: &Row) -> rusqlite::Result<(TemplateID, Column)> {
    Ok((
        row.get(0)?,
        Column {
            id: row.get(1)?,
            title: row.get(2)?,
            color: row.get(3)?,
            order: row.get(4)?,
        },
    ))
}

pub fn add_template_to_db(
    request: CreateTemplateRequest,
    db_connection: &Connection,
) -> ApiResult<AddTemplateResult> {
    if request.name.trim().is_empty() {
        return Err(ApiError::Validation("template name is required".to_string()));
    }
    if request.columns.is_empty() {
        return Err(ApiError::Validation(
            "a template needs at least one column".to_string(),
        ));
    }

    db_connection.execute(
        "INSERT INTO templates (name) VALUES (?1)",
        params![request.name.trim()],
    )?;
    let template_id = db_connection.last_insert_rowid();

    for (ord, column) in request.columns.into_iter().enumerate() {
        db_connection.execute(
            "INSERT INTO template_columns (template_id, column_id, title, color, ord) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![template_id, column.id, column.title, column.color, ord as i64],
        )?;
    }

    Ok(AddTemplateResult { template_id })
}

pub fn get_template_columns(
    template_id: TemplateID,
    db_connection: &Connection,
) -> ApiResult<Vec<Column>> {
    let mut statement = db_connection.prepare(
        "SELECT template_id, column_id, title, color, ord FROM template_columns WHERE template_id = (?1) ORDER BY ord",
    )?;

    let columns = statement
        .query_map(params![template_id], |row| {
            get_column_from_row(row).map(|(_, column)| column)
        })?
        .collect::<rusqlite::Result<Vec<Column>>>()?;

    Ok(columns)
}

pub fn get_template_from_db(
    template_id: TemplateID,
    db_connection: &Connection,
) -> ApiResult<Template> {
    let name = db_connection
        .query_row(
            "SELECT name FROM templates WHERE rowid = (?1)",
            params![template_id],
            |row| row.get::<_, String>(0),
        )
        .optional()?
        .ok_or(ApiError::NotFound("template"))?;

    Ok(Template {
        id: template_id,
        name,
        columns: get_template_columns(template_id, db_connection)?,
    })
}

pub fn get_all_templates_from_db(db_connection: &Connection) -> ApiResult<Vec<Template>> {
    let mut template_statement = db_connection.prepare("SELECT rowid, name FROM templates")?;
    let mut templates = template_statement
        .query_map([], |row| {
            Ok(Template {
                id: row.get(0)?,
                name: row.get(1)?,
                columns: vec![],
            })
        })?
        .collect::<rusqlite::Result<Vec<Template>>>()?;

    let mut column_statement = db_connection
        .prepare("SELECT template_id, column_id, title, color, ord FROM template_columns")?;
    let mut column_map: HashMap<TemplateID, Vec<Column>> = HashMap::new();

    let column_rows = column_statement.query_map([], get_column_from_row)?;
    for row_result in column_rows {
        let (template_id, column) = row_result?;
        column_map.entry(template_id).or_default().push(column);
    }

    for template in templates.iter_mut() {
        if let Some(mut columns) = column_map.remove(&template.id) {
            columns.sort_by_key(|column| column.order);
            template.columns = columns;
        }
    }

    templates.sort_by_key(|template| template.id);

    Ok(templates)
}

/// Seeds the default kanban template on first launch.
pub fn seed_default_template(db_connection: &Connection) -> ApiResult<()> {
    let count: i64 =
        db_connection.query_row("SELECT COUNT(*) FROM templates", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(());
    }

    let columns = [
        ("backlog", "Backlog", "#a1a1aa"),
        ("up-next", "Up Next", "#60a5fa"),
        ("in-progress", "In Progress", "#fbbf24"),
        ("done", "Done", "#4ade80"),
    ];

    add_template_to_db(
        CreateTemplateRequest {
            name: "Kanban".to_string(),
            columns: columns
                .iter()
                .map(|(id, title, color)| ColumnSpec {
                    id: id.to_string(),
                    title: title.to_string(),
                    color: color.to_string(),
                })
                .collect(),
        },
        db_connection,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::create_tables;

    fn test_connection() -> Connection {
        let connection = Connection::open_in_memory().expect("failed to open in-memory db");
        create_tables(&connection).expect("failed to create tables");
        connection
    }

    #[test]
    fn seeding_is_idempotent() {
        let connection = test_connection();

        seed_default_template(&connection).unwrap();
        seed_default_template(&connection).unwrap();

        let templates = get_all_templates_from_db(&connection).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "Kanban");
        assert_eq!(templates[0].columns.len(), 4);
        assert_eq!(templates[0].columns[0].id, "backlog");
        assert_eq!(templates[0].columns[3].id, "done");
    }

    #[test]
    fn columns_keep_their_declared_order() {
        let connection = test_connection();

        let result = add_template_to_db(
            CreateTemplateRequest {
                name: "Two stage".to_string(),
                columns: vec![
                    ColumnSpec {
                        id: "todo".to_string(),
                        title: "To Do".to_string(),
                        color: "#fff".to_string(),
                    },
                    ColumnSpec {
                        id: "done".to_string(),
                        title: "Done".to_string(),
                        color: "#000".to_string(),
                    },
                ],
            },
            &connection,
        )
        .unwrap();

        let template = get_template_from_db(result.template_id, &connection).unwrap();
        let orders: Vec<i64> = template.columns.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![0, 1]);
        assert_eq!(template.columns[0].id, "todo");
    }

    #[test]
    fn empty_template_is_rejected() {
        let connection = test_connection();

        let result = add_template_to_db(
            CreateTemplateRequest {
                name: "Empty".to_string(),
                columns: vec![],
            },
            &connection,
        );

        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[test]
    fn missing_template_is_not_found() {
        let connection = test_connection();

        let result = get_template_from_db(42, &connection);
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
