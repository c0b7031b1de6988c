use rocket::http::{ContentType, Header, Status};
use rocket::local::blocking::Client;
use rusqlite::Connection;
use serde_json::{json, Value};

use std::sync::{Arc, Mutex};

fn test_client() -> Client {
    let connection = Connection::open_in_memory().expect("failed to open in-memory db");
    rboard::data::create_tables(&connection).expect("failed to create tables");
    rboard::templates::helpers::seed_default_template(&connection).expect("failed to seed template");
    rboard::colors::helpers::seed_default_colors(&connection).expect("failed to seed colors");

    let connection = Arc::new(Mutex::new(connection));
    Client::tracked(rboard::rocket(connection)).expect("valid rocket instance")
}

fn register(client: &Client, username: &str) -> String {
    let response = client
        .post("/api/auth/register")
        .header(ContentType::JSON)
        .body(json!({ "username": username, "password": "pw" }).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().expect("auth response");
    body["token"].as_str().expect("token").to_string()
}

fn bearer(token: &str) -> Header<'static> {
    Header::new("Authorization", format!("Bearer {}", token))
}

fn create_board(client: &Client, token: &str, name: &str) -> i64 {
    let response = client
        .post("/api/boards")
        .header(ContentType::JSON)
        .header(bearer(token))
        .body(json!({ "name": name, "template_id": 1 }).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().expect("board response");
    body["board_id"].as_i64().expect("board id")
}

fn create_task(client: &Client, token: &str, board_id: i64, title: &str, status: &str) -> i64 {
    let response = client
        .post("/api/tasks")
        .header(ContentType::JSON)
        .header(bearer(token))
        .body(json!({ "board_id": board_id, "title": title, "status": status }).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().expect("task response");
    body["task_id"].as_i64().expect("task id")
}

fn board_tasks(client: &Client, token: &str, board_id: i64) -> Vec<Value> {
    let response = client
        .get(format!("/api/tasks/board/{}", board_id))
        .header(bearer(token))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().expect("task list");
    body.as_array().expect("array").clone()
}

fn titles_in_column(tasks: &[Value], status: &str) -> Vec<(String, i64)> {
    let mut column: Vec<&Value> = tasks
        .iter()
        .filter(|task| task["status"] == status)
        .collect();
    column.sort_by_key(|task| task["order"].as_i64().unwrap());
    column
        .iter()
        .map(|task| {
            (
                task["title"].as_str().unwrap().to_string(),
                task["order"].as_i64().unwrap(),
            )
        })
        .collect()
}

#[test]
fn order_round_trip_through_the_api() {
    let client = test_client();
    let token = register(&client, "ada");
    let board_id = create_board(&client, &token, "Launch");

    let a = create_task(&client, &token, board_id, "A", "backlog");
    let b = create_task(&client, &token, board_id, "B", "backlog");
    let c = create_task(&client, &token, board_id, "C", "backlog");

    let tasks = board_tasks(&client, &token, board_id);
    assert_eq!(
        titles_in_column(&tasks, "backlog"),
        vec![
            ("A".to_string(), 0),
            ("B".to_string(), 1),
            ("C".to_string(), 2)
        ]
    );

    // Cross-column move: A goes to the empty "done" column at position 0.
    let response = client
        .patch(format!("/api/tasks/{}/move", a))
        .header(ContentType::JSON)
        .header(bearer(&token))
        .body(json!({ "status": "done", "order": 0 }).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let moved: Value = response.into_json().unwrap();
    assert_eq!(moved["status"], "done");
    assert_eq!(moved["order"], 0);
    assert_eq!(moved["owner"]["username"], "ada");

    // The source column keeps B and C with their orders untouched.
    let tasks = board_tasks(&client, &token, board_id);
    assert_eq!(
        titles_in_column(&tasks, "backlog"),
        vec![("B".to_string(), 1), ("C".to_string(), 2)]
    );

    // Bulk reorder: C before B, plus an id that no longer exists.
    let response = client
        .patch(format!("/api/tasks/board/{}/orders", board_id))
        .header(ContentType::JSON)
        .header(bearer(&token))
        .body(
            json!({ "updates": [
                { "id": c, "order": 0 },
                { "id": b, "order": 1 },
                { "id": 9999, "order": 5 }
            ]})
            .to_string(),
        )
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().unwrap();
    assert_eq!(body["success"], true);

    // Refetch equals what was persisted.
    let tasks = board_tasks(&client, &token, board_id);
    assert_eq!(
        titles_in_column(&tasks, "backlog"),
        vec![("C".to_string(), 0), ("B".to_string(), 1)]
    );
    assert_eq!(titles_in_column(&tasks, "done"), vec![("A".to_string(), 0)]);
}

#[test]
fn missing_token_is_unauthorized() {
    let client = test_client();

    let response = client.get("/api/boards").dispatch();
    assert_eq!(response.status(), Status::Unauthorized);

    let body: Value = response.into_json().unwrap();
    assert_eq!(body["success"], false);
}

#[test]
fn outsiders_are_forbidden() {
    let client = test_client();
    let ada = register(&client, "ada");
    let mallory = register(&client, "mallory");

    let board_id = create_board(&client, &ada, "Private");

    let response = client
        .get(format!("/api/tasks/board/{}", board_id))
        .header(bearer(&mallory))
        .dispatch();
    assert_eq!(response.status(), Status::Forbidden);

    let body: Value = response.into_json().unwrap();
    assert_eq!(body["success"], false);
}

#[test]
fn members_gain_access() {
    let client = test_client();
    let ada = register(&client, "ada");
    let grace = register(&client, "grace");

    let board_id = create_board(&client, &ada, "Shared");

    let response = client
        .post(format!("/api/boards/{}/members", board_id))
        .header(ContentType::JSON)
        .header(bearer(&ada))
        .body(json!({ "username": "grace" }).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let tasks = board_tasks(&client, &grace, board_id);
    assert!(tasks.is_empty());
}

#[test]
fn moving_a_missing_task_is_not_found() {
    let client = test_client();
    let token = register(&client, "ada");
    create_board(&client, &token, "Launch");

    let response = client
        .patch("/api/tasks/9999/move")
        .header(ContentType::JSON)
        .header(bearer(&token))
        .body(json!({ "status": "done", "order": 0 }).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let body: Value = response.into_json().unwrap();
    assert_eq!(body["success"], false);
}

#[test]
fn malformed_bodies_keep_the_error_envelope() {
    let client = test_client();
    let token = register(&client, "ada");

    let response = client
        .post("/api/boards")
        .header(ContentType::JSON)
        .header(bearer(&token))
        .body(r#"{"name": 7}"#)
        .dispatch();
    assert_eq!(response.status(), Status::UnprocessableEntity);

    let body: Value = response.into_json().unwrap();
    assert_eq!(body["success"], false);
}

#[test]
fn board_exposes_template_columns_and_palette_loads() {
    let client = test_client();
    let token = register(&client, "ada");
    let board_id = create_board(&client, &token, "Launch");

    let response = client
        .get(format!("/api/boards/{}", board_id))
        .header(bearer(&token))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let board: Value = response.into_json().unwrap();
    let columns: Vec<&str> = board["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|column| column["id"].as_str().unwrap())
        .collect();
    assert_eq!(columns, vec!["backlog", "up-next", "in-progress", "done"]);

    let response = client.get("/api/colors").header(bearer(&token)).dispatch();
    assert_eq!(response.status(), Status::Ok);
    let colors: Value = response.into_json().unwrap();
    assert_eq!(colors.as_array().unwrap().len(), 6);
}

#[test]
fn checklist_survives_update_round_trip() {
    let client = test_client();
    let token = register(&client, "ada");
    let board_id = create_board(&client, &token, "Launch");
    let task_id = create_task(&client, &token, board_id, "With list", "backlog");

    let response = client
        .put(format!("/api/tasks/{}", task_id))
        .header(ContentType::JSON)
        .header(bearer(&token))
        .body(
            json!({ "checklist": [
                { "text": "write", "completed": true },
                { "text": "ship", "completed": false }
            ]})
            .to_string(),
        )
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let task: Value = response.into_json().unwrap();
    let texts: Vec<&str> = task["checklist"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["write", "ship"]);
}
