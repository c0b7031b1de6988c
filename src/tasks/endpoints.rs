use rocket::serde::json::Json;
use rocket::{delete, get, patch, post, put, State};

use crate::api_error::ApiResult;
use crate::auth::helpers::AuthedUser;
use crate::boards::data::BoardID;
use crate::boards::helpers::authorize_board_access;
use crate::data::DBConnection;

use super::data::*;
use super::helpers::*;

#[get("/board/<board_id>")]
pub fn get_board_tasks(
    board_id: BoardID,
    user: AuthedUser,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<Vec<Task>>> {
    let db_connection = db_connection.lock()?;

    authorize_board_access(board_id, user.id(), &db_connection)?;
    get_board_tasks_from_db(board_id, &db_connection).map(Json)
}

#[post("/", format = "json", data = "<request>")]
pub fn add_task(
    request: Json<CreateTaskRequest>,
    user: AuthedUser,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<AddTaskResult>> {
    let db_connection = db_connection.lock()?;

    let request = request.into_inner();
    authorize_board_access(request.board_id, user.id(), &db_connection)?;
    add_task_to_db(request, user.id(), &db_connection).map(Json)
}

#[put("/<task_id>", format = "json", data = "<request>")]
pub fn update_task(
    task_id: TaskID,
    request: Json<UpdateTaskRequest>,
    user: AuthedUser,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<Task>> {
    let db_connection = db_connection.lock()?;

    let board_id = board_id_of_task(task_id, &db_connection)?;
    authorize_board_access(board_id, user.id(), &db_connection)?;
    update_task_in_db(task_id, request.into_inner(), &db_connection).map(Json)
}

#[delete("/<task_id>")]
pub fn delete_task(
    task_id: TaskID,
    user: AuthedUser,
    db_connection: &State<DBConnection>,
) -> ApiResult<()> {
    let db_connection = db_connection.lock()?;

    let board_id = board_id_of_task(task_id, &db_connection)?;
    authorize_board_access(board_id, user.id(), &db_connection)?;
    delete_task_from_db(task_id, &db_connection)
}

#[patch("/<task_id>/move", format = "json", data = "<request>")]
pub fn move_task(
    task_id: TaskID,
    request: Json<MoveTaskRequest>,
    user: AuthedUser,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<Task>> {
    let db_connection = db_connection.lock()?;

    let board_id = board_id_of_task(task_id, &db_connection)?;
    authorize_board_access(board_id, user.id(), &db_connection)?;
    move_task_in_db(task_id, &request.status, request.order, &db_connection).map(Json)
}

#[patch("/board/<board_id>/orders", format = "json", data = "<request>")]
pub fn update_orders(
    board_id: BoardID,
    request: Json<UpdateOrdersRequest>,
    user: AuthedUser,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<MessageResponse>> {
    let db_connection = db_connection.lock()?;

    authorize_board_access(board_id, user.id(), &db_connection)?;
    update_orders_in_db(board_id, &request.updates, &db_connection)?;

    Ok(Json(MessageResponse {
        success: true,
        message: "orders updated".to_string(),
    }))
}
