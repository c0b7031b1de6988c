use rocket::serde::json::Json;
use rocket::{delete, get, post, State};

use crate::api_error::{ApiError, ApiResult};
use crate::auth::data::UserSummary;
use crate::auth::helpers::AuthedUser;
use crate::data::DBConnection;

use super::data::*;
use super::helpers::*;

#[post("/", format = "json", data = "<request>")]
pub fn add_board(
    request: Json<CreateBoardRequest>,
    user: AuthedUser,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<AddBoardResult>> {
    let db_connection = db_connection.lock()?;

    add_board_to_db(request.into_inner(), user.id(), &db_connection).map(Json)
}

#[get("/")]
pub fn get_boards(
    user: AuthedUser,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<Vec<BoardSummary>>> {
    let db_connection = db_connection.lock()?;

    get_boards_for_user(user.id(), &db_connection).map(Json)
}

#[get("/<board_id>")]
pub fn get_board(
    board_id: BoardID,
    user: AuthedUser,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<Board>> {
    let db_connection = db_connection.lock()?;

    authorize_board_access(board_id, user.id(), &db_connection)?;
    get_board_from_db(board_id, &db_connection).map(Json)
}

#[delete("/<board_id>")]
pub fn delete_board(
    board_id: BoardID,
    user: AuthedUser,
    db_connection: &State<DBConnection>,
) -> ApiResult<()> {
    let db_connection = db_connection.lock()?;

    // Only the creator may delete a board; members may not.
    if board_creator_id(board_id, &db_connection)? != user.id() {
        return Err(ApiError::Forbidden(
            "only the board creator can delete it".to_string(),
        ));
    }

    delete_board_from_db(board_id, &db_connection)
}

#[post("/<board_id>/members", format = "json", data = "<request>")]
pub fn add_member(
    board_id: BoardID,
    request: Json<AddMemberRequest>,
    user: AuthedUser,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<UserSummary>> {
    let db_connection = db_connection.lock()?;

    authorize_board_access(board_id, user.id(), &db_connection)?;
    add_member_to_db(board_id, &request.username, &db_connection).map(Json)
}
