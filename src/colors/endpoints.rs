use rocket::serde::json::Json;
use rocket::{get, State};

use crate::api_error::ApiResult;
use crate::auth::helpers::AuthedUser;
use crate::data::DBConnection;

use super::data::*;
use super::helpers::*;

#[get("/")]
pub fn get_colors(
    _user: AuthedUser,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<Vec<Color>>> {
    let db_connection = db_connection.lock()?;

    get_all_colors_from_db(&db_connection).map(Json)
}
