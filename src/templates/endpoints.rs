use rocket::serde::json::Json;
use rocket::{get, post, State};

use crate::api_error::ApiResult;
use crate::auth::helpers::AuthedUser;
use crate::data::DBConnection;

use super::data::*;
use super::helpers::*;

#[get("/")]
pub fn get_templates(
    _user: AuthedUser,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<Vec<Template>>> {
    let db_connection = db_connection.lock()?;

    get_all_templates_from_db(&db_connection).map(Json)
}

#[get("/<template_id>")]
pub fn get_template(
    template_id: TemplateID,
    _user: AuthedUser,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<Template>> {
    let db_connection = db_connection.lock()?;

    get_template_from_db(template_id, &db_connection).map(Json)
}

#[post("/", format = "json", data = "<request>")]
pub fn add_template(
    request: Json<CreateTemplateRequest>,
    _user: AuthedUser,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<AddTemplateResult>> {
    let db_connection = db_connection.lock()?;

    add_template_to_db(request.into_inner(), &db_connection).map(Json)
}
