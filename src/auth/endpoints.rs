use rocket::data::Data;
use rocket::http::ContentType;
use rocket::serde::json::Json;
use rocket::{get, post, State};
use rocket_multipart_form_data::{
    MultipartFormData, MultipartFormDataField, MultipartFormDataOptions,
};

use std::path::Path;

use crate::api_error::{ApiError, ApiResult};
use crate::data::DBConnection;

use super::data::*;
use super::helpers::*;

#[post("/register", format = "json", data = "<request>")]
pub fn register(
    request: Json<RegisterRequest>,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<AuthResponse>> {
    let request = request.into_inner();
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::Validation(
            "username and password are required".to_string(),
        ));
    }

    let db_connection = db_connection.lock()?;
    let user_id = add_user_to_db(request.username.trim(), &request.password, &db_connection)?;

    issue_token(user_id, &db_connection).map(Json)
}

#[post("/login", format = "json", data = "<request>")]
pub fn login(
    request: Json<LoginRequest>,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<AuthResponse>> {
    let db_connection = db_connection.lock()?;

    login_user(&request.username, &request.password, &db_connection).map(Json)
}

#[get("/me")]
pub fn me(user: AuthedUser) -> Json<UserSummary> {
    Json(user.0)
}

#[post("/avatar", data = "<data>")]
pub async fn upload_avatar(
    content_type: &ContentType,
    data: Data<'_>,
    user: AuthedUser,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<AvatarResponse>> {
    let options = MultipartFormDataOptions::with_multipart_form_data_fields(vec![
        MultipartFormDataField::file("avatar").size_limit(MAX_AVATAR_SIZE_KIB * 1024),
    ]);

    let mut multipart = MultipartFormData::parse(content_type, data, options).await?;

    let file = multipart
        .files
        .remove("avatar")
        .and_then(|mut files| {
            if files.is_empty() {
                None
            } else {
                Some(files.remove(0))
            }
        })
        .ok_or_else(|| ApiError::Validation("missing avatar file field".to_string()))?;

    // Only the final path component of the uploaded name is kept.
    let original_name = file.file_name.as_deref().unwrap_or("avatar.png");
    let file_name = Path::new(original_name)
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ApiError::Validation("invalid avatar file name".to_string()))?;

    let avatar_name = format!("user-{}-{}", user.id(), file_name);
    let avatar_path = Path::new(AVATAR_DIR).join(&avatar_name);
    if !validate_path_is_in_avatar_folder(&avatar_path) {
        return Err(ApiError::Validation("invalid avatar file name".to_string()));
    }

    rocket::tokio::fs::copy(&file.path, &avatar_path).await?;

    let db_connection = db_connection.lock()?;
    set_user_avatar(user.id(), &avatar_name, &db_connection)?;

    Ok(Json(AvatarResponse {
        avatar: avatar_name,
    }))
}
