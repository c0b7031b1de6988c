use rand::Rng;
use rocket::http::Status;
use rocket::request::{self, FromRequest, Request};
use rocket::State;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use std::path::Path;

use crate::api_error::{ApiError, ApiResult};
use crate::data::DBConnection;

use super::data::*;

pub const AVATAR_DIR: &str = "avatars";
pub const MAX_AVATAR_SIZE_KIB: u64 = 2048;

fn random_hex(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes];
    rand::thread_rng().fill(buffer.as_mut_slice());
    hex::encode(buffer)
}

pub fn generate_token() -> String {
    random_hex(32)
}

pub fn generate_salt() -> String {
    random_hex(16)
}

pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn add_user_to_db(
    username: &str,
    password: &str,
    db_connection: &Connection,
) -> ApiResult<UserID> {
    let salt = generate_salt();
    let password_hash = hash_password(&salt, password);

    let result = db_connection.execute(
        "INSERT INTO users (username, password_hash, salt) VALUES (?1, ?2, ?3)",
        params![username, password_hash, salt],
    );

    match result {
        Ok(_) => Ok(db_connection.last_insert_rowid()),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(ApiError::Validation(format!(
                "username {} is already taken",
                username
            )))
        }
        Err(e) => Err(e.into()),
    }
}

/// Checks the given credentials and, when they match, stores and returns a
/// freshly issued token. Bad username and bad password are indistinguishable
/// to the caller.
pub fn login_user(
    username: &str,
    password: &str,
    db_connection: &Connection,
) -> ApiResult<AuthResponse> {
    let row = db_connection
        .query_row(
            "SELECT rowid, password_hash, salt FROM users WHERE username = (?1)",
            params![username],
            |row| {
                Ok((
                    row.get::<_, UserID>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    let (user_id, password_hash, salt) = match row {
        Some(v) => v,
        None => return Err(ApiError::Unauthorized("invalid credentials".to_string())),
    };

    if hash_password(&salt, password) != password_hash {
        return Err(ApiError::Unauthorized("invalid credentials".to_string()));
    }

    issue_token(user_id, db_connection)
}

/// Stores a new token for the user and returns it alongside the user summary.
pub fn issue_token(user_id: UserID, db_connection: &Connection) -> ApiResult<AuthResponse> {
    let token = generate_token();
    db_connection.execute(
        "UPDATE users SET token = (?1) WHERE rowid = (?2)",
        params![token, user_id],
    )?;

    Ok(AuthResponse {
        token,
        user: get_user_summary(user_id, db_connection)?,
    })
}

pub fn get_user_summary(user_id: UserID, db_connection: &Connection) -> ApiResult<UserSummary> {
    db_connection
        .query_row(
            "SELECT rowid, username, avatar FROM users WHERE rowid = (?1)",
            params![user_id],
            |row| {
                Ok(UserSummary {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    avatar: row.get(2)?,
                })
            },
        )
        .optional()?
        .ok_or(ApiError::NotFound("user"))
}

pub fn get_user_by_username(
    username: &str,
    db_connection: &Connection,
) -> ApiResult<Option<UserSummary>> {
    Ok(db_connection
        .query_row(
            "SELECT rowid, username, avatar FROM users WHERE username = (?1)",
            params![username],
            |row| {
                Ok(UserSummary {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    avatar: row.get(2)?,
                })
            },
        )
        .optional()?)
}

pub fn get_user_by_token(
    token: &str,
    db_connection: &Connection,
) -> ApiResult<Option<UserSummary>> {
    Ok(db_connection
        .query_row(
            "SELECT rowid, username, avatar FROM users WHERE token = (?1)",
            params![token],
            |row| {
                Ok(UserSummary {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    avatar: row.get(2)?,
                })
            },
        )
        .optional()?)
}

pub fn set_user_avatar(
    user_id: UserID,
    avatar: &str,
    db_connection: &Connection,
) -> ApiResult<()> {
    db_connection.execute(
        "UPDATE users SET avatar = (?1) WHERE rowid = (?2)",
        params![avatar, user_id],
    )?;
    Ok(())
}

pub fn validate_path_is_in_avatar_folder(path: &Path) -> bool {
    match path.parent() {
        Some(parent) => parent == Path::new(AVATAR_DIR),
        None => false,
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ").map(str::trim)
}

/// Request guard for authenticated endpoints. Resolves the bearer token to a
/// user row; rejections go through the 401 catcher.
#[derive(Debug, Clone)]
pub struct AuthedUser(pub UserSummary);

impl AuthedUser {
    pub fn id(&self) -> UserID {
        self.0.id
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthedUser {
    type Error = ApiError;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let token = match request
            .headers()
            .get_one("Authorization")
            .and_then(bearer_token)
        {
            Some(token) => token.to_string(),
            None => {
                return request::Outcome::Error((
                    Status::Unauthorized,
                    ApiError::Unauthorized("missing bearer token".to_string()),
                ))
            }
        };

        let db_connection = match request.guard::<&State<DBConnection>>().await {
            request::Outcome::Success(db) => db,
            _ => {
                return request::Outcome::Error((
                    Status::InternalServerError,
                    ApiError::Internal("database unavailable".to_string()),
                ))
            }
        };

        let lookup = || -> ApiResult<Option<UserSummary>> {
            let db_connection = db_connection.lock()?;
            get_user_by_token(&token, &db_connection)
        };

        match lookup() {
            Ok(Some(user)) => request::Outcome::Success(AuthedUser(user)),
            Ok(None) => request::Outcome::Error((
                Status::Unauthorized,
                ApiError::Unauthorized("invalid token".to_string()),
            )),
            Err(e) => request::Outcome::Error((Status::InternalServerError, e)),
        }
    }
}
