use log::error;
use rocket::catch;
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use rocket::serde::json::Json;
use rocket_multipart_form_data::MultipartFormDataError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::io;
use std::io::Cursor;
use std::sync::PoisonError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Validation(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::Forbidden(_) => Status::Forbidden,
            ApiError::Unauthorized(_) => Status::Unauthorized,
            ApiError::Validation(_) => Status::BadRequest,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }
}

impl<T> From<PoisonError<T>> for ApiError {
    fn from(e: PoisonError<T>) -> ApiError {
        ApiError::Internal(e.to_string())
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(e: rusqlite::Error) -> ApiError {
        ApiError::Internal(e.to_string())
    }
}

impl From<MultipartFormDataError> for ApiError {
    fn from(e: MultipartFormDataError) -> ApiError {
        ApiError::Validation(e.to_string())
    }
}

impl From<io::Error> for ApiError {
    fn from(e: io::Error) -> ApiError {
        ApiError::Internal(e.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Wire shape for every failed response, matching the `{success, message}`
/// envelope the client expects.
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl ErrorBody {
    fn new(message: impl Into<String>) -> ErrorBody {
        ErrorBody {
            success: false,
            message: message.into(),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, _request: &'r Request<'_>) -> response::Result<'static> {
        if let ApiError::Internal(_) = self {
            error!("request failed: {}", self);
        }

        let status = self.status();
        let body = serde_json::to_string(&ErrorBody::new(self.to_string()))
            .unwrap_or_else(|_| String::from(r#"{"success":false,"message":"internal error"}"#));

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

// Catchers keep failures raised outside of handlers (guard rejections,
// unroutable paths, body parse failures) on the same JSON envelope.

#[catch(401)]
pub fn unauthorized_catcher() -> Json<ErrorBody> {
    Json(ErrorBody::new("authentication required"))
}

#[catch(403)]
pub fn forbidden_catcher() -> Json<ErrorBody> {
    Json(ErrorBody::new("forbidden"))
}

#[catch(404)]
pub fn not_found_catcher() -> Json<ErrorBody> {
    Json(ErrorBody::new("not found"))
}

#[catch(422)]
pub fn unprocessable_catcher() -> Json<ErrorBody> {
    Json(ErrorBody::new("malformed request body"))
}

#[catch(default)]
pub fn default_catcher(status: Status, _request: &Request) -> Json<ErrorBody> {
    Json(ErrorBody::new(format!("request failed with status {}", status.code)))
}
