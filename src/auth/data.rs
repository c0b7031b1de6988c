use serde::{Deserialize, Serialize};

pub type UserID = i64;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserSummary {
    pub id: UserID,
    pub username: String,
    pub avatar: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Serialize, Debug)]
pub struct AvatarResponse {
    pub avatar: String,
}
