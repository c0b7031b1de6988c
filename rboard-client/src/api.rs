//! HTTP transport: a thin reqwest wrapper over the REST endpoints, plus the
//! `BoardApi` seam the move protocol is written against.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use std::time::Duration;

use crate::board::state::{
    BoardID, BoardSnapshot, ChecklistItem, ColorID, Column, OrderUpdate, Priority, Task, TaskID,
    UserSummary,
};
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> ClientConfig {
        ClientConfig {
            base_url: "http://localhost:8000".to_string(),
            token: None,
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Serialize, Debug)]
pub struct CreateBoardRequest {
    pub name: String,
    pub template_id: i64,
}

#[derive(Deserialize, Debug)]
pub struct AddBoardResult {
    pub board_id: BoardID,
}

#[derive(Deserialize, Debug)]
pub struct Board {
    pub id: BoardID,
    pub name: String,
    pub creator: UserSummary,
    pub members: Vec<UserSummary>,
    pub columns: Vec<Column>,
    pub created_at: String,
}

#[derive(Deserialize, Debug)]
pub struct BoardSummary {
    pub id: BoardID,
    pub name: String,
    pub created_at: String,
}

#[derive(Serialize, Debug)]
pub struct CreateTaskRequest {
    pub board_id: BoardID,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<Priority>,
    pub color_id: Option<ColorID>,
}

#[derive(Deserialize, Debug)]
pub struct AddTaskResult {
    pub task_id: TaskID,
}

#[derive(Serialize, Debug, Default)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub color_id: Option<ColorID>,
    pub checklist: Option<Vec<ChecklistItem>>,
}

#[derive(Serialize, Debug)]
struct MoveTaskRequest<'a> {
    status: &'a str,
    order: i64,
}

#[derive(Serialize, Debug)]
struct UpdateOrdersRequest<'a> {
    updates: &'a [OrderUpdate],
}

#[derive(Deserialize, Debug)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    message: String,
}

/// The persistence surface the move protocol depends on. Kept narrow so the
/// protocol can be driven against a scripted backend in tests.
#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn move_task(&self, task_id: TaskID, status: &str, order: i64) -> ClientResult<Task>;
    async fn update_orders(&self, board_id: BoardID, updates: &[OrderUpdate]) -> ClientResult<()>;
    async fn board_tasks(&self, board_id: BoardID) -> ClientResult<Vec<Task>>;
}

#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl RestClient {
    pub fn new(config: &ClientConfig) -> ClientResult<RestClient> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(RestClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Returns a copy of this client authenticated with the given token.
    pub fn with_token(&self, token: impl Into<String>) -> RestClient {
        RestClient {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.into()),
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response, status).await;
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }

    async fn read_empty(response: reqwest::Response) -> ClientResult<()> {
        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response, status).await;
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    async fn error_message(response: reqwest::Response, status: reqwest::StatusCode) -> String {
        response
            .json::<ErrorBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            })
    }

    pub async fn register(&self, username: &str, password: &str) -> ClientResult<AuthResponse> {
        let response = self
            .request(Method::POST, "/api/auth/register")
            .json(&RegisterRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        Self::read_json(response).await
    }

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<AuthResponse> {
        let response = self
            .request(Method::POST, "/api/auth/login")
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        Self::read_json(response).await
    }

    pub async fn me(&self) -> ClientResult<UserSummary> {
        let response = self.request(Method::GET, "/api/auth/me").send().await?;
        Self::read_json(response).await
    }

    pub async fn create_board(&self, request: &CreateBoardRequest) -> ClientResult<AddBoardResult> {
        let response = self
            .request(Method::POST, "/api/boards")
            .json(request)
            .send()
            .await?;
        Self::read_json(response).await
    }

    pub async fn boards(&self) -> ClientResult<Vec<BoardSummary>> {
        let response = self.request(Method::GET, "/api/boards").send().await?;
        Self::read_json(response).await
    }

    pub async fn board(&self, board_id: BoardID) -> ClientResult<Board> {
        let response = self
            .request(Method::GET, &format!("/api/boards/{}", board_id))
            .send()
            .await?;
        Self::read_json(response).await
    }

    pub async fn delete_board(&self, board_id: BoardID) -> ClientResult<()> {
        let response = self
            .request(Method::DELETE, &format!("/api/boards/{}", board_id))
            .send()
            .await?;
        Self::read_empty(response).await
    }

    pub async fn create_task(&self, request: &CreateTaskRequest) -> ClientResult<AddTaskResult> {
        let response = self
            .request(Method::POST, "/api/tasks")
            .json(request)
            .send()
            .await?;
        Self::read_json(response).await
    }

    pub async fn update_task(
        &self,
        task_id: TaskID,
        request: &UpdateTaskRequest,
    ) -> ClientResult<Task> {
        let response = self
            .request(Method::PUT, &format!("/api/tasks/{}", task_id))
            .json(request)
            .send()
            .await?;
        Self::read_json(response).await
    }

    pub async fn delete_task(&self, task_id: TaskID) -> ClientResult<()> {
        let response = self
            .request(Method::DELETE, &format!("/api/tasks/{}", task_id))
            .send()
            .await?;
        Self::read_empty(response).await
    }

    /// Fetches a board and its tasks and assembles the client-side snapshot.
    pub async fn board_snapshot(&self, board_id: BoardID) -> ClientResult<BoardSnapshot> {
        let board = self.board(board_id).await?;
        let tasks = BoardApi::board_tasks(self, board_id).await?;
        Ok(BoardSnapshot::new(board_id, board.columns, tasks))
    }
}

#[async_trait]
impl BoardApi for RestClient {
    async fn move_task(&self, task_id: TaskID, status: &str, order: i64) -> ClientResult<Task> {
        let response = self
            .request(Method::PATCH, &format!("/api/tasks/{}/move", task_id))
            .json(&MoveTaskRequest { status, order })
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn update_orders(&self, board_id: BoardID, updates: &[OrderUpdate]) -> ClientResult<()> {
        let response = self
            .request(
                Method::PATCH,
                &format!("/api/tasks/board/{}/orders", board_id),
            )
            .json(&UpdateOrdersRequest { updates })
            .send()
            .await?;

        // The body is only a `{success, message}` envelope.
        let body: MessageResponse = Self::read_json(response).await?;
        if !body.success {
            return Err(ClientError::InvalidResponse(body.message));
        }
        Ok(())
    }

    async fn board_tasks(&self, board_id: BoardID) -> ClientResult<Vec<Task>> {
        let response = self
            .request(Method::GET, &format!("/api/tasks/board/{}", board_id))
            .send()
            .await?;
        Self::read_json(response).await
    }
}
