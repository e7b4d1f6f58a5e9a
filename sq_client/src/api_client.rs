//! HTTP API client for the Study Quest backend.

use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use std::time::{Duration, Instant};
use study_quest::{
    models::{
        AuthResponse, ChecklistItem, MessageResponse, RankingPeriod, RankingUser, Task, TaskCompletion, TaskType, User,
        UserId,
    },
    schedule::format_date,
};
use thiserror::Error;

use crate::config::ClientConfig;

/// Errors surfaced by backend calls.
///
/// Every variant displays as a message fit to show the user as-is.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-success status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The request never reached the backend
    #[error("Network error: unable to reach {url}")]
    Connection { url: String, source: reqwest::Error },

    /// The backend answered with a body we cannot decode
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// The call needs a session token and there is none
    #[error("Not logged in")]
    NotAuthenticated,

    /// The HTTP client could not be built
    #[error("Failed to initialise HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// HTTP status, when the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend rejected our credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::NotAuthenticated) || self.status() == Some(401)
    }
}

/// Result type for API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Human-readable message for an error response.
///
/// Prefers the body's `message`, then its `error`, then the status text.
pub fn error_message(status: StatusCode, body: &str) -> String {
    let from_body = serde_json::from_str::<serde_json::Value>(body).ok().and_then(|value| {
        ["message", "error"].iter().find_map(|field| {
            value
                .get(field)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    });

    from_body.unwrap_or_else(|| {
        format!(
            "Request failed: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown status")
        )
    })
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateTaskRequest {
    task_type_id: i64,
    date: String,
}

/// API client for communicating with the Study Quest backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    access_token: Option<String>,
}

impl ApiClient {
    /// Create a new API client with default HTTP settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            access_token: None,
        }
    }

    /// Create a client from configuration, applying its request timeout
    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        Self::with_timeout(&config.api_url, config.timeout)
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            access_token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current bearer token
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Replace the bearer token sent with authenticated calls
    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token;
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
    }

    fn authed(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let token = self.access_token.as_ref().ok_or(ApiError::NotAuthenticated)?;
        Ok(self
            .request(method, path)
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token)))
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder, method: Method, path: &str) -> ApiResult<T> {
        let start = Instant::now();
        let response = builder.send().await.map_err(|source| {
            tracing::warn!(http_method = %method, http_path = path, error = %source, "API request failed to send");
            ApiError::Connection {
                url: self.base_url.clone(),
                source,
            }
        })?;

        let status = response.status();
        tracing::debug!(
            http_method = %method,
            http_path = path,
            http_status = status.as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "API request completed"
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let builder = self.authed(Method::GET, path)?;
        self.execute(builder, Method::GET, path).await
    }

    async fn put<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let builder = self.authed(Method::PUT, path)?;
        self.execute(builder, Method::PUT, path).await
    }

    // === Auth ===

    /// Register a new account and keep its token
    pub async fn register(&mut self, email: &str, username: &str, password: &str) -> ApiResult<AuthResponse> {
        let path = "/api/auth/register";
        let builder = self.request(Method::POST, path).json(&RegisterRequest {
            email,
            username,
            password,
        });
        let auth: AuthResponse = self.execute(builder, Method::POST, path).await?;
        self.access_token = Some(auth.access_token.clone());
        Ok(auth)
    }

    /// Login with email and password and keep the token
    pub async fn login(&mut self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        let path = "/api/auth/login";
        let builder = self
            .request(Method::POST, path)
            .json(&LoginRequest { email, password });
        let auth: AuthResponse = self.execute(builder, Method::POST, path).await?;
        self.access_token = Some(auth.access_token.clone());
        Ok(auth)
    }

    /// Invalidate the session server-side; the local token is dropped either way
    pub async fn logout(&mut self) -> ApiResult<MessageResponse> {
        let path = "/api/auth/logout";
        let result = match self.authed(Method::POST, path) {
            Ok(builder) => self.execute(builder, Method::POST, path).await,
            Err(e) => Err(e),
        };
        self.access_token = None;
        result
    }

    /// The user the current token belongs to
    pub async fn current_user(&self) -> ApiResult<User> {
        self.get("/api/auth/me").await
    }

    // === Tasks ===

    /// Tasks for a day, or every task when `date` is `None`
    pub async fn tasks(&self, date: Option<NaiveDate>) -> ApiResult<Vec<Task>> {
        match date {
            Some(date) => self.get(&format!("/api/tasks?date={}", format_date(date))).await,
            None => self.get("/api/tasks").await,
        }
    }

    pub async fn create_task(&self, task_type_id: i64, date: NaiveDate) -> ApiResult<Task> {
        let path = "/api/tasks";
        let builder = self.authed(Method::POST, path)?.json(&CreateTaskRequest {
            task_type_id,
            date: format_date(date),
        });
        self.execute(builder, Method::POST, path).await
    }

    pub async fn delete_task(&self, task_id: i64) -> ApiResult<MessageResponse> {
        let path = format!("/api/tasks/{}", task_id);
        let builder = self.authed(Method::DELETE, &path)?;
        self.execute(builder, Method::DELETE, &path).await
    }

    /// Toggle completion; the response carries the updated user
    pub async fn complete_task(&self, task_id: i64) -> ApiResult<TaskCompletion> {
        self.put(&format!("/api/tasks/{}/complete", task_id)).await
    }

    pub async fn task_types(&self) -> ApiResult<Vec<TaskType>> {
        self.get("/api/task-types").await
    }

    // === Checklists ===

    pub async fn checklists(&self) -> ApiResult<Vec<ChecklistItem>> {
        self.get("/api/checklists").await
    }

    pub async fn complete_checklist(&self, checklist_id: i64) -> ApiResult<ChecklistItem> {
        self.put(&format!("/api/checklists/{}/complete", checklist_id)).await
    }

    // === Profile ===

    pub async fn my_profile(&self) -> ApiResult<User> {
        self.get("/api/users/profile").await
    }

    pub async fn user_profile(&self, user_id: UserId) -> ApiResult<User> {
        self.get(&format!("/api/users/{}/profile", user_id)).await
    }

    // === Rankings ===

    pub async fn rankings(&self, period: RankingPeriod) -> ApiResult<Vec<RankingUser>> {
        self.get(&format!("/api/rankings?period={}", period)).await
    }

    pub async fn top_rankings(&self) -> ApiResult<Vec<RankingUser>> {
        self.get("/api/rankings/top").await
    }
}
