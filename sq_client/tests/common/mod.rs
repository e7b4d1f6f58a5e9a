//! In-process mock of the Study Quest backend for client tests.

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

pub const TOKEN: &str = "test-token";
pub const PASSWORD: &str = "secret";

/// What the mock backend has observed and its mutable state.
#[derive(Debug, Default)]
pub struct BackendState {
    pub completed: bool,
    pub logout_calls: usize,
    pub last_task_date: Option<String>,
    pub last_period: Option<String>,
    pub created: Vec<Value>,
}

#[derive(Clone, Default)]
pub struct Backend {
    pub state: Arc<Mutex<BackendState>>,
}

pub fn user_json(level: i64, total_points: i64) -> Value {
    json!({
        "id": 1,
        "email": "me@example.com",
        "username": "me",
        "level": level,
        "total_points": total_points,
        "created_at": "2024-04-01T09:30:00",
        "week_points": 40
    })
}

pub fn task_json(id: i64, date: &str, completed: bool) -> Value {
    json!({
        "id": id,
        "user_id": 1,
        "date": date,
        "completed": completed,
        "created_at": "2024-05-06T08:00:00",
        "task_type": {"id": 3, "category": "Exam", "name": "Mock test", "points": 30}
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": "Token expired"})))
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] == PASSWORD && body["email"] == "me@example.com" {
        (
            StatusCode::OK,
            Json(json!({"access_token": TOKEN, "user": user_json(1, 150)})),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid email or password"})),
        )
    }
}

async fn register(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["username"] == "taken" {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": "Username already exists"})),
        );
    }
    let mut user = user_json(1, 0);
    user["username"] = body["username"].clone();
    user["email"] = body["email"].clone();
    (StatusCode::CREATED, Json(json!({"access_token": TOKEN, "user": user})))
}

async fn logout(State(backend): State<Backend>) -> (StatusCode, Json<Value>) {
    backend.state.lock().unwrap().logout_calls += 1;
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "boom"})))
}

async fn me(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    (StatusCode::OK, Json(user_json(1, 150)))
}

async fn list_tasks(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    let date = query.get("date").cloned().unwrap_or_else(|| "2024-05-06".to_string());
    let mut state = backend.state.lock().unwrap();
    state.last_task_date = Some(date.clone());
    (
        StatusCode::OK,
        Json(json!([task_json(10, &date, state.completed), task_json(11, &date, false)])),
    )
}

async fn create_task(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    let date = body["date"].as_str().unwrap_or_default().to_string();
    let task = task_json(20, &date, false);
    backend.state.lock().unwrap().created.push(body);
    (StatusCode::CREATED, Json(task))
}

async fn delete_task(headers: HeaderMap, Path(id): Path<i64>) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id == 404 {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "Task not found"})));
    }
    (StatusCode::OK, Json(json!({"message": format!("Task {id} deleted")})))
}

/// Completing awards 30 points by the task type, but the server applies its
/// own rules: the returned user is the only source of truth.
async fn complete_task(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = backend.state.lock().unwrap();
    state.completed = !state.completed;
    (
        StatusCode::OK,
        Json(json!({
            "task": task_json(id, "2024-05-06", state.completed),
            "user": user_json(2, 215)
        })),
    )
}

async fn task_types() -> impl IntoResponse {
    (StatusCode::OK, "definitely not json")
}

async fn checklists(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!([
            {"id": 2, "title": "Book exam", "description": "", "deadline": "2024-06-01", "order": 2, "completed": false},
            {"id": 1, "title": "Get ID photo", "description": "Passport size", "deadline": null, "order": 1, "completed": false}
        ])),
    )
}

async fn complete_checklist(headers: HeaderMap, Path(id): Path<i64>) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({"id": id, "title": "Get ID photo", "description": null, "deadline": null, "order": 1, "completed": true})),
    )
}

async fn rankings(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    let Some(period) = query.get("period").cloned() else {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "period required"})));
    };
    backend.state.lock().unwrap().last_period = Some(period.clone());
    let rows = if period == "all" {
        json!([
            {"rank": 1, "username": "kana", "level": 13, "total_points": 1320},
            {"rank": 2, "username": "me", "level": 2, "total_points": 215}
        ])
    } else {
        json!([
            {"rank": 1, "username": "kana", "level": 13, "points": 180, "total_points": 1320},
            {"rank": 2, "username": "riku", "level": 4, "points": 95},
            {"rank": 3, "username": "me", "level": 2, "points": 40, "total_points": 215}
        ])
    };
    (StatusCode::OK, Json(rows))
}

async fn top_rankings(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    let rows: Vec<Value> = (1..=8)
        .map(|rank| json!({"rank": rank, "username": format!("user{rank}"), "level": 1, "total_points": 1000 - rank * 10}))
        .collect();
    (StatusCode::OK, Json(Value::Array(rows)))
}

async fn my_profile(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    (StatusCode::OK, Json(user_json(2, 230)))
}

async fn user_profile(Path(id): Path<i64>) -> impl IntoResponse {
    if id == 7 {
        let mut user = user_json(4, 420);
        user["id"] = json!(7);
        user["username"] = json!("riku");
        return (StatusCode::OK, Json(user)).into_response();
    }
    (StatusCode::NOT_FOUND, "").into_response()
}

/// Start the mock backend on an ephemeral port and return its base URL.
pub async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/{id}", delete(delete_task))
        .route("/api/tasks/{id}/complete", put(complete_task))
        .route("/api/task-types", get(task_types))
        .route("/api/checklists", get(checklists))
        .route("/api/checklists/{id}/complete", put(complete_checklist))
        .route("/api/rankings", get(rankings))
        .route("/api/rankings/top", get(top_rankings))
        .route("/api/users/profile", get(my_profile))
        .route("/api/users/{id}/profile", get(user_profile))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().expect("Mock backend has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock backend crashed");
    });

    (format!("http://{addr}"), backend)
}
