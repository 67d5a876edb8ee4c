//! In-process stub of the task backend
//!
//! Speaks the same routes and JSON shapes as the real service, keeps
//! everything in memory, and records the `Authorization` header of each
//! request it sees. Only compiled for tests or with `test-support`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use taskdeck_core::{
    DayStat, JwtResponse, LoginRequest, SignupRequest, StatEntry, Task, TaskRequest, TaskStats,
    UserProfile,
};

/// Password the stub accepts for every user
pub const STUB_PASSWORD: &str = "secret";

#[derive(Default)]
struct StubState {
    /// token -> profile
    tokens: HashMap<String, UserProfile>,
    /// username -> id
    users: HashMap<String, i64>,
    tasks: Vec<Task>,
    next_task_id: i64,
    seen_authorization: Vec<Option<String>>,
}

type Shared = Arc<Mutex<StubState>>;

/// Handle to a running stub backend
#[derive(Clone)]
pub struct StubBackend {
    pub url: String,
    state: Shared,
}

impl StubBackend {
    /// Make `token` valid for the given user
    pub fn allow_token(&self, token: &str, id: i64, username: &str) {
        let mut state = lock(&self.state);
        state.users.insert(username.to_string(), id);
        state
            .tokens
            .insert(token.to_string(), UserProfile::new(id, username));
    }

    /// Invalidate a token, as if it expired server-side
    pub fn revoke_token(&self, token: &str) {
        lock(&self.state).tokens.remove(token);
    }

    /// `Authorization` header of the most recent request
    pub fn last_authorization(&self) -> Option<String> {
        lock(&self.state).seen_authorization.last().cloned().flatten()
    }

    /// Number of requests served
    pub fn request_count(&self) -> usize {
        lock(&self.state).seen_authorization.len()
    }

    pub fn task_count(&self) -> usize {
        lock(&self.state).tasks.len()
    }
}

/// Start the stub on an ephemeral localhost port
pub async fn spawn_backend() -> StubBackend {
    let state: Shared = Arc::new(Mutex::new(StubState {
        next_task_id: 1,
        ..Default::default()
    }));

    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/users/me", get(me))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/stats", get(task_stats))
        .route("/tasks/status/stats", get(status_stats))
        .route("/tasks/priority/stats", get(priority_stats))
        .route("/tasks/new-tasks/stats", get(new_tasks_stats))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/slow", get(slow))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub backend");
    let addr = listener.local_addr().expect("stub backend address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    StubBackend {
        url: format!("http://{}", addr),
        state,
    }
}

fn lock(state: &Shared) -> std::sync::MutexGuard<'_, StubState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn record(state: &Shared, headers: &HeaderMap) -> Option<String> {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    lock(state).seen_authorization.push(auth.clone());
    auth
}

fn authorize(state: &Shared, headers: &HeaderMap) -> Result<UserProfile, StatusCode> {
    let auth = record(state, headers).ok_or(StatusCode::UNAUTHORIZED)?;
    let token = auth
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;
    lock(state)
        .tokens
        .get(token)
        .cloned()
        .ok_or(StatusCode::UNAUTHORIZED)
}

fn issue_token(state: &mut StubState, username: &str) -> JwtResponse {
    let next_id = state.users.len() as i64 + 1;
    let id = *state.users.entry(username.to_string()).or_insert(next_id);
    let token = format!("tok-{}-{}", username, state.tokens.len() + 1);
    state
        .tokens
        .insert(token.clone(), UserProfile::new(id, username));
    JwtResponse {
        token,
        token_type: "Bearer".to_string(),
    }
}

async fn login(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<Json<JwtResponse>, StatusCode> {
    record(&state, &headers);
    let mut state = lock(&state);
    if req.password != STUB_PASSWORD || !state.users.contains_key(&req.username) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(issue_token(&mut state, &req.username)))
}

async fn register(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(req): Json<SignupRequest>,
) -> Result<Json<JwtResponse>, (StatusCode, String)> {
    record(&state, &headers);
    let mut state = lock(&state);
    if state.users.contains_key(&req.username) {
        return Err((StatusCode::CONFLICT, "username taken".to_string()));
    }
    Ok(Json(issue_token(&mut state, &req.username)))
}

async fn me(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, StatusCode> {
    authorize(&state, &headers).map(Json)
}

async fn list_tasks(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Vec<Task>>, StatusCode> {
    let user = authorize(&state, &headers)?;
    let tasks = lock(&state)
        .tasks
        .iter()
        .filter(|t| t.user_id == user.id)
        .cloned()
        .collect();
    Ok(Json(tasks))
}

async fn create_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(req): Json<TaskRequest>,
) -> Result<(StatusCode, Json<Task>), StatusCode> {
    let user = authorize(&state, &headers)?;
    let mut state = lock(&state);
    let task = Task {
        id: state.next_task_id,
        title: req.title,
        description: req.description,
        task_status: req.status,
        priority: req.priority,
        due_date: req.due_date,
        user_id: user.id,
    };
    state.next_task_id += 1;
    state.tasks.push(task.clone());
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Task>, (StatusCode, String)> {
    authorize(&state, &headers).map_err(|s| (s, String::new()))?;
    lock(&state)
        .tasks
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Task not found with id: {}", id)))
}

async fn update_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<TaskRequest>,
) -> Result<Json<Task>, StatusCode> {
    authorize(&state, &headers)?;
    let mut state = lock(&state);
    let task = state
        .tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    task.title = req.title;
    task.description = req.description;
    task.task_status = req.status;
    task.priority = req.priority;
    task.due_date = req.due_date;
    Ok(Json(task.clone()))
}

async fn delete_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Task>, StatusCode> {
    authorize(&state, &headers)?;
    let mut state = lock(&state);
    let index = state
        .tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(state.tasks.remove(index)))
}

async fn task_stats(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<TaskStats>, StatusCode> {
    authorize(&state, &headers)?;
    Ok(Json(TaskStats {
        completed_count: 3,
        total_count: 10,
    }))
}

async fn status_stats(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Vec<StatEntry>>, StatusCode> {
    authorize(&state, &headers)?;
    Ok(Json(vec![
        StatEntry {
            name: "NEW".to_string(),
            count: 4,
        },
        StatEntry {
            name: "IN_PROGRESS".to_string(),
            count: 3,
        },
        StatEntry {
            name: "COMPLETED".to_string(),
            count: 3,
        },
    ]))
}

async fn priority_stats(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, StatusCode> {
    authorize(&state, &headers)?;
    // Priority names arrive as numbers from the real backend
    Ok(Json(serde_json::json!([
        {"name": 1, "count": 5},
        {"name": 2, "count": 3},
        {"name": 4, "count": 2}
    ])))
}

async fn new_tasks_stats(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Vec<DayStat>>, StatusCode> {
    authorize(&state, &headers)?;
    Ok(Json(vec![
        DayStat {
            day: "Mon".to_string(),
            count: 2,
        },
        DayStat {
            day: "Thu".to_string(),
            count: 1,
        },
    ]))
}

async fn slow(State(state): State<Shared>, headers: HeaderMap) -> Json<serde_json::Value> {
    record(&state, &headers);
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(serde_json::json!({}))
}
