use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::Local;
use futures::{SinkExt, StreamExt};
use shared::{
    domain::{Task, TaskId},
    error::{ApiError, ErrorCode},
    protocol::{CreateTaskRequest, UpdateTaskRequest},
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::app_state::AppState;

pub const CLOCK_FORMAT: &str = "%H:%M:%S";

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/todos", get(http_list_tasks).post(http_create_task))
        .route(
            "/api/todos/:id",
            put(http_update_task).delete(http_delete_task),
        )
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(state)
}

fn error_response(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    Json(state.board.list_tasks().await)
}

async fn http_create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state
        .board
        .create_task(&req.title)
        .await
        .map_err(error_response)?;
    info!(task_id = %task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

async fn http_update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let task = state
        .board
        .update_task(&TaskId(id), req)
        .await
        .map_err(error_response)?;
    info!(task_id = %task.id, completed = task.completed, "task updated");
    Ok(Json(task))
}

async fn http_delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = TaskId(id);
    state
        .board
        .delete_task(&id)
        .await
        .map_err(error_response)?;
    info!(task_id = %id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| clock_connection(state, socket))
}

async fn clock_connection(state: AppState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let interval = state.clock_interval;
    debug!(interval_ms = interval.as_millis() as u64, "clock subscriber connected");

    let send_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let now = Local::now().format(CLOCK_FORMAT).to_string();
            if sender.send(Message::Text(now)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = receiver.next().await {
        if let Message::Close(_) = msg {
            break;
        }
    }

    send_task.abort();
    debug!("clock subscriber disconnected");
}

#[cfg(test)]
#[path = "tests/routes_tests.rs"]
mod tests;
