//! Todo route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use copperline_core::TodoId;

use super::Deleted;
use crate::db::todos::TodoOptions;
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::Todo;
use crate::services;
use crate::services::todos::TodoInput;
use crate::services::views;
use crate::state::AppState;

/// Build the todos router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list).post(create))
        .route("/todos/count", get(count))
        .route("/todos/{id}", get(show).put(update).delete(destroy))
        .route("/todos/{id}/toggle", post(toggle))
}

/// Query string for todo listings.
#[derive(Debug, Deserialize)]
pub struct TodoListQuery {
    pub completed: Option<bool>,
    pub limit: Option<i64>,
}

/// Body for the toggle endpoint.
#[derive(Debug, Deserialize)]
pub struct ToggleBody {
    pub completed: bool,
}

/// Response for a persisted todo.
#[derive(Debug, Serialize)]
pub struct TodoSaved {
    pub success: bool,
    pub todo: Todo,
    pub invalidated: Vec<String>,
}

async fn list(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Query(query): Query<TodoListQuery>,
) -> Result<Json<Vec<Todo>>> {
    let options = TodoOptions {
        completed: query.completed,
        limit: query.limit,
    };
    let todos = services::todos::get_todos(&state, user.as_ref(), options).await?;
    Ok(Json(todos))
}

async fn count(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
) -> Result<Json<i64>> {
    let count = services::todos::get_todos_count(&state, user.as_ref()).await?;
    Ok(Json(count))
}

async fn show(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(id): Path<TodoId>,
) -> Result<Json<Todo>> {
    let todo = services::todos::get_todo_by_id(&state, user.as_ref(), id).await?;
    Ok(Json(todo))
}

async fn create(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Json(input): Json<TodoInput>,
) -> Result<Json<TodoSaved>> {
    let saved = services::todos::create_todo(&state, user.as_ref(), &input).await?;
    Ok(Json(TodoSaved {
        success: true,
        todo: saved.record,
        invalidated: views::paths(&saved.invalidated),
    }))
}

async fn update(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(id): Path<TodoId>,
    Json(input): Json<TodoInput>,
) -> Result<Json<TodoSaved>> {
    let saved = services::todos::update_todo(&state, user.as_ref(), id, &input).await?;
    Ok(Json(TodoSaved {
        success: true,
        todo: saved.record,
        invalidated: views::paths(&saved.invalidated),
    }))
}

async fn toggle(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(id): Path<TodoId>,
    Json(body): Json<ToggleBody>,
) -> Result<Json<TodoSaved>> {
    let saved =
        services::todos::toggle_todo(&state, user.as_ref(), id, body.completed).await?;
    Ok(Json(TodoSaved {
        success: true,
        todo: saved.record,
        invalidated: views::paths(&saved.invalidated),
    }))
}

async fn destroy(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(id): Path<TodoId>,
) -> Result<Json<Deleted>> {
    let deleted = services::todos::delete_todo(&state, user.as_ref(), id).await?;
    Ok(Json(Deleted {
        success: true,
        invalidated: views::paths(&deleted.invalidated),
    }))
}
