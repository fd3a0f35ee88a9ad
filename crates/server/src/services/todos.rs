//! Todo operations: gateway mutations and scoped queries.

use serde::Deserialize;

use copperline_core::TodoId;

use super::views::ViewKey;
use super::{ActionError, ActionResult, Mutated, require_user, validate};
use crate::db::TodoRepository;
use crate::db::todos::TodoOptions;
use crate::models::{CurrentUser, Todo};
use crate::state::AppState;

/// Views staled by any todo mutation.
const TODO_VIEWS: [ViewKey; 2] = [ViewKey::Dashboard, ViewKey::Todos];

/// Editable todo fields as submitted by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct TodoInput {
    pub title: String,
}

/// Create a new todo.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Validation` on a blank title, `Store`
/// on database failure.
pub async fn create_todo(
    state: &AppState,
    user: Option<&CurrentUser>,
    input: &TodoInput,
) -> ActionResult<Mutated<Todo>> {
    let user = require_user(user)?;
    let title = validate::required_trimmed(&input.title, "Title is required")?;

    let todo = TodoRepository::new(state.pool())
        .create(user.id, &title)
        .await?;

    let invalidated = TODO_VIEWS.to_vec();
    state.views().invalidate(user.id, &invalidated).await;

    Ok(Mutated {
        record: todo,
        invalidated,
    })
}

/// Rename a todo.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Validation` on a blank title,
/// `NotFound` for a missing or foreign row, `Store` on database failure.
pub async fn update_todo(
    state: &AppState,
    user: Option<&CurrentUser>,
    id: TodoId,
    input: &TodoInput,
) -> ActionResult<Mutated<Todo>> {
    let user = require_user(user)?;
    let title = validate::required_trimmed(&input.title, "Title is required")?;

    let todo = TodoRepository::new(state.pool())
        .update_title(user.id, id, &title)
        .await?;

    let invalidated = TODO_VIEWS.to_vec();
    state.views().invalidate(user.id, &invalidated).await;

    Ok(Mutated {
        record: todo,
        invalidated,
    })
}

/// Set a todo's completion flag.
///
/// # Errors
///
/// `Unauthorized` without a caller, `NotFound` for a missing or foreign
/// row, `Store` on database failure.
pub async fn toggle_todo(
    state: &AppState,
    user: Option<&CurrentUser>,
    id: TodoId,
    completed: bool,
) -> ActionResult<Mutated<Todo>> {
    let user = require_user(user)?;

    let todo = TodoRepository::new(state.pool())
        .set_completed(user.id, id, completed)
        .await?;

    let invalidated = TODO_VIEWS.to_vec();
    state.views().invalidate(user.id, &invalidated).await;

    Ok(Mutated {
        record: todo,
        invalidated,
    })
}

/// Delete a todo.
///
/// # Errors
///
/// `Unauthorized` without a caller, `NotFound` for a missing or foreign
/// row, `Store` on database failure.
pub async fn delete_todo(
    state: &AppState,
    user: Option<&CurrentUser>,
    id: TodoId,
) -> ActionResult<Mutated<()>> {
    let user = require_user(user)?;

    TodoRepository::new(state.pool()).delete(user.id, id).await?;

    let invalidated = TODO_VIEWS.to_vec();
    state.views().invalidate(user.id, &invalidated).await;

    Ok(Mutated {
        record: (),
        invalidated,
    })
}

/// List todos, optionally filtered by completion.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Store` on database failure.
pub async fn get_todos(
    state: &AppState,
    user: Option<&CurrentUser>,
    options: TodoOptions,
) -> ActionResult<Vec<Todo>> {
    let user = require_user(user)?;
    Ok(TodoRepository::new(state.pool())
        .list(user.id, options)
        .await?)
}

/// Count the caller's todos.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Store` on database failure.
pub async fn get_todos_count(state: &AppState, user: Option<&CurrentUser>) -> ActionResult<i64> {
    let user = require_user(user)?;
    Ok(TodoRepository::new(state.pool()).count(user.id).await?)
}

/// Fetch one todo.
///
/// # Errors
///
/// `Unauthorized` without a caller, `NotFound` for a missing or foreign
/// row, `Store` on database failure.
pub async fn get_todo_by_id(
    state: &AppState,
    user: Option<&CurrentUser>,
    id: TodoId,
) -> ActionResult<Todo> {
    let user = require_user(user)?;
    TodoRepository::new(state.pool())
        .get_by_id(user.id, id)
        .await?
        .ok_or(ActionError::NotFound)
}
