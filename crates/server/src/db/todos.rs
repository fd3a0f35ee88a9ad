//! Todo repository for database operations.

use sqlx::PgPool;

use copperline_core::{TodoId, UserId};

use super::RepositoryError;
use crate::models::Todo;

/// Filter options for todo listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TodoOptions {
    /// When set, only todos with this completion state.
    pub completed: Option<bool>,
    pub limit: Option<i64>,
}

/// Repository for todo database operations.
pub struct TodoRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TodoRepository<'a> {
    /// Create a new todo repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List todos, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        options: TodoOptions,
    ) -> Result<Vec<Todo>, RepositoryError> {
        let todos = sqlx::query_as::<_, Todo>(
            r"
            SELECT id, title, completed, created_at
            FROM todos
            WHERE user_id = $1
              AND ($2::boolean IS NULL OR completed = $2)
            ORDER BY created_at DESC
            LIMIT $3
            ",
        )
        .bind(user_id)
        .bind(options.completed)
        .bind(options.limit)
        .fetch_all(self.pool)
        .await?;

        Ok(todos)
    }

    /// Count the user's todos.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*)
            FROM todos
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count.0)
    }

    /// Get a single todo, scoped by owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        user_id: UserId,
        id: TodoId,
    ) -> Result<Option<Todo>, RepositoryError> {
        let todo = sqlx::query_as::<_, Todo>(
            r"
            SELECT id, title, completed, created_at
            FROM todos
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(todo)
    }

    /// Insert a new todo owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, user_id: UserId, title: &str) -> Result<Todo, RepositoryError> {
        let todo = sqlx::query_as::<_, Todo>(
            r"
            INSERT INTO todos (id, user_id, title)
            VALUES ($1, $2, $3)
            RETURNING id, title, completed, created_at
            ",
        )
        .bind(TodoId::generate())
        .bind(user_id)
        .bind(title)
        .fetch_one(self.pool)
        .await?;

        Ok(todo)
    }

    /// Rename a todo, scoped by owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the todo doesn't exist or
    /// isn't owned by `user_id`.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_title(
        &self,
        user_id: UserId,
        id: TodoId,
        title: &str,
    ) -> Result<Todo, RepositoryError> {
        let todo = sqlx::query_as::<_, Todo>(
            r"
            UPDATE todos
            SET title = $1
            WHERE id = $2 AND user_id = $3
            RETURNING id, title, completed, created_at
            ",
        )
        .bind(title)
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(todo)
    }

    /// Set a todo's completion flag, scoped by owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the todo doesn't exist or
    /// isn't owned by `user_id`.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_completed(
        &self,
        user_id: UserId,
        id: TodoId,
        completed: bool,
    ) -> Result<Todo, RepositoryError> {
        let todo = sqlx::query_as::<_, Todo>(
            r"
            UPDATE todos
            SET completed = $1
            WHERE id = $2 AND user_id = $3
            RETURNING id, title, completed, created_at
            ",
        )
        .bind(completed)
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(todo)
    }

    /// Delete a todo, scoped by owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the todo doesn't exist or
    /// isn't owned by `user_id`.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, user_id: UserId, id: TodoId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM todos
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
