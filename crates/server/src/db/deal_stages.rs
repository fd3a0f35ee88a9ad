//! Deal stage repository for database operations.

use sqlx::PgPool;

use copperline_core::{StageId, UserId};

use super::RepositoryError;
use crate::models::DealStage;

/// The default pipeline for a new account, left to right.
pub const DEFAULT_STAGES: [&str; 5] = ["Lead", "Qualified", "Proposal", "Negotiation", "Closed Won"];

/// Repository for deal stage database operations.
pub struct StageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StageRepository<'a> {
    /// Create a new stage repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the user's stages ordered by ascending `order_index`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<DealStage>, RepositoryError> {
        let stages = sqlx::query_as::<_, DealStage>(
            r"
            SELECT id, name, order_index, created_at, updated_at
            FROM deal_stages
            WHERE user_id = $1
            ORDER BY order_index ASC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(stages)
    }

    /// Get a single stage, scoped by owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        user_id: UserId,
        id: StageId,
    ) -> Result<Option<DealStage>, RepositoryError> {
        let stage = sqlx::query_as::<_, DealStage>(
            r"
            SELECT id, name, order_index, created_at, updated_at
            FROM deal_stages
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(stage)
    }

    /// Create a stage. `order_index` is unique per user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order index is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        name: &str,
        order_index: i32,
    ) -> Result<DealStage, RepositoryError> {
        let stage = sqlx::query_as::<_, DealStage>(
            r"
            INSERT INTO deal_stages (id, user_id, name, order_index)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, order_index, created_at, updated_at
            ",
        )
        .bind(StageId::generate())
        .bind(user_id)
        .bind(name)
        .bind(order_index)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!(
                    "stage order {order_index} already in use"
                ));
            }
            RepositoryError::Database(e)
        })?;

        Ok(stage)
    }

    /// Create the default stage set for an account that has none yet.
    /// Returns the user's stages either way.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn seed_defaults(&self, user_id: UserId) -> Result<Vec<DealStage>, RepositoryError> {
        if self.count(user_id).await? > 0 {
            return self.list(user_id).await;
        }

        let mut stages = Vec::with_capacity(DEFAULT_STAGES.len());
        for (order_index, name) in (1_i32..).zip(DEFAULT_STAGES) {
            stages.push(self.create(user_id, name, order_index).await?);
        }
        Ok(stages)
    }

    /// Count the user's stages.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*)
            FROM deal_stages
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count.0)
    }
}
