//! Deal repository for database operations.
//!
//! Listing queries join the stage and contact tables so the pipeline board
//! and deal lists render without N+1 fetches.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use copperline_core::{ContactId, DealId, StageId, UserId};

use super::RepositoryError;
use super::activities::ActivityRepository;
use crate::models::{
    ContactSummary, Deal, DealDetail, DealWithRelations, StageDealCount, StageDealValue,
    StageSummary,
};

/// Filter options for deal listings.
#[derive(Debug, Clone, Default)]
pub struct DealsFilter {
    pub stage_id: Option<StageId>,
    pub contact_id: Option<ContactId>,
    /// Case-insensitive substring match across title and description.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Editable deal fields, already validated and trimmed.
#[derive(Debug, Clone)]
pub struct DealRecord {
    pub title: String,
    pub description: Option<String>,
    pub value: Option<Decimal>,
    pub stage_id: StageId,
    pub contact_id: Option<ContactId>,
}

/// Internal row type for joined deal queries.
#[derive(Debug, sqlx::FromRow)]
struct DealRow {
    id: DealId,
    title: String,
    description: Option<String>,
    value: Option<Decimal>,
    stage_id: StageId,
    contact_id: Option<ContactId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    contact_name: Option<String>,
    contact_email: Option<String>,
    stage_name: String,
    stage_order_index: i32,
}

impl From<DealRow> for DealWithRelations {
    fn from(row: DealRow) -> Self {
        let contact = match (row.contact_id, row.contact_name) {
            (Some(id), Some(name)) => Some(ContactSummary {
                id,
                name,
                email: row.contact_email,
            }),
            _ => None,
        };

        Self {
            deal: Deal {
                id: row.id,
                title: row.title,
                description: row.description,
                value: row.value,
                stage_id: row.stage_id,
                contact_id: row.contact_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            contact,
            stage: StageSummary {
                id: row.stage_id,
                name: row.stage_name,
                order_index: row.stage_order_index,
            },
        }
    }
}

/// Internal row type for per-stage aggregates.
#[derive(Debug, sqlx::FromRow)]
struct StageCountRow {
    stage_id: StageId,
    stage_name: String,
    stage_order_index: i32,
    deal_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct StageValueRow {
    stage_id: StageId,
    stage_name: String,
    stage_order_index: i32,
    total_value: Decimal,
}

const DEAL_SELECT: &str = r"
    SELECT d.id, d.title, d.description, d.value, d.stage_id, d.contact_id,
           d.created_at, d.updated_at,
           c.name AS contact_name, c.email AS contact_email,
           s.name AS stage_name, s.order_index AS stage_order_index
    FROM deals d
    JOIN deal_stages s ON s.id = d.stage_id
    LEFT JOIN contacts c ON c.id = d.contact_id
";

/// Repository for deal database operations.
pub struct DealRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DealRepository<'a> {
    /// Create a new deal repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List deals with their relations, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        filter: &DealsFilter,
    ) -> Result<Vec<DealWithRelations>, RepositoryError> {
        let sql = format!(
            r"
            {DEAL_SELECT}
            WHERE d.user_id = $1
              AND ($2::uuid IS NULL OR d.stage_id = $2)
              AND ($3::uuid IS NULL OR d.contact_id = $3)
              AND ($4::text IS NULL
                   OR d.title ILIKE '%' || $4 || '%'
                   OR d.description ILIKE '%' || $4 || '%')
            ORDER BY d.created_at DESC
            LIMIT $5 OFFSET COALESCE($6, 0)
            "
        );
        let rows = sqlx::query_as::<_, DealRow>(&sql)
            .bind(user_id)
            .bind(filter.stage_id)
            .bind(filter.contact_id)
            .bind(filter.search.as_deref())
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List all deals linked to a contact, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_contact(
        &self,
        user_id: UserId,
        contact_id: ContactId,
    ) -> Result<Vec<DealWithRelations>, RepositoryError> {
        let sql = format!(
            r"
            {DEAL_SELECT}
            WHERE d.user_id = $1 AND d.contact_id = $2
            ORDER BY d.created_at DESC
            "
        );
        let rows = sqlx::query_as::<_, DealRow>(&sql)
            .bind(user_id)
            .bind(contact_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a single joined deal, scoped by owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_relations(
        &self,
        user_id: UserId,
        id: DealId,
    ) -> Result<Option<DealWithRelations>, RepositoryError> {
        let sql = format!(
            r"
            {DEAL_SELECT}
            WHERE d.id = $1 AND d.user_id = $2
            "
        );
        let row = sqlx::query_as::<_, DealRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Get a single deal with its activity log.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_id(
        &self,
        user_id: UserId,
        id: DealId,
    ) -> Result<Option<DealDetail>, RepositoryError> {
        let Some(deal) = self.get_with_relations(user_id, id).await? else {
            return Ok(None);
        };

        let activities = ActivityRepository::new(self.pool)
            .for_deal(user_id, id, None)
            .await?;

        Ok(Some(DealDetail { deal, activities }))
    }

    /// Insert a new deal owned by `user_id` and return it joined.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including
    /// foreign key failures for an unknown stage or contact).
    pub async fn create(
        &self,
        user_id: UserId,
        record: &DealRecord,
    ) -> Result<DealWithRelations, RepositoryError> {
        let (id,): (DealId,) = sqlx::query_as(
            r"
            INSERT INTO deals (id, user_id, title, description, value, stage_id, contact_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(DealId::generate())
        .bind(user_id)
        .bind(&record.title)
        .bind(record.description.as_deref())
        .bind(record.value)
        .bind(record.stage_id)
        .bind(record.contact_id)
        .fetch_one(self.pool)
        .await?;

        self.get_with_relations(user_id, id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Update a deal, scoped by owner, and return it joined.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the deal doesn't exist or
    /// isn't owned by `user_id`.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        user_id: UserId,
        id: DealId,
        record: &DealRecord,
    ) -> Result<DealWithRelations, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE deals
            SET title = $1, description = $2, value = $3, stage_id = $4,
                contact_id = $5, updated_at = NOW()
            WHERE id = $6 AND user_id = $7
            ",
        )
        .bind(&record.title)
        .bind(record.description.as_deref())
        .bind(record.value)
        .bind(record.stage_id)
        .bind(record.contact_id)
        .bind(id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get_with_relations(user_id, id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Move a deal to another stage, scoped by owner, and return it joined.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the deal doesn't exist or
    /// isn't owned by `user_id`.
    /// Returns `RepositoryError::Database` for other database errors
    /// (including an unknown target stage).
    pub async fn set_stage(
        &self,
        user_id: UserId,
        id: DealId,
        stage_id: StageId,
    ) -> Result<DealWithRelations, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE deals
            SET stage_id = $1, updated_at = NOW()
            WHERE id = $2 AND user_id = $3
            ",
        )
        .bind(stage_id)
        .bind(id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get_with_relations(user_id, id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a deal, scoped by owner. Its activities cascade away.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the deal doesn't exist or
    /// isn't owned by `user_id`.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, user_id: UserId, id: DealId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM deals
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

    /// Deal counts per stage, including stages with zero deals, ordered by
    /// ascending `order_index`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_stage(
        &self,
        user_id: UserId,
    ) -> Result<Vec<StageDealCount>, RepositoryError> {
        let rows = sqlx::query_as::<_, StageCountRow>(
            r"
            SELECT s.id AS stage_id, s.name AS stage_name,
                   s.order_index AS stage_order_index,
                   COUNT(d.id) AS deal_count
            FROM deal_stages s
            LEFT JOIN deals d ON d.stage_id = s.id AND d.user_id = s.user_id
            WHERE s.user_id = $1
            GROUP BY s.id, s.name, s.order_index
            ORDER BY s.order_index ASC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| StageDealCount {
                stage: StageSummary {
                    id: row.stage_id,
                    name: row.stage_name,
                    order_index: row.stage_order_index,
                },
                count: row.deal_count,
            })
            .collect())
    }

    /// Total deal value per stage (null values contribute nothing),
    /// including stages with zero deals, ordered by ascending `order_index`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn value_by_stage(
        &self,
        user_id: UserId,
    ) -> Result<Vec<StageDealValue>, RepositoryError> {
        let rows = sqlx::query_as::<_, StageValueRow>(
            r"
            SELECT s.id AS stage_id, s.name AS stage_name,
                   s.order_index AS stage_order_index,
                   COALESCE(SUM(d.value), 0) AS total_value
            FROM deal_stages s
            LEFT JOIN deals d ON d.stage_id = s.id AND d.user_id = s.user_id
            WHERE s.user_id = $1
            GROUP BY s.id, s.name, s.order_index
            ORDER BY s.order_index ASC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| StageDealValue {
                stage: StageSummary {
                    id: row.stage_id,
                    name: row.stage_name,
                    order_index: row.stage_order_index,
                },
                total_value: row.total_value,
            })
            .collect())
    }
}
