//! Activity repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use copperline_core::{ActivityId, ActivityKind, ContactId, DealId, UserId};

use super::RepositoryError;
use crate::models::{Activity, ActivityTypeCount, ActivityWithRelations, ContactSummary, DealRef};

/// Filter options for activity listings.
#[derive(Debug, Clone, Default)]
pub struct ActivitiesFilter {
    pub contact_id: Option<ContactId>,
    pub deal_id: Option<DealId>,
    pub kind: Option<ActivityKind>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Editable activity fields, already validated and trimmed.
#[derive(Debug, Clone)]
pub struct ActivityRecord {
    pub content: String,
    pub kind: ActivityKind,
    pub contact_id: Option<ContactId>,
    pub deal_id: Option<DealId>,
}

/// Links an activity carried at deletion time, for view invalidation.
#[derive(Debug, Clone, Copy)]
pub struct ActivityLinks {
    pub contact_id: Option<ContactId>,
    pub deal_id: Option<DealId>,
}

/// Internal row type for joined activity queries.
#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    id: ActivityId,
    content: String,
    kind: ActivityKind,
    contact_id: Option<ContactId>,
    deal_id: Option<DealId>,
    created_at: DateTime<Utc>,
    contact_name: Option<String>,
    contact_email: Option<String>,
    deal_title: Option<String>,
}

impl From<ActivityRow> for ActivityWithRelations {
    fn from(row: ActivityRow) -> Self {
        let contact = match (row.contact_id, row.contact_name) {
            (Some(id), Some(name)) => Some(ContactSummary {
                id,
                name,
                email: row.contact_email,
            }),
            _ => None,
        };
        let deal = match (row.deal_id, row.deal_title) {
            (Some(id), Some(title)) => Some(DealRef { id, title }),
            _ => None,
        };

        Self {
            activity: Activity {
                id: row.id,
                content: row.content,
                kind: row.kind,
                contact_id: row.contact_id,
                deal_id: row.deal_id,
                created_at: row.created_at,
            },
            contact,
            deal,
        }
    }
}

const ACTIVITY_SELECT: &str = r"
    SELECT a.id, a.content, a.type AS kind, a.contact_id, a.deal_id, a.created_at,
           c.name AS contact_name, c.email AS contact_email,
           d.title AS deal_title
    FROM activities a
    LEFT JOIN contacts c ON c.id = a.contact_id
    LEFT JOIN deals d ON d.id = a.deal_id
";

/// Repository for activity database operations.
pub struct ActivityRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ActivityRepository<'a> {
    /// Create a new activity repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List activities with their relations, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        filter: &ActivitiesFilter,
    ) -> Result<Vec<ActivityWithRelations>, RepositoryError> {
        let sql = format!(
            r"
            {ACTIVITY_SELECT}
            WHERE a.user_id = $1
              AND ($2::uuid IS NULL OR a.contact_id = $2)
              AND ($3::uuid IS NULL OR a.deal_id = $3)
              AND ($4::text IS NULL OR a.type = $4)
            ORDER BY a.created_at DESC
            LIMIT $5 OFFSET COALESCE($6, 0)
            "
        );
        let rows = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(user_id)
            .bind(filter.contact_id)
            .bind(filter.deal_id)
            .bind(filter.kind.map(|k| k.as_str()))
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List activities for a specific contact, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_contact(
        &self,
        user_id: UserId,
        contact_id: ContactId,
        limit: Option<i64>,
    ) -> Result<Vec<ActivityWithRelations>, RepositoryError> {
        let sql = format!(
            r"
            {ACTIVITY_SELECT}
            WHERE a.user_id = $1 AND a.contact_id = $2
            ORDER BY a.created_at DESC
            LIMIT $3
            "
        );
        let rows = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(user_id)
            .bind(contact_id)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List activities for a specific deal, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_deal(
        &self,
        user_id: UserId,
        deal_id: DealId,
        limit: Option<i64>,
    ) -> Result<Vec<ActivityWithRelations>, RepositoryError> {
        let sql = format!(
            r"
            {ACTIVITY_SELECT}
            WHERE a.user_id = $1 AND a.deal_id = $2
            ORDER BY a.created_at DESC
            LIMIT $3
            "
        );
        let rows = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(user_id)
            .bind(deal_id)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// The most recent activities across the account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<ActivityWithRelations>, RepositoryError> {
        let sql = format!(
            r"
            {ACTIVITY_SELECT}
            WHERE a.user_id = $1
            ORDER BY a.created_at DESC
            LIMIT $2
            "
        );
        let rows = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a single activity with its relations, scoped by owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        user_id: UserId,
        id: ActivityId,
    ) -> Result<Option<ActivityWithRelations>, RepositoryError> {
        let sql = format!(
            r"
            {ACTIVITY_SELECT}
            WHERE a.id = $1 AND a.user_id = $2
            "
        );
        let row = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Activity counts grouped by kind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_kind(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ActivityTypeCount>, RepositoryError> {
        let rows: Vec<(ActivityKind, i64)> = sqlx::query_as(
            r"
            SELECT type, COUNT(*)
            FROM activities
            WHERE user_id = $1
            GROUP BY type
            ORDER BY type
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(kind, count)| ActivityTypeCount { kind, count })
            .collect())
    }

    /// Insert a new activity owned by `user_id` and return it joined.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        record: &ActivityRecord,
    ) -> Result<ActivityWithRelations, RepositoryError> {
        let (id,): (ActivityId,) = sqlx::query_as(
            r"
            INSERT INTO activities (id, user_id, content, type, contact_id, deal_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(ActivityId::generate())
        .bind(user_id)
        .bind(&record.content)
        .bind(record.kind)
        .bind(record.contact_id)
        .bind(record.deal_id)
        .fetch_one(self.pool)
        .await?;

        self.get_by_id(user_id, id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Update an activity's content and kind, scoped by owner. The contact
    /// and deal links are fixed at creation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the activity doesn't exist or
    /// isn't owned by `user_id`.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        user_id: UserId,
        id: ActivityId,
        content: &str,
        kind: ActivityKind,
    ) -> Result<ActivityWithRelations, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE activities
            SET content = $1, type = $2
            WHERE id = $3 AND user_id = $4
            ",
        )
        .bind(content)
        .bind(kind)
        .bind(id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get_by_id(user_id, id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete an activity, scoped by owner. Returns the links it carried so
    /// callers know which views to invalidate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the activity doesn't exist or
    /// isn't owned by `user_id`.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(
        &self,
        user_id: UserId,
        id: ActivityId,
    ) -> Result<ActivityLinks, RepositoryError> {
        let links: Option<(Option<ContactId>, Option<DealId>)> = sqlx::query_as(
            r"
            SELECT contact_id, deal_id
            FROM activities
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        let Some((contact_id, deal_id)) = links else {
            return Err(RepositoryError::NotFound);
        };

        sqlx::query(
            r"
            DELETE FROM activities
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(ActivityLinks {
            contact_id,
            deal_id,
        })
    }
}
