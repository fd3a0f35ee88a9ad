//! Contact repository for database operations.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use copperline_core::{ContactId, UserId};

use super::RepositoryError;
use super::activities::ActivityRepository;
use super::deals::DealRepository;
use crate::models::{Contact, ContactDetail, ContactWithDeals, DealSummary};

/// Filter options for contact listings.
#[derive(Debug, Clone, Default)]
pub struct ContactsFilter {
    /// Case-insensitive substring match across name, email, and company.
    pub search: Option<String>,
    /// Exact company match.
    pub company: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Editable contact fields, already validated and trimmed.
#[derive(Debug, Clone)]
pub struct ContactRecord {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct DealSummaryRow {
    id: Uuid,
    title: String,
    stage_id: Uuid,
    contact_id: Uuid,
}

/// Repository for contact database operations.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    /// Create a new contact repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List contacts with their deal summaries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        filter: &ContactsFilter,
    ) -> Result<Vec<ContactWithDeals>, RepositoryError> {
        let contacts = sqlx::query_as::<_, Contact>(
            r"
            SELECT id, name, email, phone, company, notes, created_at, updated_at
            FROM contacts
            WHERE user_id = $1
              AND ($2::text IS NULL
                   OR name ILIKE '%' || $2 || '%'
                   OR email ILIKE '%' || $2 || '%'
                   OR company ILIKE '%' || $2 || '%')
              AND ($3::text IS NULL OR company = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET COALESCE($5, 0)
            ",
        )
        .bind(user_id)
        .bind(filter.search.as_deref())
        .bind(filter.company.as_deref())
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(self.pool)
        .await?;

        if contacts.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = contacts.iter().map(|c| c.id.as_uuid()).collect();
        let deal_rows = sqlx::query_as::<_, DealSummaryRow>(
            r"
            SELECT id, title, stage_id, contact_id
            FROM deals
            WHERE user_id = $1 AND contact_id = ANY($2)
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id)
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut deals_by_contact: HashMap<Uuid, Vec<DealSummary>> = HashMap::new();
        for row in deal_rows {
            deals_by_contact
                .entry(row.contact_id)
                .or_default()
                .push(DealSummary {
                    id: row.id.into(),
                    title: row.title,
                    stage_id: row.stage_id.into(),
                });
        }

        Ok(contacts
            .into_iter()
            .map(|contact| {
                let deals = deals_by_contact
                    .remove(&contact.id.as_uuid())
                    .unwrap_or_default();
                ContactWithDeals { contact, deals }
            })
            .collect())
    }

    /// List all contacts without their deal summaries, newest first. Used
    /// where only the contacts themselves matter (deal forms, pipeline
    /// snapshot).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self, user_id: UserId) -> Result<Vec<Contact>, RepositoryError> {
        let contacts = sqlx::query_as::<_, Contact>(
            r"
            SELECT id, name, email, phone, company, notes, created_at, updated_at
            FROM contacts
            WHERE user_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(contacts)
    }

    /// Get a single contact with its deals and activity log.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_id(
        &self,
        user_id: UserId,
        id: ContactId,
    ) -> Result<Option<ContactDetail>, RepositoryError> {
        let contact = sqlx::query_as::<_, Contact>(
            r"
            SELECT id, name, email, phone, company, notes, created_at, updated_at
            FROM contacts
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(contact) = contact else {
            return Ok(None);
        };

        let deals = DealRepository::new(self.pool)
            .list_for_contact(user_id, id)
            .await?;
        let activities = ActivityRepository::new(self.pool)
            .for_contact(user_id, id, None)
            .await?;

        Ok(Some(ContactDetail {
            contact,
            deals,
            activities,
        }))
    }

    /// Count contacts honoring the search/company filters, without fetching
    /// row bodies.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(
        &self,
        user_id: UserId,
        filter: &ContactsFilter,
    ) -> Result<i64, RepositoryError> {
        let count: (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*)
            FROM contacts
            WHERE user_id = $1
              AND ($2::text IS NULL
                   OR name ILIKE '%' || $2 || '%'
                   OR email ILIKE '%' || $2 || '%'
                   OR company ILIKE '%' || $2 || '%')
              AND ($3::text IS NULL OR company = $3)
            ",
        )
        .bind(user_id)
        .bind(filter.search.as_deref())
        .bind(filter.company.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(count.0)
    }

    /// List the distinct companies across the user's contacts, sorted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn companies(&self, user_id: UserId) -> Result<Vec<String>, RepositoryError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r"
            SELECT DISTINCT company
            FROM contacts
            WHERE user_id = $1 AND company IS NOT NULL AND company <> ''
            ORDER BY company
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|(company,)| company).collect())
    }

    /// Insert a new contact owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        record: &ContactRecord,
    ) -> Result<Contact, RepositoryError> {
        let contact = sqlx::query_as::<_, Contact>(
            r"
            INSERT INTO contacts (id, user_id, name, email, phone, company, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, email, phone, company, notes, created_at, updated_at
            ",
        )
        .bind(ContactId::generate())
        .bind(user_id)
        .bind(&record.name)
        .bind(record.email.as_deref())
        .bind(record.phone.as_deref())
        .bind(record.company.as_deref())
        .bind(record.notes.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(contact)
    }

    /// Update a contact, scoped by owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the contact doesn't exist or
    /// isn't owned by `user_id`.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        user_id: UserId,
        id: ContactId,
        record: &ContactRecord,
    ) -> Result<Contact, RepositoryError> {
        let contact = sqlx::query_as::<_, Contact>(
            r"
            UPDATE contacts
            SET name = $1, email = $2, phone = $3, company = $4, notes = $5,
                updated_at = NOW()
            WHERE id = $6 AND user_id = $7
            RETURNING id, name, email, phone, company, notes, created_at, updated_at
            ",
        )
        .bind(&record.name)
        .bind(record.email.as_deref())
        .bind(record.phone.as_deref())
        .bind(record.company.as_deref())
        .bind(record.notes.as_deref())
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(contact)
    }

    /// Delete a contact, scoped by owner. The contact's activities cascade
    /// away and its deals lose their contact link (see migrations).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the contact doesn't exist or
    /// isn't owned by `user_id`.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, user_id: UserId, id: ContactId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM contacts
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
