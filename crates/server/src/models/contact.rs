//! Contact types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use copperline_core::ContactId;

use super::activity::ActivityWithRelations;
use super::deal::{DealSummary, DealWithRelations};

/// A CRM contact.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contact {
    /// Contact's database ID.
    pub id: ContactId,
    /// Display name (required, trimmed).
    pub name: String,
    /// Email address (free text, optional).
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Company name.
    pub company: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal contact data joined onto other entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSummary {
    pub id: ContactId,
    pub name: String,
    pub email: Option<String>,
}

/// A contact with its deal summaries, as returned by contact listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactWithDeals {
    #[serde(flatten)]
    pub contact: Contact,
    /// Deals linked to this contact (id, title, stage only).
    pub deals: Vec<DealSummary>,
}

/// Full contact detail: the contact plus its deals and activity log.
#[derive(Debug, Clone, Serialize)]
pub struct ContactDetail {
    #[serde(flatten)]
    pub contact: Contact,
    pub deals: Vec<DealWithRelations>,
    pub activities: Vec<ActivityWithRelations>,
}
