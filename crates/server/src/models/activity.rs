//! Activity log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use copperline_core::{ActivityId, ActivityKind, ContactId, DealId};

use super::contact::ContactSummary;

/// A logged activity. Always linked to at least one of a contact or a deal
/// at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Activity's database ID.
    pub id: ActivityId,
    /// Content (required, trimmed).
    pub content: String,
    /// Kind of activity; defaults to `note`.
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// Linked contact, if any.
    pub contact_id: Option<ContactId>,
    /// Linked deal, if any.
    pub deal_id: Option<DealId>,
    pub created_at: DateTime<Utc>,
}

/// Minimal deal data joined onto activities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealRef {
    pub id: DealId,
    pub title: String,
}

/// An activity joined with its contact and deal summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityWithRelations {
    #[serde(flatten)]
    pub activity: Activity,
    pub contact: Option<ContactSummary>,
    pub deal: Option<DealRef>,
}

/// Activity count per kind (dashboard stat).
#[derive(Debug, Clone, Serialize)]
pub struct ActivityTypeCount {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub count: i64,
}
