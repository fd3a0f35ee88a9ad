//! Deal and deal stage types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use copperline_core::{ContactId, DealId, StageId};

use super::activity::ActivityWithRelations;
use super::contact::ContactSummary;

/// A pipeline stage. Each user owns their own stage set; `order_index`
/// determines the left-to-right column order and is unique per user.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DealStage {
    pub id: StageId,
    pub name: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal stage data joined onto deals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSummary {
    pub id: StageId,
    pub name: String,
    pub order_index: i32,
}

/// A sales deal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    /// Deal's database ID.
    pub id: DealId,
    /// Title (required, trimmed).
    pub title: String,
    /// Longer description.
    pub description: Option<String>,
    /// Monetary value; `None` counts as zero in pipeline metrics.
    pub value: Option<Decimal>,
    /// Current pipeline stage (always set).
    pub stage_id: StageId,
    /// Linked contact, if any.
    pub contact_id: Option<ContactId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal deal data joined onto other entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealSummary {
    pub id: DealId,
    pub title: String,
    pub stage_id: StageId,
}

/// A deal joined with its stage and (optional) contact summaries, as
/// returned by deal listings and the pipeline board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealWithRelations {
    #[serde(flatten)]
    pub deal: Deal,
    pub contact: Option<ContactSummary>,
    pub stage: StageSummary,
}

/// Full deal detail: the joined deal plus its activity log.
#[derive(Debug, Clone, Serialize)]
pub struct DealDetail {
    #[serde(flatten)]
    pub deal: DealWithRelations,
    pub activities: Vec<ActivityWithRelations>,
}

/// Deal count per stage (dashboard stat).
#[derive(Debug, Clone, Serialize)]
pub struct StageDealCount {
    pub stage: StageSummary,
    pub count: i64,
}

/// Total deal value per stage (dashboard stat). Deals without a value
/// contribute nothing.
#[derive(Debug, Clone, Serialize)]
pub struct StageDealValue {
    pub stage: StageSummary,
    pub total_value: Decimal,
}
