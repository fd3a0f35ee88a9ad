//! Dashboard aggregate, served through the view cache.

use serde::Serialize;

use super::views::ViewKey;
use super::{ActionError, ActionResult, require_user};
use crate::db::activities::ActivitiesFilter;
use crate::db::{ActivityRepository, ContactRepository, DealRepository, TodoRepository};
use crate::db::contacts::ContactsFilter;
use crate::models::{ActivityTypeCount, ActivityWithRelations, CurrentUser, StageDealCount, StageDealValue};
use crate::state::AppState;

const RECENT_ACTIVITY_LIMIT: i64 = 5;

/// Everything the dashboard overview renders.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub contact_count: i64,
    pub todo_count: i64,
    pub deals_by_stage: Vec<StageDealCount>,
    pub value_by_stage: Vec<StageDealValue>,
    pub recent_activities: Vec<ActivityWithRelations>,
    pub activity_counts: Vec<ActivityTypeCount>,
}

/// Build the dashboard payload, reusing the cached copy when the view has
/// not been invalidated since it was rendered.
///
/// The underlying reads are independent and dispatched concurrently; each
/// one writes a disjoint piece of the summary.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Store` on database failure.
pub async fn get_dashboard(
    state: &AppState,
    user: Option<&CurrentUser>,
) -> ActionResult<serde_json::Value> {
    let user = require_user(user)?;

    if let Some(cached) = state.views().get(user.id, &ViewKey::Dashboard).await {
        return Ok(cached);
    }

    let contacts = ContactRepository::new(state.pool());
    let todos = TodoRepository::new(state.pool());
    let deals = DealRepository::new(state.pool());
    let activities = ActivityRepository::new(state.pool());

    let contacts_filter = ContactsFilter::default();
    let activities_filter = ActivitiesFilter {
        limit: Some(RECENT_ACTIVITY_LIMIT),
        ..ActivitiesFilter::default()
    };
    let (contact_count, todo_count, deals_by_stage, value_by_stage, recent_activities, activity_counts) =
        tokio::try_join!(
            contacts.count(user.id, &contacts_filter),
            todos.count(user.id),
            deals.count_by_stage(user.id),
            deals.value_by_stage(user.id),
            activities.list(user.id, &activities_filter),
            activities.count_by_kind(user.id),
        )?;

    let summary = DashboardSummary {
        contact_count,
        todo_count,
        deals_by_stage,
        value_by_stage,
        recent_activities,
        activity_counts,
    };

    let value =
        serde_json::to_value(&summary).map_err(|e| ActionError::Store(e.to_string()))?;
    state
        .views()
        .insert(user.id, &ViewKey::Dashboard, value.clone())
        .await;

    Ok(value)
}
