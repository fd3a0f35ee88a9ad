//! Activity operations: gateway mutations and scoped queries.

use serde::Deserialize;

use copperline_core::{ActivityId, ActivityKind, ContactId, DealId};

use super::views::ViewKey;
use super::{ActionError, ActionResult, Mutated, require_user, validate};
use crate::db::ActivityRepository;
use crate::db::activities::{ActivitiesFilter, ActivityRecord};
use crate::models::{ActivityTypeCount, ActivityWithRelations, CurrentUser};
use crate::state::AppState;

/// Default page size for per-entity activity feeds.
const DEFAULT_FEED_LIMIT: i64 = 10;

/// Default number of recent activities on the dashboard.
const DEFAULT_RECENT_LIMIT: i64 = 5;

/// New activity fields as submitted by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityInput {
    pub content: String,
    #[serde(rename = "type")]
    pub kind: Option<ActivityKind>,
    pub contact_id: Option<ContactId>,
    pub deal_id: Option<DealId>,
}

/// Editable activity fields for updates: the contact/deal links are fixed
/// at creation.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityUpdateInput {
    pub content: String,
    #[serde(rename = "type")]
    pub kind: Option<ActivityKind>,
}

/// The views an activity stales, given its links.
fn staled_views(contact_id: Option<ContactId>, deal_id: Option<DealId>) -> Vec<ViewKey> {
    let mut keys = vec![ViewKey::Dashboard, ViewKey::Activities];
    if let Some(contact_id) = contact_id {
        keys.push(ViewKey::Contact(contact_id));
    }
    if deal_id.is_some() {
        keys.push(ViewKey::Pipeline);
    }
    keys
}

/// Log a new activity. Must reference a contact, a deal, or both.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Validation` on blank content or a
/// missing link, `Store` on database failure.
pub async fn create_activity(
    state: &AppState,
    user: Option<&CurrentUser>,
    input: &ActivityInput,
) -> ActionResult<Mutated<ActivityWithRelations>> {
    let user = require_user(user)?;
    let content = validate::required_trimmed(&input.content, "Content is required")?;

    // Must reference either a contact or a deal
    if input.contact_id.is_none() && input.deal_id.is_none() {
        return Err(ActionError::Validation(
            "Activity must be linked to either a contact or a deal".to_owned(),
        ));
    }

    let record = ActivityRecord {
        content,
        kind: input.kind.unwrap_or_default(),
        contact_id: input.contact_id,
        deal_id: input.deal_id,
    };

    let activity = ActivityRepository::new(state.pool())
        .create(user.id, &record)
        .await?;
    tracing::info!(activity_id = %activity.activity.id, kind = %activity.activity.kind, "activity logged");

    let invalidated = staled_views(record.contact_id, record.deal_id);
    state.views().invalidate(user.id, &invalidated).await;

    Ok(Mutated {
        record: activity,
        invalidated,
    })
}

/// Update an activity's content and kind.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Validation` on blank content,
/// `NotFound` for a missing or foreign row, `Store` on database failure.
pub async fn update_activity(
    state: &AppState,
    user: Option<&CurrentUser>,
    id: ActivityId,
    input: &ActivityUpdateInput,
) -> ActionResult<Mutated<ActivityWithRelations>> {
    let user = require_user(user)?;
    let content = validate::required_trimmed(&input.content, "Content is required")?;
    let kind = input.kind.unwrap_or_default();

    let activity = ActivityRepository::new(state.pool())
        .update(user.id, id, &content, kind)
        .await?;

    let invalidated = staled_views(activity.activity.contact_id, activity.activity.deal_id);
    state.views().invalidate(user.id, &invalidated).await;

    Ok(Mutated {
        record: activity,
        invalidated,
    })
}

/// Delete an activity.
///
/// # Errors
///
/// `Unauthorized` without a caller, `NotFound` for a missing or foreign
/// row, `Store` on database failure.
pub async fn delete_activity(
    state: &AppState,
    user: Option<&CurrentUser>,
    id: ActivityId,
) -> ActionResult<Mutated<()>> {
    let user = require_user(user)?;

    let links = ActivityRepository::new(state.pool())
        .delete(user.id, id)
        .await?;
    tracing::info!(activity_id = %id, "activity deleted");

    let invalidated = staled_views(links.contact_id, links.deal_id);
    state.views().invalidate(user.id, &invalidated).await;

    Ok(Mutated {
        record: (),
        invalidated,
    })
}

/// List activities with kind/contact/deal filters and pagination.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Store` on database failure.
pub async fn get_activities(
    state: &AppState,
    user: Option<&CurrentUser>,
    filter: &ActivitiesFilter,
) -> ActionResult<Vec<ActivityWithRelations>> {
    let user = require_user(user)?;
    Ok(ActivityRepository::new(state.pool())
        .list(user.id, filter)
        .await?)
}

/// The activity feed for one contact.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Store` on database failure.
pub async fn get_contact_activities(
    state: &AppState,
    user: Option<&CurrentUser>,
    contact_id: ContactId,
    limit: Option<i64>,
) -> ActionResult<Vec<ActivityWithRelations>> {
    let user = require_user(user)?;
    Ok(ActivityRepository::new(state.pool())
        .for_contact(user.id, contact_id, Some(limit.unwrap_or(DEFAULT_FEED_LIMIT)))
        .await?)
}

/// The activity feed for one deal.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Store` on database failure.
pub async fn get_deal_activities(
    state: &AppState,
    user: Option<&CurrentUser>,
    deal_id: DealId,
    limit: Option<i64>,
) -> ActionResult<Vec<ActivityWithRelations>> {
    let user = require_user(user)?;
    Ok(ActivityRepository::new(state.pool())
        .for_deal(user.id, deal_id, Some(limit.unwrap_or(DEFAULT_FEED_LIMIT)))
        .await?)
}

/// The most recent activities across the account.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Store` on database failure.
pub async fn get_recent_activities(
    state: &AppState,
    user: Option<&CurrentUser>,
    limit: Option<i64>,
) -> ActionResult<Vec<ActivityWithRelations>> {
    let user = require_user(user)?;
    Ok(ActivityRepository::new(state.pool())
        .recent(user.id, limit.unwrap_or(DEFAULT_RECENT_LIMIT))
        .await?)
}

/// Activity counts grouped by kind for dashboard stats.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Store` on database failure.
pub async fn get_activity_count_by_type(
    state: &AppState,
    user: Option<&CurrentUser>,
) -> ActionResult<Vec<ActivityTypeCount>> {
    let user = require_user(user)?;
    Ok(ActivityRepository::new(state.pool())
        .count_by_kind(user.id)
        .await?)
}

/// Fetch one activity with its relations.
///
/// # Errors
///
/// `Unauthorized` without a caller, `NotFound` for a missing or foreign
/// row, `Store` on database failure.
pub async fn get_activity_by_id(
    state: &AppState,
    user: Option<&CurrentUser>,
    id: ActivityId,
) -> ActionResult<ActivityWithRelations> {
    let user = require_user(user)?;
    ActivityRepository::new(state.pool())
        .get_by_id(user.id, id)
        .await?
        .ok_or(ActionError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staled_views_contact_only() {
        let contact_id = ContactId::generate();
        let keys = staled_views(Some(contact_id), None);
        assert_eq!(
            keys,
            vec![
                ViewKey::Dashboard,
                ViewKey::Activities,
                ViewKey::Contact(contact_id)
            ]
        );
    }

    #[test]
    fn test_staled_views_deal_adds_pipeline() {
        let keys = staled_views(None, Some(DealId::generate()));
        assert!(keys.contains(&ViewKey::Pipeline));
        assert!(!keys.iter().any(|k| matches!(k, ViewKey::Contact(_))));
    }
}
