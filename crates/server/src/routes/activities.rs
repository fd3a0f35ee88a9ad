//! Activity route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use copperline_core::{ActivityId, ActivityKind, ContactId, DealId};

use super::Deleted;
use crate::db::activities::ActivitiesFilter;
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::{ActivityTypeCount, ActivityWithRelations};
use crate::services;
use crate::services::activities::{ActivityInput, ActivityUpdateInput};
use crate::services::views;
use crate::state::AppState;

/// Build the activities router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/activities", get(list).post(create))
        .route("/activities/recent", get(recent))
        .route("/activities/count-by-type", get(count_by_type))
        .route("/activities/{id}", get(show).put(update).delete(destroy))
        .route("/contacts/{id}/activities", get(contact_feed))
        .route("/deals/{id}/activities", get(deal_feed))
}

/// Query string for activity listings.
#[derive(Debug, Deserialize)]
pub struct ActivityListQuery {
    pub contact_id: Option<ContactId>,
    pub deal_id: Option<DealId>,
    #[serde(rename = "type")]
    pub kind: Option<ActivityKind>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<ActivityListQuery> for ActivitiesFilter {
    fn from(query: ActivityListQuery) -> Self {
        Self {
            contact_id: query.contact_id,
            deal_id: query.deal_id,
            kind: query.kind,
            limit: query.limit,
            offset: query.offset,
        }
    }
}

/// Query string for activity feeds.
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i64>,
}

/// Response for a persisted activity.
#[derive(Debug, Serialize)]
pub struct ActivitySaved {
    pub success: bool,
    pub activity: ActivityWithRelations,
    pub invalidated: Vec<String>,
}

async fn list(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Query(query): Query<ActivityListQuery>,
) -> Result<Json<Vec<ActivityWithRelations>>> {
    let activities =
        services::activities::get_activities(&state, user.as_ref(), &query.into()).await?;
    Ok(Json(activities))
}

async fn recent(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<ActivityWithRelations>>> {
    let activities =
        services::activities::get_recent_activities(&state, user.as_ref(), query.limit).await?;
    Ok(Json(activities))
}

async fn count_by_type(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<ActivityTypeCount>>> {
    let counts =
        services::activities::get_activity_count_by_type(&state, user.as_ref()).await?;
    Ok(Json(counts))
}

async fn contact_feed(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(id): Path<ContactId>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<ActivityWithRelations>>> {
    let activities =
        services::activities::get_contact_activities(&state, user.as_ref(), id, query.limit)
            .await?;
    Ok(Json(activities))
}

async fn deal_feed(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(id): Path<DealId>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<ActivityWithRelations>>> {
    let activities =
        services::activities::get_deal_activities(&state, user.as_ref(), id, query.limit).await?;
    Ok(Json(activities))
}

async fn show(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(id): Path<ActivityId>,
) -> Result<Json<ActivityWithRelations>> {
    let activity = services::activities::get_activity_by_id(&state, user.as_ref(), id).await?;
    Ok(Json(activity))
}

async fn create(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Json(input): Json<ActivityInput>,
) -> Result<Json<ActivitySaved>> {
    let saved = services::activities::create_activity(&state, user.as_ref(), &input).await?;
    Ok(Json(ActivitySaved {
        success: true,
        activity: saved.record,
        invalidated: views::paths(&saved.invalidated),
    }))
}

async fn update(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(id): Path<ActivityId>,
    Json(input): Json<ActivityUpdateInput>,
) -> Result<Json<ActivitySaved>> {
    let saved =
        services::activities::update_activity(&state, user.as_ref(), id, &input).await?;
    Ok(Json(ActivitySaved {
        success: true,
        activity: saved.record,
        invalidated: views::paths(&saved.invalidated),
    }))
}

async fn destroy(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(id): Path<ActivityId>,
) -> Result<Json<Deleted>> {
    let deleted = services::activities::delete_activity(&state, user.as_ref(), id).await?;
    Ok(Json(Deleted {
        success: true,
        invalidated: views::paths(&deleted.invalidated),
    }))
}
