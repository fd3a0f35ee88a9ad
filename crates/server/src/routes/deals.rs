//! Deal route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use serde::{Deserialize, Serialize};

use copperline_core::{ContactId, DealId, StageId};

use super::Deleted;
use crate::db::deals::DealsFilter;
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::{DealDetail, DealStage, DealWithRelations, StageDealCount, StageDealValue};
use crate::pipeline::PipelineBoard;
use crate::services;
use crate::services::deals::DealInput;
use crate::services::views;
use crate::state::AppState;

/// Build the deals router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/deals", get(list).post(create))
        .route("/deals/stages", get(stages))
        .route("/deals/by-stage", get(by_stage))
        .route("/deals/count-by-stage", get(count_by_stage))
        .route("/deals/value-by-stage", get(value_by_stage))
        .route("/deals/{id}", get(show).put(update).delete(destroy))
        .route("/deals/{id}/stage", put(set_stage))
}

/// Query string for deal listings.
#[derive(Debug, Deserialize)]
pub struct DealListQuery {
    pub stage_id: Option<StageId>,
    pub contact_id: Option<ContactId>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<DealListQuery> for DealsFilter {
    fn from(query: DealListQuery) -> Self {
        Self {
            stage_id: query.stage_id,
            contact_id: query.contact_id,
            search: query.search,
            limit: query.limit,
            offset: query.offset,
        }
    }
}

/// Body for a stage reassignment.
#[derive(Debug, Deserialize)]
pub struct SetStageBody {
    pub stage_id: StageId,
}

/// Response for a persisted deal.
#[derive(Debug, Serialize)]
pub struct DealSaved {
    pub success: bool,
    pub deal: DealWithRelations,
    pub invalidated: Vec<String>,
}

async fn list(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Query(query): Query<DealListQuery>,
) -> Result<Json<Vec<DealWithRelations>>> {
    let deals = services::deals::get_deals(&state, user.as_ref(), &query.into()).await?;
    Ok(Json(deals))
}

async fn stages(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<DealStage>>> {
    let stages = services::deals::get_deal_stages(&state, user.as_ref()).await?;
    Ok(Json(stages))
}

async fn by_stage(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
) -> Result<Json<PipelineBoard>> {
    let board = services::deals::get_deals_by_stage(&state, user.as_ref()).await?;
    Ok(Json(board))
}

async fn count_by_stage(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<StageDealCount>>> {
    let counts = services::deals::get_deals_count_by_stage(&state, user.as_ref()).await?;
    Ok(Json(counts))
}

async fn value_by_stage(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<StageDealValue>>> {
    let values = services::deals::get_deal_value_by_stage(&state, user.as_ref()).await?;
    Ok(Json(values))
}

async fn show(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(id): Path<DealId>,
) -> Result<Json<DealDetail>> {
    let deal = services::deals::get_deal_by_id(&state, user.as_ref(), id).await?;
    Ok(Json(deal))
}

async fn create(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Json(input): Json<DealInput>,
) -> Result<Json<DealSaved>> {
    let saved = services::deals::create_deal(&state, user.as_ref(), &input).await?;
    Ok(Json(DealSaved {
        success: true,
        deal: saved.record,
        invalidated: views::paths(&saved.invalidated),
    }))
}

async fn update(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(id): Path<DealId>,
    Json(input): Json<DealInput>,
) -> Result<Json<DealSaved>> {
    let saved = services::deals::update_deal(&state, user.as_ref(), id, &input).await?;
    Ok(Json(DealSaved {
        success: true,
        deal: saved.record,
        invalidated: views::paths(&saved.invalidated),
    }))
}

async fn set_stage(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(id): Path<DealId>,
    Json(body): Json<SetStageBody>,
) -> Result<Json<DealSaved>> {
    let saved =
        services::deals::update_deal_stage(&state, user.as_ref(), id, body.stage_id).await?;
    Ok(Json(DealSaved {
        success: true,
        deal: saved.record,
        invalidated: views::paths(&saved.invalidated),
    }))
}

async fn destroy(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(id): Path<DealId>,
) -> Result<Json<Deleted>> {
    let deleted = services::deals::delete_deal(&state, user.as_ref(), id).await?;
    Ok(Json(Deleted {
        success: true,
        invalidated: views::paths(&deleted.invalidated),
    }))
}
