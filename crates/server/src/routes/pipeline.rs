//! Pipeline route handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;

use copperline_core::{DealId, StageId};

use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::services;
use crate::services::pipeline::PipelineMoveResult;
use crate::state::AppState;

/// Build the pipeline router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pipeline", get(show))
        .route("/pipeline/move", post(move_deal))
}

/// Body for a pipeline move.
#[derive(Debug, Deserialize)]
pub struct MoveBody {
    pub deal_id: DealId,
    pub stage_id: StageId,
}

/// The rendered pipeline view (board, metrics, stages, contacts), cached.
async fn show(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>> {
    let view = services::pipeline::get_pipeline(&state, user.as_ref()).await?;
    Ok(Json(view))
}

/// Run one drag through the optimistic controller. The response carries
/// the reconciled board: the optimistic state when the persist succeeded,
/// or fresh server truth after a rollback.
async fn move_deal(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Json(body): Json<MoveBody>,
) -> Result<Json<PipelineMoveResult>> {
    let result =
        services::pipeline::move_deal(&state, user.as_ref(), body.deal_id, body.stage_id).await?;
    Ok(Json(result))
}
