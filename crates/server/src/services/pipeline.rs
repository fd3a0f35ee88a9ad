//! Pipeline view operations.
//!
//! Provides the combined stage/deal/contact snapshot, the cached board
//! payload, and [`DbPipelineClient`] - the persistence seam that lets a
//! [`PipelineController`] run against the real gateway. The move endpoint
//! drives a controller per request, so a failed persist hands the caller
//! server ground truth instead of its stale optimistic state.

use serde::Serialize;
use serde_json::json;

use copperline_core::{DealId, StageId, UserId};

use super::views::ViewKey;
use super::{ActionError, ActionResult, require_user};
use crate::db::deals::DealsFilter;
use crate::db::{ContactRepository, DealRepository, StageRepository};
use crate::models::CurrentUser;
use crate::pipeline::{
    DragOutcome, PipelineBoard, PipelineClient, PipelineController, PipelineMetrics,
    PipelineSnapshot,
};
use crate::state::AppState;

/// One combined fetch of stages (ordered), deals (joined), and contacts.
async fn snapshot_for(state: &AppState, user_id: UserId) -> ActionResult<PipelineSnapshot> {
    let stages_repo = StageRepository::new(state.pool());
    let deals_repo = DealRepository::new(state.pool());
    let contacts_repo = ContactRepository::new(state.pool());

    // Independent reads, dispatched concurrently; each fills a disjoint
    // piece of the snapshot.
    let deals_filter = DealsFilter::default();
    let (stages, deals, contacts) = tokio::try_join!(
        stages_repo.list(user_id),
        deals_repo.list(user_id, &deals_filter),
        contacts_repo.list_all(user_id),
    )?;

    Ok(PipelineSnapshot {
        stages,
        deals,
        contacts,
    })
}

/// The rendered pipeline view: grouped columns, metrics, stages, and
/// contacts. Served from the view cache until a mutation stales it.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Store` on database failure.
pub async fn get_pipeline(
    state: &AppState,
    user: Option<&CurrentUser>,
) -> ActionResult<serde_json::Value> {
    let user = require_user(user)?;

    if let Some(cached) = state.views().get(user.id, &ViewKey::Pipeline).await {
        return Ok(cached);
    }

    let snapshot = snapshot_for(state, user.id).await?;
    let stages = snapshot.stages.clone();
    let contacts = snapshot.contacts;
    let board = PipelineBoard::build(snapshot.stages, snapshot.deals);

    let value = json!({
        "stages": stages,
        "columns": board.columns(),
        "metrics": board.metrics(),
        "contacts": contacts,
    });
    state
        .views()
        .insert(user.id, &ViewKey::Pipeline, value.clone())
        .await;

    Ok(value)
}

/// Persistence client backing the controller with the real gateway and
/// Query Layer.
pub struct DbPipelineClient {
    state: AppState,
    user: CurrentUser,
}

impl DbPipelineClient {
    /// Create a client acting as `user`.
    #[must_use]
    pub const fn new(state: AppState, user: CurrentUser) -> Self {
        Self { state, user }
    }
}

impl PipelineClient for DbPipelineClient {
    async fn fetch(&self) -> Result<PipelineSnapshot, String> {
        snapshot_for(&self.state, self.user.id)
            .await
            .map_err(|e| e.to_string())
    }

    async fn move_deal(&self, deal_id: DealId, stage_id: StageId) -> Result<(), String> {
        // Goes through the gateway so auth, owner scoping, and view
        // invalidation all apply.
        super::deals::update_deal_stage(&self.state, Some(&self.user), deal_id, stage_id)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// The reconciled result of a pipeline move request.
#[derive(Debug, Serialize)]
pub struct PipelineMoveResult {
    /// What happened: confirmed, guarded no-op, or rolled back.
    #[serde(flatten)]
    pub outcome: DragOutcome,
    /// The board after reconciliation - optimistic on success, server
    /// truth after a rollback.
    pub board: serde_json::Value,
    /// Metrics derived from that board.
    pub metrics: PipelineMetrics,
}

/// Run one drag through a [`PipelineController`]: load, optimistic apply,
/// persist, reconcile.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Store` when the initial load fails.
pub async fn move_deal(
    state: &AppState,
    user: Option<&CurrentUser>,
    deal_id: DealId,
    stage_id: StageId,
) -> ActionResult<PipelineMoveResult> {
    let user = require_user(user)?.clone();
    let client = DbPipelineClient::new(state.clone(), user);
    let mut controller = PipelineController::new(client);

    controller.load().await.map_err(ActionError::Store)?;
    let outcome = controller.drag(deal_id, Some(stage_id)).await;
    let metrics = controller.metrics();
    let board = controller
        .board()
        .map_or(serde_json::Value::Null, |b| json!({ "columns": b.columns() }));

    Ok(PipelineMoveResult {
        outcome,
        board,
        metrics,
    })
}
