//! Deal operations: gateway mutations and scoped queries.

use rust_decimal::Decimal;
use serde::Deserialize;

use copperline_core::{ContactId, DealId, StageId};

use super::views::ViewKey;
use super::{ActionError, ActionResult, Mutated, require_user, validate};
use crate::db::deals::{DealRecord, DealsFilter};
use crate::db::{DealRepository, StageRepository};
use crate::models::{
    CurrentUser, DealDetail, DealStage, DealWithRelations, StageDealCount, StageDealValue,
};
use crate::pipeline::PipelineBoard;
use crate::state::AppState;

/// Views staled by any deal mutation.
const DEAL_VIEWS: [ViewKey; 2] = [ViewKey::Dashboard, ViewKey::Pipeline];

/// Editable deal fields as submitted by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct DealInput {
    pub title: String,
    pub description: Option<String>,
    pub value: Option<Decimal>,
    pub stage_id: Option<StageId>,
    pub contact_id: Option<ContactId>,
}

fn sanitize(input: &DealInput) -> ActionResult<DealRecord> {
    let title = validate::required_trimmed(&input.title, "Title is required")?;
    let stage_id = input
        .stage_id
        .ok_or_else(|| ActionError::Validation("Stage is required".to_owned()))?;

    Ok(DealRecord {
        title,
        description: validate::optional_trimmed(input.description.as_deref()),
        value: input.value,
        stage_id,
        contact_id: input.contact_id,
    })
}

/// Create a new deal in the given stage.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Validation` on a blank title or a
/// missing stage, `Store` on database failure.
pub async fn create_deal(
    state: &AppState,
    user: Option<&CurrentUser>,
    input: &DealInput,
) -> ActionResult<Mutated<DealWithRelations>> {
    let user = require_user(user)?;
    let record = sanitize(input)?;

    let deal = DealRepository::new(state.pool())
        .create(user.id, &record)
        .await?;
    tracing::info!(deal_id = %deal.deal.id, stage_id = %deal.stage.id, "deal created");

    let invalidated = DEAL_VIEWS.to_vec();
    state.views().invalidate(user.id, &invalidated).await;

    Ok(Mutated {
        record: deal,
        invalidated,
    })
}

/// Update an existing deal.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Validation` on bad input, `NotFound`
/// for a missing or foreign row, `Store` on database failure.
pub async fn update_deal(
    state: &AppState,
    user: Option<&CurrentUser>,
    id: DealId,
    input: &DealInput,
) -> ActionResult<Mutated<DealWithRelations>> {
    let user = require_user(user)?;
    let record = sanitize(input)?;

    let deal = DealRepository::new(state.pool())
        .update(user.id, id, &record)
        .await?;

    let invalidated = DEAL_VIEWS.to_vec();
    state.views().invalidate(user.id, &invalidated).await;

    Ok(Mutated {
        record: deal,
        invalidated,
    })
}

/// Move a deal to another stage (the persistence half of a pipeline drag).
///
/// # Errors
///
/// `Unauthorized` without a caller, `NotFound` for a missing or foreign
/// deal, `Store` on database failure (including an unknown target stage).
pub async fn update_deal_stage(
    state: &AppState,
    user: Option<&CurrentUser>,
    id: DealId,
    stage_id: StageId,
) -> ActionResult<Mutated<DealWithRelations>> {
    let user = require_user(user)?;

    let deal = DealRepository::new(state.pool())
        .set_stage(user.id, id, stage_id)
        .await?;
    tracing::info!(deal_id = %id, stage_id = %stage_id, "deal stage updated");

    let invalidated = DEAL_VIEWS.to_vec();
    state.views().invalidate(user.id, &invalidated).await;

    Ok(Mutated {
        record: deal,
        invalidated,
    })
}

/// Delete a deal. Its activities cascade away.
///
/// # Errors
///
/// `Unauthorized` without a caller, `NotFound` for a missing or foreign
/// row, `Store` on database failure.
pub async fn delete_deal(
    state: &AppState,
    user: Option<&CurrentUser>,
    id: DealId,
) -> ActionResult<Mutated<()>> {
    let user = require_user(user)?;

    DealRepository::new(state.pool()).delete(user.id, id).await?;
    tracing::info!(deal_id = %id, "deal deleted");

    let invalidated = DEAL_VIEWS.to_vec();
    state.views().invalidate(user.id, &invalidated).await;

    Ok(Mutated {
        record: (),
        invalidated,
    })
}

/// List deals with stage/contact/search filters and pagination.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Store` on database failure.
pub async fn get_deals(
    state: &AppState,
    user: Option<&CurrentUser>,
    filter: &DealsFilter,
) -> ActionResult<Vec<DealWithRelations>> {
    let user = require_user(user)?;
    Ok(DealRepository::new(state.pool())
        .list(user.id, filter)
        .await?)
}

/// Fetch one deal with its activity log.
///
/// # Errors
///
/// `Unauthorized` without a caller, `NotFound` for a missing or foreign
/// row, `Store` on database failure.
pub async fn get_deal_by_id(
    state: &AppState,
    user: Option<&CurrentUser>,
    id: DealId,
) -> ActionResult<DealDetail> {
    let user = require_user(user)?;
    DealRepository::new(state.pool())
        .get_by_id(user.id, id)
        .await?
        .ok_or(ActionError::NotFound)
}

/// The caller's stages, ordered by ascending `order_index`.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Store` on database failure.
pub async fn get_deal_stages(
    state: &AppState,
    user: Option<&CurrentUser>,
) -> ActionResult<Vec<DealStage>> {
    let user = require_user(user)?;
    Ok(StageRepository::new(state.pool()).list(user.id).await?)
}

/// All deals grouped per stage for the Kanban board. Every stage yields a
/// column, empty or not, ordered by `order_index`.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Store` on database failure.
pub async fn get_deals_by_stage(
    state: &AppState,
    user: Option<&CurrentUser>,
) -> ActionResult<PipelineBoard> {
    let user = require_user(user)?;

    let stages = StageRepository::new(state.pool());
    let deals = DealRepository::new(state.pool());
    let deals_filter = DealsFilter::default();
    let (stages, deals) = tokio::try_join!(
        stages.list(user.id),
        deals.list(user.id, &deals_filter),
    )?;

    Ok(PipelineBoard::build(stages, deals))
}

/// Deal counts per stage for dashboard stats.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Store` on database failure.
pub async fn get_deals_count_by_stage(
    state: &AppState,
    user: Option<&CurrentUser>,
) -> ActionResult<Vec<StageDealCount>> {
    let user = require_user(user)?;
    Ok(DealRepository::new(state.pool())
        .count_by_stage(user.id)
        .await?)
}

/// Total deal value per stage for dashboard stats.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Store` on database failure.
pub async fn get_deal_value_by_stage(
    state: &AppState,
    user: Option<&CurrentUser>,
) -> ActionResult<Vec<StageDealValue>> {
    let user = require_user(user)?;
    Ok(DealRepository::new(state.pool())
        .value_by_stage(user.id)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_requires_stage() {
        let input = DealInput {
            title: "Engine License".to_owned(),
            description: None,
            value: Some(Decimal::from(5000)),
            stage_id: None,
            contact_id: None,
        };
        let err = sanitize(&input).expect_err("missing stage");
        assert_eq!(err, ActionError::Validation("Stage is required".to_owned()));
    }

    #[test]
    fn test_sanitize_requires_title() {
        let input = DealInput {
            title: "  ".to_owned(),
            description: None,
            value: None,
            stage_id: Some(StageId::generate()),
            contact_id: None,
        };
        let err = sanitize(&input).expect_err("blank title");
        assert_eq!(err, ActionError::Validation("Title is required".to_owned()));
    }

    #[test]
    fn test_sanitize_trims_description() {
        let input = DealInput {
            title: " Engine License ".to_owned(),
            description: Some("  annual renewal  ".to_owned()),
            value: None,
            stage_id: Some(StageId::generate()),
            contact_id: None,
        };
        let record = sanitize(&input).expect("valid input");
        assert_eq!(record.title, "Engine License");
        assert_eq!(record.description.as_deref(), Some("annual renewal"));
    }
}
