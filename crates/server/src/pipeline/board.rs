//! Grouped pipeline board state and derived metrics.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use copperline_core::{DealId, StageId};

use crate::models::{DealStage, DealWithRelations, StageSummary};

/// A single pipeline column: one stage and its deals.
///
/// A stage with no matching deals keeps an empty sequence - it is never
/// dropped from the board.
#[derive(Debug, Clone, Serialize)]
pub struct StageColumn {
    pub stage: DealStage,
    pub deals: Vec<DealWithRelations>,
}

/// Errors from applying a local move to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    /// The deal is not on the board.
    #[error("deal is not on the board")]
    UnknownDeal,
    /// The target stage is not a column of the board.
    #[error("target stage is not on the board")]
    UnknownStage,
    /// The deal already sits in the target stage.
    #[error("deal is already in the target stage")]
    SameStage,
}

/// Derived pipeline metrics, recomputed from the grouped state on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PipelineMetrics {
    /// Sum of per-stage deal counts.
    pub total_deals: u64,
    /// Sum of deal values across all stages; a missing value counts as 0.
    pub total_value: Decimal,
    /// `total_value / total_deals`, or 0 when there are no deals.
    pub average_deal_size: Decimal,
}

/// Deals grouped into per-stage ordered columns.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineBoard {
    columns: Vec<StageColumn>,
}

impl PipelineBoard {
    /// Group `deals` under `stages`. Stage order is preserved (callers pass
    /// stages ordered by `order_index`); deal order within a column follows
    /// the input order (newest first from the Query Layer).
    #[must_use]
    pub fn build(stages: Vec<DealStage>, deals: Vec<DealWithRelations>) -> Self {
        let mut columns: Vec<StageColumn> = stages
            .into_iter()
            .map(|stage| StageColumn {
                stage,
                deals: Vec::new(),
            })
            .collect();

        for deal in deals {
            if let Some(column) = columns.iter_mut().find(|c| c.stage.id == deal.deal.stage_id) {
                column.deals.push(deal);
            }
        }

        Self { columns }
    }

    /// The board's columns, in stage order.
    #[must_use]
    pub fn columns(&self) -> &[StageColumn] {
        &self.columns
    }

    /// Find a deal anywhere on the board.
    #[must_use]
    pub fn find_deal(&self, id: DealId) -> Option<&DealWithRelations> {
        self.columns
            .iter()
            .flat_map(|c| c.deals.iter())
            .find(|d| d.deal.id == id)
    }

    /// The stage a deal currently sits in.
    #[must_use]
    pub fn stage_of(&self, id: DealId) -> Option<StageId> {
        self.find_deal(id).map(|d| d.deal.stage_id)
    }

    /// Apply a local move: remove the deal from its current column and
    /// append it to the target column, updating its stage reference.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError`] if the deal or target stage is unknown, or the
    /// deal already sits in the target stage. The board is unchanged on
    /// error.
    pub fn apply_move(&mut self, id: DealId, target: StageId) -> Result<(), MoveError> {
        let current = self.stage_of(id).ok_or(MoveError::UnknownDeal)?;
        if current == target {
            return Err(MoveError::SameStage);
        }

        let target_summary = self
            .columns
            .iter()
            .find(|c| c.stage.id == target)
            .map(|c| StageSummary {
                id: c.stage.id,
                name: c.stage.name.clone(),
                order_index: c.stage.order_index,
            })
            .ok_or(MoveError::UnknownStage)?;

        let mut moved = None;
        for column in &mut self.columns {
            if column.stage.id == current
                && let Some(pos) = column.deals.iter().position(|d| d.deal.id == id)
            {
                moved = Some(column.deals.remove(pos));
                break;
            }
        }

        let mut deal = moved.ok_or(MoveError::UnknownDeal)?;
        deal.deal.stage_id = target;
        deal.stage = target_summary;

        for column in &mut self.columns {
            if column.stage.id == target {
                column.deals.push(deal);
                break;
            }
        }

        Ok(())
    }

    /// Recompute the derived metrics from the current grouped state.
    #[must_use]
    pub fn metrics(&self) -> PipelineMetrics {
        let total_deals: u64 = self.columns.iter().map(|c| c.deals.len() as u64).sum();
        let total_value: Decimal = self
            .columns
            .iter()
            .flat_map(|c| c.deals.iter())
            .map(|d| d.deal.value.unwrap_or(Decimal::ZERO))
            .sum();
        let average_deal_size = if total_deals == 0 {
            Decimal::ZERO
        } else {
            total_value / Decimal::from(total_deals)
        };

        PipelineMetrics {
            total_deals,
            total_value,
            average_deal_size,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use copperline_core::{ContactId, DealId, StageId};

    use super::*;
    use crate::models::Deal;

    pub(crate) fn stage(name: &str, order_index: i32) -> DealStage {
        DealStage {
            id: StageId::generate(),
            name: name.to_owned(),
            order_index,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn deal(title: &str, stage: &DealStage, value: Option<i64>) -> DealWithRelations {
        DealWithRelations {
            deal: Deal {
                id: DealId::generate(),
                title: title.to_owned(),
                description: None,
                value: value.map(Decimal::from),
                stage_id: stage.id,
                contact_id: None::<ContactId>,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            contact: None,
            stage: StageSummary {
                id: stage.id,
                name: stage.name.clone(),
                order_index: stage.order_index,
            },
        }
    }

    #[test]
    fn test_build_keeps_empty_stages() {
        let lead = stage("Lead", 1);
        let won = stage("Won", 2);
        let d = deal("Engine License", &lead, Some(5000));

        let board = PipelineBoard::build(vec![lead.clone(), won.clone()], vec![d]);

        assert_eq!(board.columns().len(), 2);
        assert_eq!(board.columns()[0].deals.len(), 1);
        assert!(board.columns()[1].deals.is_empty());
    }

    #[test]
    fn test_apply_move_shifts_columns() {
        let lead = stage("Lead", 1);
        let won = stage("Won", 2);
        let d = deal("Engine License", &lead, Some(5000));
        let deal_id = d.deal.id;

        let mut board = PipelineBoard::build(vec![lead.clone(), won.clone()], vec![d]);
        board.apply_move(deal_id, won.id).unwrap();

        assert!(board.columns()[0].deals.is_empty());
        assert_eq!(board.columns()[1].deals.len(), 1);
        let moved = board.find_deal(deal_id).unwrap();
        assert_eq!(moved.deal.stage_id, won.id);
        assert_eq!(moved.stage.id, won.id);
    }

    #[test]
    fn test_apply_move_appends_to_target() {
        let lead = stage("Lead", 1);
        let won = stage("Won", 2);
        let existing = deal("Old Deal", &won, None);
        let moving = deal("New Deal", &lead, None);
        let moving_id = moving.deal.id;

        let mut board = PipelineBoard::build(vec![lead, won.clone()], vec![existing, moving]);
        board.apply_move(moving_id, won.id).unwrap();

        let column = &board.columns()[1];
        assert_eq!(column.deals.len(), 2);
        assert_eq!(column.deals[1].deal.id, moving_id);
    }

    #[test]
    fn test_apply_move_rejections() {
        let lead = stage("Lead", 1);
        let won = stage("Won", 2);
        let d = deal("Engine License", &lead, None);
        let deal_id = d.deal.id;

        let mut board = PipelineBoard::build(vec![lead.clone(), won], vec![d]);

        assert_eq!(
            board.apply_move(deal_id, lead.id),
            Err(MoveError::SameStage)
        );
        assert_eq!(
            board.apply_move(deal_id, StageId::generate()),
            Err(MoveError::UnknownStage)
        );
        assert_eq!(
            board.apply_move(DealId::generate(), lead.id),
            Err(MoveError::UnknownDeal)
        );
        // board unchanged after rejections
        assert_eq!(board.columns()[0].deals.len(), 1);
    }

    #[test]
    fn test_metrics_treats_missing_value_as_zero() {
        let lead = stage("Lead", 1);
        let won = stage("Won", 2);
        let board = PipelineBoard::build(
            vec![lead.clone(), won.clone()],
            vec![
                deal("A", &lead, Some(5000)),
                deal("B", &lead, None),
                deal("C", &won, Some(1000)),
            ],
        );

        let metrics = board.metrics();
        assert_eq!(metrics.total_deals, 3);
        assert_eq!(metrics.total_value, Decimal::from(6000));
        assert_eq!(metrics.average_deal_size, Decimal::from(2000));
    }

    #[test]
    fn test_metrics_empty_board_average_is_zero() {
        let board = PipelineBoard::build(vec![stage("Lead", 1)], vec![]);

        let metrics = board.metrics();
        assert_eq!(metrics.total_deals, 0);
        assert_eq!(metrics.total_value, Decimal::ZERO);
        assert_eq!(metrics.average_deal_size, Decimal::ZERO);
    }
}
