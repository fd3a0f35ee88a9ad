//! Optimistic pipeline controller.
//!
//! Drives the drag-and-drop reassignment flow: apply the move locally
//! first (zero perceived latency), then persist it, and reconcile. A
//! failed persist discards all local state and replaces it with a fresh
//! server snapshot - coarse, but it guarantees the view converges on
//! whatever the server holds, even with several moves in flight.
//!
//! Per-drag lifecycle: `idle -> optimistic-pending -> reconciled |
//! rolled-back`. Moves are tracked per deal; a deal with a pending move
//! refuses a second drag until the first resolves.

use std::collections::HashSet;
use std::future::Future;

use serde::Serialize;

use copperline_core::{DealId, StageId};

use super::board::{MoveError, PipelineBoard, PipelineMetrics};
use crate::models::{Contact, DealStage, DealWithRelations};

/// One combined fetch of everything the pipeline view needs.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSnapshot {
    /// Stages ordered by ascending `order_index`.
    pub stages: Vec<DealStage>,
    /// All deals, joined with stage and contact summaries, newest first.
    pub deals: Vec<DealWithRelations>,
    /// All contacts (deal forms pick from these).
    pub contacts: Vec<Contact>,
}

/// Persistence seam for the controller.
///
/// Errors are plain strings: the controller treats every failure the same
/// way (notify + full resync), so no richer taxonomy is needed here.
pub trait PipelineClient {
    /// Fetch a fresh snapshot of stages, deals, and contacts.
    fn fetch(&self) -> impl Future<Output = Result<PipelineSnapshot, String>> + Send;

    /// Persist a deal's stage reassignment.
    fn move_deal(
        &self,
        deal_id: DealId,
        stage_id: StageId,
    ) -> impl Future<Output = Result<(), String>> + Send;
}

/// Why a drag did not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoOpReason {
    /// The board has not loaded yet.
    NotLoaded,
    /// The drag ended without a drop target.
    NoTarget,
    /// The dragged deal is not on the board.
    UnknownDeal,
    /// The drop target is not a stage column.
    UnknownStage,
    /// The deal was dropped back onto its current stage.
    SameStage,
    /// A previous move of this deal has not resolved yet.
    MoveInFlight,
}

impl From<MoveError> for NoOpReason {
    fn from(err: MoveError) -> Self {
        match err {
            MoveError::UnknownDeal => Self::UnknownDeal,
            MoveError::UnknownStage => Self::UnknownStage,
            MoveError::SameStage => Self::SameStage,
        }
    }
}

/// The user-visible result of a drag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DragOutcome {
    /// The optimistic move was confirmed by the server.
    Moved,
    /// Nothing happened (guard tripped before any state change).
    NoOp { reason: NoOpReason },
    /// The persist failed; local state was replaced with a fresh server
    /// snapshot. `error` carries the server's message verbatim.
    RolledBack { error: String },
}

/// A move that has been applied optimistically but not yet persisted.
///
/// Obtained from [`PipelineController::begin_move`] and consumed by
/// [`PipelineController::resolve`].
#[derive(Debug)]
pub struct PendingMove {
    deal_id: DealId,
    stage_id: StageId,
}

#[derive(Debug)]
enum ControllerState {
    Loading,
    Ready {
        board: PipelineBoard,
        contacts: Vec<Contact>,
    },
}

/// Client-resident pipeline state machine.
///
/// `loading -> ready` on the initial fetch; within `ready`, each drag runs
/// `idle -> optimistic-pending -> reconciled | rolled-back` independently,
/// keyed by the deal's identity.
pub struct PipelineController<C> {
    client: C,
    state: ControllerState,
    in_flight: HashSet<DealId>,
}

impl<C: PipelineClient> PipelineController<C> {
    /// Create a controller in the `loading` state.
    pub fn new(client: C) -> Self {
        Self {
            client,
            state: ControllerState::Loading,
            in_flight: HashSet::new(),
        }
    }

    /// Perform the initial combined fetch and enter `ready`.
    ///
    /// # Errors
    ///
    /// Returns the fetch error verbatim; the controller stays in `loading`.
    pub async fn load(&mut self) -> Result<(), String> {
        let snapshot = self.client.fetch().await?;
        self.install(snapshot);
        Ok(())
    }

    /// Whether the initial load has completed.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.state, ControllerState::Ready { .. })
    }

    /// The grouped board, once loaded.
    #[must_use]
    pub fn board(&self) -> Option<&PipelineBoard> {
        match &self.state {
            ControllerState::Ready { board, .. } => Some(board),
            ControllerState::Loading => None,
        }
    }

    /// The contact list, once loaded.
    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        match &self.state {
            ControllerState::Ready { contacts, .. } => contacts,
            ControllerState::Loading => &[],
        }
    }

    /// Derived metrics for the current board (zeros while loading).
    #[must_use]
    pub fn metrics(&self) -> PipelineMetrics {
        self.board().map_or(
            PipelineMetrics {
                total_deals: 0,
                total_value: rust_decimal::Decimal::ZERO,
                average_deal_size: rust_decimal::Decimal::ZERO,
            },
            PipelineBoard::metrics,
        )
    }

    /// Number of moves awaiting server confirmation.
    #[must_use]
    pub fn pending_moves(&self) -> usize {
        self.in_flight.len()
    }

    /// Apply a drag optimistically.
    ///
    /// Guards (no state change): board not loaded, no drop target, unknown
    /// deal or stage, same stage, or a move of this deal already in flight.
    /// On success the deal has already switched columns locally and the
    /// returned [`PendingMove`] must be passed to [`Self::resolve`].
    ///
    /// # Errors
    ///
    /// Returns the [`NoOpReason`] when a guard trips.
    pub fn begin_move(
        &mut self,
        deal_id: DealId,
        target: Option<StageId>,
    ) -> Result<PendingMove, NoOpReason> {
        let ControllerState::Ready { board, .. } = &mut self.state else {
            return Err(NoOpReason::NotLoaded);
        };
        let Some(stage_id) = target else {
            return Err(NoOpReason::NoTarget);
        };
        if self.in_flight.contains(&deal_id) {
            return Err(NoOpReason::MoveInFlight);
        }

        board.apply_move(deal_id, stage_id)?;
        self.in_flight.insert(deal_id);

        Ok(PendingMove { deal_id, stage_id })
    }

    /// Persist a pending move and reconcile.
    ///
    /// On success the optimistic state is already correct and stays. On
    /// failure the controller discards all local state - including any
    /// other optimistic moves still in flight - and refetches ground truth.
    pub async fn resolve(&mut self, pending: PendingMove) -> DragOutcome {
        match self
            .client
            .move_deal(pending.deal_id, pending.stage_id)
            .await
        {
            Ok(()) => {
                self.in_flight.remove(&pending.deal_id);
                tracing::debug!(deal_id = %pending.deal_id, stage_id = %pending.stage_id, "deal move confirmed");
                DragOutcome::Moved
            }
            Err(error) => {
                tracing::warn!(deal_id = %pending.deal_id, error = %error, "deal move failed, resyncing");
                self.resync().await;
                DragOutcome::RolledBack { error }
            }
        }
    }

    /// Convenience wrapper: begin and resolve a move in one call.
    pub async fn drag(&mut self, deal_id: DealId, target: Option<StageId>) -> DragOutcome {
        match self.begin_move(deal_id, target) {
            Ok(pending) => self.resolve(pending).await,
            Err(reason) => DragOutcome::NoOp { reason },
        }
    }

    /// Replace all local state with a fresh server snapshot.
    ///
    /// If even the refetch fails, fall back to `loading` so the next
    /// interaction retries the full fetch rather than trusting stale
    /// optimistic state.
    async fn resync(&mut self) {
        self.in_flight.clear();
        match self.client.fetch().await {
            Ok(snapshot) => self.install(snapshot),
            Err(error) => {
                tracing::error!(error = %error, "pipeline resync fetch failed");
                self.state = ControllerState::Loading;
            }
        }
    }

    fn install(&mut self, snapshot: PipelineSnapshot) {
        let board = PipelineBoard::build(snapshot.stages, snapshot.deals);
        self.state = ControllerState::Ready {
            board,
            contacts: snapshot.contacts,
        };
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rust_decimal::Decimal;

    use super::*;
    use crate::models::DealStage;
    use crate::pipeline::board::tests::{deal, stage};

    /// Mock persistence backend with a mutable "server" snapshot.
    #[derive(Clone)]
    struct MockClient {
        inner: Arc<Mutex<MockState>>,
    }

    struct MockState {
        snapshot: PipelineSnapshot,
        fail_moves: bool,
        move_calls: Vec<(DealId, StageId)>,
    }

    impl MockClient {
        fn new(snapshot: PipelineSnapshot) -> Self {
            Self {
                inner: Arc::new(Mutex::new(MockState {
                    snapshot,
                    fail_moves: false,
                    move_calls: Vec::new(),
                })),
            }
        }

        fn set_fail_moves(&self, fail: bool) {
            self.inner.lock().unwrap().fail_moves = fail;
        }

        fn set_snapshot(&self, snapshot: PipelineSnapshot) {
            self.inner.lock().unwrap().snapshot = snapshot;
        }

        fn move_calls(&self) -> Vec<(DealId, StageId)> {
            self.inner.lock().unwrap().move_calls.clone()
        }
    }

    impl PipelineClient for MockClient {
        async fn fetch(&self) -> Result<PipelineSnapshot, String> {
            Ok(self.inner.lock().unwrap().snapshot.clone())
        }

        async fn move_deal(&self, deal_id: DealId, stage_id: StageId) -> Result<(), String> {
            let mut state = self.inner.lock().unwrap();
            state.move_calls.push((deal_id, stage_id));
            if state.fail_moves {
                Err("stage update rejected".to_owned())
            } else {
                Ok(())
            }
        }
    }

    fn fixture() -> (PipelineSnapshot, DealStage, DealStage, DealId) {
        let lead = stage("Lead", 1);
        let won = stage("Won", 2);
        let d = deal("Engine License", &lead, Some(5000));
        let deal_id = d.deal.id;
        let snapshot = PipelineSnapshot {
            stages: vec![lead.clone(), won.clone()],
            deals: vec![d],
            contacts: Vec::new(),
        };
        (snapshot, lead, won, deal_id)
    }

    #[tokio::test]
    async fn test_load_groups_deals_by_stage() {
        let (snapshot, _, _, _) = fixture();
        let mut controller = PipelineController::new(MockClient::new(snapshot));
        assert!(!controller.is_ready());

        controller.load().await.unwrap();

        let board = controller.board().unwrap();
        assert_eq!(board.columns().len(), 2);
        assert_eq!(board.columns()[0].deals.len(), 1);
        assert!(board.columns()[1].deals.is_empty());
    }

    #[tokio::test]
    async fn test_drag_success_keeps_optimistic_state() {
        let (snapshot, _, won, deal_id) = fixture();
        let client = MockClient::new(snapshot);
        let mut controller = PipelineController::new(client.clone());
        controller.load().await.unwrap();

        let outcome = controller.drag(deal_id, Some(won.id)).await;

        assert_eq!(outcome, DragOutcome::Moved);
        assert_eq!(controller.board().unwrap().stage_of(deal_id), Some(won.id));
        assert_eq!(client.move_calls(), vec![(deal_id, won.id)]);
        assert_eq!(controller.pending_moves(), 0);
    }

    #[tokio::test]
    async fn test_optimistic_apply_happens_before_persist() {
        let (snapshot, _, won, deal_id) = fixture();
        let client = MockClient::new(snapshot);
        let mut controller = PipelineController::new(client.clone());
        controller.load().await.unwrap();

        let pending = controller.begin_move(deal_id, Some(won.id)).unwrap();

        // Local state already moved, no network call yet.
        assert_eq!(controller.board().unwrap().stage_of(deal_id), Some(won.id));
        assert!(client.move_calls().is_empty());
        assert_eq!(controller.pending_moves(), 1);

        let outcome = controller.resolve(pending).await;
        assert_eq!(outcome, DragOutcome::Moved);
    }

    #[tokio::test]
    async fn test_drag_guards_are_no_ops() {
        let (snapshot, lead, _, deal_id) = fixture();
        let client = MockClient::new(snapshot);
        let mut controller = PipelineController::new(client.clone());

        // Not loaded yet.
        let outcome = controller.drag(deal_id, Some(lead.id)).await;
        assert_eq!(
            outcome,
            DragOutcome::NoOp {
                reason: NoOpReason::NotLoaded
            }
        );

        controller.load().await.unwrap();

        // No drop target.
        let outcome = controller.drag(deal_id, None).await;
        assert_eq!(
            outcome,
            DragOutcome::NoOp {
                reason: NoOpReason::NoTarget
            }
        );

        // Same stage.
        let outcome = controller.drag(deal_id, Some(lead.id)).await;
        assert_eq!(
            outcome,
            DragOutcome::NoOp {
                reason: NoOpReason::SameStage
            }
        );

        // Unknown deal.
        let outcome = controller.drag(DealId::generate(), Some(lead.id)).await;
        assert_eq!(
            outcome,
            DragOutcome::NoOp {
                reason: NoOpReason::UnknownDeal
            }
        );

        // No guard reached the network.
        assert!(client.move_calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_drag_resyncs_to_server_truth() {
        let (snapshot, lead, won, deal_id) = fixture();
        let client = MockClient::new(snapshot);
        let mut controller = PipelineController::new(client.clone());
        controller.load().await.unwrap();

        // The server meanwhile holds something different from both the
        // pre-drag and the optimistic state: a second deal appeared.
        let extra = deal("Support Contract", &won, Some(900));
        let extra_id = extra.deal.id;
        client.set_snapshot(PipelineSnapshot {
            stages: vec![lead.clone(), won.clone()],
            deals: vec![deal("Engine License", &lead, Some(5000)), extra],
            contacts: Vec::new(),
        });
        client.set_fail_moves(true);

        let outcome = controller.drag(deal_id, Some(won.id)).await;

        assert_eq!(
            outcome,
            DragOutcome::RolledBack {
                error: "stage update rejected".to_owned()
            }
        );
        // Local state equals the fresh server fetch, not the pre-drag state.
        let board = controller.board().unwrap();
        assert!(board.find_deal(deal_id).is_none());
        assert_eq!(board.stage_of(extra_id), Some(won.id));
        assert_eq!(controller.pending_moves(), 0);
    }

    #[tokio::test]
    async fn test_in_flight_move_refuses_second_drag() {
        let (snapshot, lead, won, deal_id) = fixture();
        let client = MockClient::new(snapshot);
        let mut controller = PipelineController::new(client.clone());
        controller.load().await.unwrap();

        let pending = controller.begin_move(deal_id, Some(won.id)).unwrap();

        // Second drag of the same deal while the first is unresolved.
        assert_eq!(
            controller.begin_move(deal_id, Some(lead.id)).unwrap_err(),
            NoOpReason::MoveInFlight
        );

        let outcome = controller.resolve(pending).await;
        assert_eq!(outcome, DragOutcome::Moved);

        // Resolved - the deal can move again.
        assert!(controller.begin_move(deal_id, Some(lead.id)).is_ok());
    }

    #[tokio::test]
    async fn test_failure_discards_all_in_flight_moves() {
        let lead = stage("Lead", 1);
        let won = stage("Won", 2);
        let a = deal("Deal A", &lead, None);
        let b = deal("Deal B", &lead, None);
        let (a_id, b_id) = (a.deal.id, b.deal.id);
        let snapshot = PipelineSnapshot {
            stages: vec![lead.clone(), won.clone()],
            deals: vec![a, b],
            contacts: Vec::new(),
        };
        let client = MockClient::new(snapshot);
        let mut controller = PipelineController::new(client.clone());
        controller.load().await.unwrap();

        let pending_a = controller.begin_move(a_id, Some(won.id)).unwrap();
        let pending_b = controller.begin_move(b_id, Some(won.id)).unwrap();
        assert_eq!(controller.pending_moves(), 2);

        client.set_fail_moves(true);
        let outcome = controller.resolve(pending_a).await;
        assert!(matches!(outcome, DragOutcome::RolledBack { .. }));

        // The full resync also wiped B's optimistic move.
        let board = controller.board().unwrap();
        assert_eq!(board.stage_of(a_id), Some(lead.id));
        assert_eq!(board.stage_of(b_id), Some(lead.id));
        assert_eq!(controller.pending_moves(), 0);

        // B's late response resolves against cleared tracking without
        // touching the resynced board.
        client.set_fail_moves(false);
        let outcome = controller.resolve(pending_b).await;
        assert_eq!(outcome, DragOutcome::Moved);
        assert_eq!(controller.board().unwrap().stage_of(b_id), Some(lead.id));
    }

    #[tokio::test]
    async fn test_metrics_track_board_state() {
        let (snapshot, _, _, _) = fixture();
        let mut controller = PipelineController::new(MockClient::new(snapshot));

        // Loading: all zeros.
        assert_eq!(controller.metrics().total_deals, 0);

        controller.load().await.unwrap();
        let metrics = controller.metrics();
        assert_eq!(metrics.total_deals, 1);
        assert_eq!(metrics.total_value, Decimal::from(5000));
        assert_eq!(metrics.average_deal_size, Decimal::from(5000));
    }
}
