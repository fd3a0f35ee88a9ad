//! The pipeline board and its optimistic controller.
//!
//! [`board`] holds the grouped per-stage deal columns and the derived
//! metrics. [`controller`] is the state machine driving drag-and-drop
//! moves: optimistic local apply, persistence through a pluggable
//! [`controller::PipelineClient`], and full resynchronization when a
//! persist fails.

pub mod board;
pub mod controller;

pub use board::{MoveError, PipelineBoard, PipelineMetrics, StageColumn};
pub use controller::{
    DragOutcome, NoOpReason, PendingMove, PipelineClient, PipelineController, PipelineSnapshot,
};
