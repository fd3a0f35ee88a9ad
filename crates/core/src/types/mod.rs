//! Core types for Copperline.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod activity;
pub mod email;
pub mod id;

pub use activity::{ActivityKind, ActivityKindError};
pub use email::{Email, EmailError};
pub use id::*;
