//! Business services: the Mutation Gateway and Query Layer.
//!
//! Every operation here takes the caller's identity as an
//! `Option<&CurrentUser>` and fails with [`ActionError::Unauthorized`] when
//! it is absent - reads and writes share one contract, so "no data" is
//! never conflated with "no permission". Mutations validate input before
//! touching the Record Store, write exactly one row scoped by owner, and
//! return the set of views they staled alongside the persisted record.

pub mod activities;
pub mod auth;
pub mod contacts;
pub mod dashboard;
pub mod deals;
pub mod pipeline;
pub mod todos;
pub mod validate;
pub mod views;

use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::CurrentUser;
use views::ViewKey;

/// Errors crossing the gateway boundary. Converted from exceptions, never
/// thrown across it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    /// No valid caller identity; nothing was read or written.
    #[error("Unauthorized")]
    Unauthorized,

    /// Input rejected before any Record Store call.
    #[error("{0}")]
    Validation(String),

    /// The row doesn't exist or isn't owned by the caller.
    #[error("not found")]
    NotFound,

    /// A uniqueness or referential constraint was violated.
    #[error("{0}")]
    Conflict(String),

    /// Record Store failure, message passed through verbatim.
    #[error("{0}")]
    Store(String),
}

impl From<RepositoryError> for ActionError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Store(other.to_string()),
        }
    }
}

/// Result type alias for gateway and query operations.
pub type ActionResult<T> = Result<T, ActionError>;

/// Resolve the caller or fail with `Unauthorized` before any store access.
pub(crate) fn require_user(user: Option<&CurrentUser>) -> ActionResult<&CurrentUser> {
    user.ok_or(ActionError::Unauthorized)
}

/// A successful mutation: the persisted record plus the views it staled.
#[derive(Debug, Clone)]
pub struct Mutated<T> {
    /// The persisted row, joined with related summaries where applicable.
    pub record: T,
    /// Views the caller should consider stale.
    pub invalidated: Vec<ViewKey>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_message_is_exact() {
        assert_eq!(ActionError::Unauthorized.to_string(), "Unauthorized");
    }

    #[test]
    fn test_require_user_without_identity() {
        assert_eq!(require_user(None), Err(ActionError::Unauthorized));
    }

    #[test]
    fn test_repository_error_mapping() {
        let err: ActionError = RepositoryError::NotFound.into();
        assert_eq!(err, ActionError::NotFound);

        let err: ActionError = RepositoryError::Conflict("stage order 2 already in use".into()).into();
        assert_eq!(
            err,
            ActionError::Conflict("stage order 2 already in use".into())
        );

        let err: ActionError = RepositoryError::DataCorruption("bad row".into()).into();
        assert_eq!(err, ActionError::Store("data corruption: bad row".into()));
    }
}
