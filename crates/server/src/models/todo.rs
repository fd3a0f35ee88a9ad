//! Todo types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use copperline_core::TodoId;

/// A todo item.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    /// Todo's database ID.
    pub id: TodoId,
    /// Title (required, trimmed).
    pub title: String,
    /// Completion flag, false on creation.
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}
