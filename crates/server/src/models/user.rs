//! User account types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use copperline_core::{Email, UserId};

/// A registered user. The password hash never leaves the `db` layer.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// User's database ID.
    pub id: UserId,
    /// User's email address (unique).
    pub email: Email,
    pub created_at: DateTime<Utc>,
}
