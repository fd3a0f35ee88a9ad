//! Database operations for Copperline `PostgreSQL`.
//!
//! # Tables
//!
//! - `users` - Account identities (email + argon2 password hash)
//! - `sessions` - tower-sessions storage
//! - `contacts` - CRM contacts
//! - `deal_stages` - Per-user pipeline stages (unique `order_index` per user)
//! - `deals` - Sales deals (always staged, optionally linked to a contact)
//! - `activities` - Activity log entries (linked to a contact and/or deal)
//! - `todos` - Todo items
//!
//! Every table except `users` and `sessions` carries a `user_id` owner
//! column; every query in this module filters on it, so one user can never
//! read or mutate another user's rows even with a guessed ID.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p copperline-cli -- migrate
//! ```

pub mod activities;
pub mod contacts;
pub mod deal_stages;
pub mod deals;
pub mod todos;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use activities::ActivityRepository;
pub use contacts::ContactRepository;
pub use deal_stages::StageRepository;
pub use deals::DealRepository;
pub use todos::TodoRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found (or not owned by the caller).
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate stage order).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
