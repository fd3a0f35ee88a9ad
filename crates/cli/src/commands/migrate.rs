//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! copperline-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `COPPERLINE_DATABASE_URL` - `PostgreSQL` connection string (falls
//!   back to `DATABASE_URL`)
//!
//! Migration files live in `crates/server/migrations/`:
//! ```text
//! migrations/
//! ├── 20260801000001_create_users.sql
//! ├── 20260801000002_create_sessions.sql
//! ├── 20260801000003_create_crm.sql
//! └── 20260801000004_create_todos.sql
//! ```

use tracing::info;

use super::{CommandError, connect};

/// Run all pending database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    info!("Connecting to database...");
    let pool = connect().await?;

    info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}
