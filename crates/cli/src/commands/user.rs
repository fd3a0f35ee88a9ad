//! User management commands.

use tracing::info;

use copperline_server::services::auth::AuthService;

use super::{CommandError, connect};

/// Create a new user account.
///
/// # Errors
///
/// Returns an error if the email is invalid, the password is too weak,
/// the email is taken, or the database is unreachable.
pub async fn create(email: &str, password: &str) -> Result<(), CommandError> {
    let pool = connect().await?;

    let user = AuthService::new(&pool).register(email, password).await?;
    info!(user_id = %user.id, email = %user.email, "user created");

    Ok(())
}
