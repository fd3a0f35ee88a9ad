//! Authentication route handlers.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::RequireAuth;
use crate::middleware::auth::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", axum::routing::get(me))
}

/// Email + password credentials.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Response for successful register/login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: User,
}

/// Register a new account and log it in.
async fn register(
    session: Session,
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<AuthResponse>> {
    let user = AuthService::new(state.pool())
        .register(&credentials.email, &credentials.password)
        .await?;

    start_session(&session, &user).await?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok(Json(AuthResponse {
        success: true,
        user,
    }))
}

/// Login with email and password.
async fn login(
    session: Session,
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<AuthResponse>> {
    let user = AuthService::new(state.pool())
        .login(&credentials.email, &credentials.password)
        .await?;

    start_session(&session, &user).await?;

    Ok(Json(AuthResponse {
        success: true,
        user,
    }))
}

/// Logout: drop the session identity.
async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    clear_sentry_user();

    Ok(Json(serde_json::json!({ "success": true })))
}

/// The currently logged-in user.
async fn me(RequireAuth(user): RequireAuth) -> Json<CurrentUser> {
    Json(user)
}

async fn start_session(session: &Session, user: &User) -> Result<()> {
    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
    };
    set_current_user(session, &current)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    set_sentry_user(user.id.as_uuid(), Some(user.email.as_str()));
    Ok(())
}
