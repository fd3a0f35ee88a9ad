//! Dashboard route handler.

use axum::{Json, extract::State};

use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::services;
use crate::state::AppState;

/// Aggregate dashboard stats, served from the view cache.
pub async fn show(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>> {
    let summary = services::dashboard::get_dashboard(&state, user.as_ref()).await?;
    Ok(Json(summary))
}
