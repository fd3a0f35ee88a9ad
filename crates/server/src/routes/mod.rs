//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (verifies database)
//!
//! # Auth
//! POST /auth/register               - Register with email + password
//! POST /auth/login                  - Login
//! POST /auth/logout                 - Logout
//! GET  /auth/me                     - Current user
//!
//! # Dashboard
//! GET  /api/dashboard               - Aggregate stats (cached)
//!
//! # Contacts
//! GET    /api/contacts              - List (search/company/limit/offset)
//! POST   /api/contacts              - Create
//! GET    /api/contacts/count        - Count with the same filters
//! GET    /api/companies             - Distinct companies
//! GET    /api/contacts/{id}         - Detail (deals + activity log)
//! PUT    /api/contacts/{id}         - Update
//! DELETE /api/contacts/{id}         - Delete
//! GET    /api/contacts/{id}/activities - Contact activity feed
//!
//! # Deals
//! GET    /api/deals                 - List (stage/contact/search filters)
//! POST   /api/deals                 - Create
//! GET    /api/deals/stages          - Stages ordered by order_index
//! GET    /api/deals/by-stage        - Deals grouped per stage
//! GET    /api/deals/count-by-stage  - Counts per stage
//! GET    /api/deals/value-by-stage  - Value totals per stage
//! GET    /api/deals/{id}            - Detail (activity log)
//! PUT    /api/deals/{id}            - Update
//! PUT    /api/deals/{id}/stage      - Reassign stage
//! DELETE /api/deals/{id}            - Delete
//! GET    /api/deals/{id}/activities - Deal activity feed
//!
//! # Pipeline
//! GET  /api/pipeline                - Board + metrics + contacts (cached)
//! POST /api/pipeline/move           - Optimistic move through the controller
//!
//! # Activities
//! GET    /api/activities            - List (type/contact/deal filters)
//! POST   /api/activities            - Create
//! GET    /api/activities/recent     - Most recent activities
//! GET    /api/activities/count-by-type - Counts per kind
//! GET    /api/activities/{id}       - Detail
//! PUT    /api/activities/{id}       - Update content/type
//! DELETE /api/activities/{id}       - Delete
//!
//! # Todos
//! GET    /api/todos                 - List (completed/limit)
//! POST   /api/todos                 - Create
//! GET    /api/todos/count           - Count
//! GET    /api/todos/{id}            - Detail
//! PUT    /api/todos/{id}            - Rename
//! POST   /api/todos/{id}/toggle     - Set completion
//! DELETE /api/todos/{id}            - Delete
//! ```
//!
//! Every mutation responds with `{"success": true, ...}` plus the list of
//! view paths it staled; every error responds with `{"error": "..."}`.

pub mod activities;
pub mod auth;
pub mod contacts;
pub mod dashboard;
pub mod deals;
pub mod pipeline;
pub mod todos;

use axum::{Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Response body for deletions: no entity, just the staled views.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub success: bool,
    pub invalidated: Vec<String>,
}

/// Build the application router (everything except health checks).
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/api", api_routes())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::show))
        .merge(contacts::router())
        .merge(deals::router())
        .merge(pipeline::router())
        .merge(activities::router())
        .merge(todos::router())
}
