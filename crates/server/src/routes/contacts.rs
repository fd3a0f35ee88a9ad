//! Contact route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use copperline_core::ContactId;

use super::Deleted;
use crate::db::contacts::ContactsFilter;
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::{Contact, ContactDetail, ContactWithDeals};
use crate::services;
use crate::services::contacts::ContactInput;
use crate::services::views;
use crate::state::AppState;

/// Build the contacts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contacts", get(list).post(create))
        .route("/contacts/count", get(count))
        .route("/contacts/{id}", get(show).put(update).delete(destroy))
        .route("/companies", get(companies))
}

/// Query string for contact listings.
#[derive(Debug, Deserialize)]
pub struct ContactListQuery {
    pub search: Option<String>,
    pub company: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<ContactListQuery> for ContactsFilter {
    fn from(query: ContactListQuery) -> Self {
        Self {
            search: query.search,
            company: query.company,
            limit: query.limit,
            offset: query.offset,
        }
    }
}

/// Response for a persisted contact.
#[derive(Debug, Serialize)]
pub struct ContactSaved {
    pub success: bool,
    pub contact: Contact,
    pub invalidated: Vec<String>,
}

async fn list(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Query(query): Query<ContactListQuery>,
) -> Result<Json<Vec<ContactWithDeals>>> {
    let contacts =
        services::contacts::get_contacts(&state, user.as_ref(), &query.into()).await?;
    Ok(Json(contacts))
}

async fn count(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Query(query): Query<ContactListQuery>,
) -> Result<Json<i64>> {
    let count =
        services::contacts::get_contacts_count(&state, user.as_ref(), &query.into()).await?;
    Ok(Json(count))
}

async fn companies(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>> {
    let companies = services::contacts::get_companies(&state, user.as_ref()).await?;
    Ok(Json(companies))
}

async fn show(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(id): Path<ContactId>,
) -> Result<Json<ContactDetail>> {
    let contact = services::contacts::get_contact_by_id(&state, user.as_ref(), id).await?;
    Ok(Json(contact))
}

async fn create(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Json(input): Json<ContactInput>,
) -> Result<Json<ContactSaved>> {
    let saved = services::contacts::create_contact(&state, user.as_ref(), &input).await?;
    Ok(Json(ContactSaved {
        success: true,
        contact: saved.record,
        invalidated: views::paths(&saved.invalidated),
    }))
}

async fn update(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(id): Path<ContactId>,
    Json(input): Json<ContactInput>,
) -> Result<Json<ContactSaved>> {
    let saved = services::contacts::update_contact(&state, user.as_ref(), id, &input).await?;
    Ok(Json(ContactSaved {
        success: true,
        contact: saved.record,
        invalidated: views::paths(&saved.invalidated),
    }))
}

async fn destroy(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(id): Path<ContactId>,
) -> Result<Json<Deleted>> {
    let deleted = services::contacts::delete_contact(&state, user.as_ref(), id).await?;
    Ok(Json(Deleted {
        success: true,
        invalidated: views::paths(&deleted.invalidated),
    }))
}
