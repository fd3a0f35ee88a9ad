//! Contact operations: gateway mutations and scoped queries.

use serde::Deserialize;

use copperline_core::ContactId;

use super::views::ViewKey;
use super::{ActionError, ActionResult, Mutated, require_user, validate};
use crate::db::ContactRepository;
use crate::db::contacts::{ContactRecord, ContactsFilter};
use crate::models::{Contact, ContactDetail, ContactWithDeals, CurrentUser};
use crate::state::AppState;

/// Editable contact fields as submitted by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

fn sanitize(input: &ContactInput) -> ActionResult<ContactRecord> {
    Ok(ContactRecord {
        name: validate::required_trimmed(&input.name, "Name is required")?,
        email: validate::optional_trimmed(input.email.as_deref()),
        phone: validate::optional_trimmed(input.phone.as_deref()),
        company: validate::optional_trimmed(input.company.as_deref()),
        notes: validate::optional_trimmed(input.notes.as_deref()),
    })
}

/// Create a new contact.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Validation` on a blank name, `Store`
/// on database failure.
pub async fn create_contact(
    state: &AppState,
    user: Option<&CurrentUser>,
    input: &ContactInput,
) -> ActionResult<Mutated<Contact>> {
    let user = require_user(user)?;
    let record = sanitize(input)?;

    let contact = ContactRepository::new(state.pool())
        .create(user.id, &record)
        .await?;
    tracing::info!(contact_id = %contact.id, "contact created");

    let invalidated = vec![ViewKey::Dashboard, ViewKey::Contacts];
    state.views().invalidate(user.id, &invalidated).await;

    Ok(Mutated {
        record: contact,
        invalidated,
    })
}

/// Update an existing contact.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Validation` on a blank name,
/// `NotFound` for a missing or foreign row, `Store` on database failure.
pub async fn update_contact(
    state: &AppState,
    user: Option<&CurrentUser>,
    id: ContactId,
    input: &ContactInput,
) -> ActionResult<Mutated<Contact>> {
    let user = require_user(user)?;
    let record = sanitize(input)?;

    let contact = ContactRepository::new(state.pool())
        .update(user.id, id, &record)
        .await?;

    let invalidated = vec![ViewKey::Dashboard, ViewKey::Contacts, ViewKey::Contact(id)];
    state.views().invalidate(user.id, &invalidated).await;

    Ok(Mutated {
        record: contact,
        invalidated,
    })
}

/// Delete a contact. Its activities cascade away and its deals keep
/// running unlinked.
///
/// # Errors
///
/// `Unauthorized` without a caller, `NotFound` for a missing or foreign
/// row, `Store` on database failure.
pub async fn delete_contact(
    state: &AppState,
    user: Option<&CurrentUser>,
    id: ContactId,
) -> ActionResult<Mutated<()>> {
    let user = require_user(user)?;

    ContactRepository::new(state.pool())
        .delete(user.id, id)
        .await?;
    tracing::info!(contact_id = %id, "contact deleted");

    let invalidated = vec![
        ViewKey::Dashboard,
        ViewKey::Contacts,
        ViewKey::Contact(id),
        ViewKey::Pipeline,
    ];
    state.views().invalidate(user.id, &invalidated).await;

    Ok(Mutated {
        record: (),
        invalidated,
    })
}

/// List contacts with search/company filters and pagination.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Store` on database failure.
pub async fn get_contacts(
    state: &AppState,
    user: Option<&CurrentUser>,
    filter: &ContactsFilter,
) -> ActionResult<Vec<ContactWithDeals>> {
    let user = require_user(user)?;
    Ok(ContactRepository::new(state.pool())
        .list(user.id, filter)
        .await?)
}

/// Fetch one contact with its deals and activity log.
///
/// # Errors
///
/// `Unauthorized` without a caller, `NotFound` for a missing or foreign
/// row, `Store` on database failure.
pub async fn get_contact_by_id(
    state: &AppState,
    user: Option<&CurrentUser>,
    id: ContactId,
) -> ActionResult<ContactDetail> {
    let user = require_user(user)?;
    ContactRepository::new(state.pool())
        .get_by_id(user.id, id)
        .await?
        .ok_or(ActionError::NotFound)
}

/// Count contacts honoring the same filters as [`get_contacts`].
///
/// # Errors
///
/// `Unauthorized` without a caller, `Store` on database failure.
pub async fn get_contacts_count(
    state: &AppState,
    user: Option<&CurrentUser>,
    filter: &ContactsFilter,
) -> ActionResult<i64> {
    let user = require_user(user)?;
    Ok(ContactRepository::new(state.pool())
        .count(user.id, filter)
        .await?)
}

/// Distinct companies across the caller's contacts, sorted.
///
/// # Errors
///
/// `Unauthorized` without a caller, `Store` on database failure.
pub async fn get_companies(
    state: &AppState,
    user: Option<&CurrentUser>,
) -> ActionResult<Vec<String>> {
    let user = require_user(user)?;
    Ok(ContactRepository::new(state.pool())
        .companies(user.id)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> ContactInput {
        ContactInput {
            name: name.to_owned(),
            email: Some("  ada@example.com ".to_owned()),
            phone: None,
            company: Some("".to_owned()),
            notes: None,
        }
    }

    #[test]
    fn test_sanitize_trims_and_collapses() {
        let record = sanitize(&input("  Ada Lovelace  ")).expect("valid input");
        assert_eq!(record.name, "Ada Lovelace");
        assert_eq!(record.email.as_deref(), Some("ada@example.com"));
        assert_eq!(record.company, None);
    }

    #[test]
    fn test_sanitize_rejects_blank_name() {
        let err = sanitize(&input("   ")).expect_err("blank name");
        assert_eq!(err, ActionError::Validation("Name is required".to_owned()));
    }
}
