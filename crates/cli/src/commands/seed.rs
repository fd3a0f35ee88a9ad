//! Seed default pipeline stages and optional demo data for a user.
//!
//! New accounts need a stage set before the pipeline board is usable;
//! this command creates the standard five columns. With `--demo` it also
//! drops in a contact, a deal, an activity, and a todo so the dashboard
//! has something to show.

use rust_decimal::Decimal;
use tracing::info;

use copperline_core::Email;
use copperline_server::db::activities::ActivityRecord;
use copperline_server::db::contacts::ContactRecord;
use copperline_server::db::deals::DealRecord;
use copperline_server::db::{
    ActivityRepository, ContactRepository, DealRepository, StageRepository, TodoRepository,
    UserRepository,
};

use super::{CommandError, connect};

/// Seed stages (and optional demo data) for the user with `email`.
///
/// # Errors
///
/// Returns an error if the user doesn't exist, a stage position is
/// already taken, or the database is unreachable.
pub async fn run(email: &str, demo: bool) -> Result<(), CommandError> {
    let pool = connect().await?;

    let email = Email::parse(email).map_err(|_| CommandError::UnknownUser(email.to_owned()))?;
    let user = UserRepository::new(&pool)
        .get_by_email(&email)
        .await?
        .ok_or_else(|| CommandError::UnknownUser(email.to_string()))?;

    let stages = StageRepository::new(&pool).seed_defaults(user.id).await?;
    info!(count = stages.len(), "pipeline stages in place");

    if demo {
        seed_demo(&pool, user.id).await?;
    }

    info!("seed complete");
    Ok(())
}

async fn seed_demo(
    pool: &sqlx::PgPool,
    user_id: copperline_core::UserId,
) -> Result<(), CommandError> {
    let stages = StageRepository::new(pool).list(user_id).await?;
    let Some(first_stage) = stages.first() else {
        return Ok(());
    };

    let contact = ContactRepository::new(pool)
        .create(
            user_id,
            &ContactRecord {
                name: "Ada Lovelace".to_owned(),
                email: Some("ada@analytical.engine".to_owned()),
                phone: None,
                company: Some("Analytical Engines Ltd".to_owned()),
                notes: Some("Met at the computing society dinner.".to_owned()),
            },
        )
        .await?;
    info!(contact_id = %contact.id, "demo contact created");

    let deal = DealRepository::new(pool)
        .create(
            user_id,
            &DealRecord {
                title: "Engine License".to_owned(),
                description: Some("Annual license for the difference engine.".to_owned()),
                value: Some(Decimal::from(5000)),
                stage_id: first_stage.id,
                contact_id: Some(contact.id),
            },
        )
        .await?;
    info!(deal_id = %deal.deal.id, "demo deal created");

    ActivityRepository::new(pool)
        .create(
            user_id,
            &ActivityRecord {
                content: "Sent the initial proposal.".to_owned(),
                kind: copperline_core::ActivityKind::Email,
                contact_id: Some(contact.id),
                deal_id: Some(deal.deal.id),
            },
        )
        .await?;

    TodoRepository::new(pool)
        .create(user_id, "Follow up on the Engine License proposal")
        .await?;

    Ok(())
}
