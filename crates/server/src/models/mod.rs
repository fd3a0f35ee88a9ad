//! Domain models.
//!
//! Plain data structures handed between the repositories, services, and
//! routes. Row-to-model conversion lives in the `db` modules; these types
//! never carry the owning `user_id` - scoping is the repositories' job.

pub mod activity;
pub mod contact;
pub mod deal;
pub mod session;
pub mod todo;
pub mod user;

pub use activity::{Activity, ActivityTypeCount, ActivityWithRelations, DealRef};
pub use contact::{Contact, ContactDetail, ContactSummary, ContactWithDeals};
pub use deal::{
    Deal, DealDetail, DealStage, DealSummary, DealWithRelations, StageDealCount, StageDealValue,
    StageSummary,
};
pub use session::{CurrentUser, session_keys};
pub use todo::Todo;
pub use user::User;
