//! View invalidation keys and the per-user view cache.
//!
//! Each mutation declares the views it stales as an explicit, enumerable
//! set of [`ViewKey`]s - returned to the caller and applied to the cache,
//! never ambient global state. The cache itself holds rendered view
//! payloads (dashboard, pipeline) per user with a short TTL; invalidation
//! just evicts the affected entries so the next read recomputes.

use core::fmt;
use std::time::Duration;

use moka::future::Cache;

use copperline_core::{ContactId, UserId};

/// Cache entries expire on their own after this long even without an
/// explicit invalidation.
const VIEW_TTL: Duration = Duration::from_secs(60);

const MAX_CACHED_VIEWS: u64 = 10_000;

/// A view a mutation can stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKey {
    /// The dashboard overview.
    Dashboard,
    /// The contact list.
    Contacts,
    /// One contact's detail view.
    Contact(ContactId),
    /// The pipeline board.
    Pipeline,
    /// The activity log.
    Activities,
    /// The todo list.
    Todos,
}

impl ViewKey {
    /// The string path identifying this view to clients.
    #[must_use]
    pub fn as_path(&self) -> String {
        match self {
            Self::Dashboard => "/dashboard".to_owned(),
            Self::Contacts => "/dashboard/contacts".to_owned(),
            Self::Contact(id) => format!("/dashboard/contacts/{id}"),
            Self::Pipeline => "/dashboard/pipeline".to_owned(),
            Self::Activities => "/dashboard/activities".to_owned(),
            Self::Todos => "/dashboard/todos".to_owned(),
        }
    }
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_path())
    }
}

/// Render a key set as the string paths surfaced in mutation responses.
#[must_use]
pub fn paths(keys: &[ViewKey]) -> Vec<String> {
    keys.iter().map(ViewKey::as_path).collect()
}

/// Per-user cache of rendered view payloads.
#[derive(Clone)]
pub struct ViewCache {
    cache: Cache<(UserId, String), serde_json::Value>,
}

impl ViewCache {
    /// Create a cache with the default capacity and TTL.
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_CACHED_VIEWS)
            .time_to_live(VIEW_TTL)
            .build();
        Self { cache }
    }

    /// Look up a cached view payload.
    pub async fn get(&self, user_id: UserId, key: &ViewKey) -> Option<serde_json::Value> {
        self.cache.get(&(user_id, key.as_path())).await
    }

    /// Store a rendered view payload.
    pub async fn insert(&self, user_id: UserId, key: &ViewKey, value: serde_json::Value) {
        self.cache.insert((user_id, key.as_path()), value).await;
    }

    /// Evict every entry a mutation staled.
    pub async fn invalidate(&self, user_id: UserId, keys: &[ViewKey]) {
        for key in keys {
            self.cache.invalidate(&(user_id, key.as_path())).await;
        }
    }
}

impl Default for ViewCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_view_key_paths() {
        assert_eq!(ViewKey::Dashboard.as_path(), "/dashboard");
        assert_eq!(ViewKey::Pipeline.as_path(), "/dashboard/pipeline");

        let id = ContactId::generate();
        assert_eq!(
            ViewKey::Contact(id).as_path(),
            format!("/dashboard/contacts/{id}")
        );
    }

    #[test]
    fn test_paths_preserves_order() {
        let rendered = paths(&[ViewKey::Dashboard, ViewKey::Todos]);
        assert_eq!(rendered, vec!["/dashboard", "/dashboard/todos"]);
    }

    #[tokio::test]
    async fn test_cache_roundtrip_and_invalidation() {
        let cache = ViewCache::new();
        let user = UserId::generate();

        assert!(cache.get(user, &ViewKey::Dashboard).await.is_none());

        cache
            .insert(user, &ViewKey::Dashboard, json!({"todos": 3}))
            .await;
        assert_eq!(
            cache.get(user, &ViewKey::Dashboard).await,
            Some(json!({"todos": 3}))
        );

        cache
            .invalidate(user, &[ViewKey::Dashboard, ViewKey::Pipeline])
            .await;
        assert!(cache.get(user, &ViewKey::Dashboard).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_is_per_user() {
        let cache = ViewCache::new();
        let alice = UserId::generate();
        let bob = UserId::generate();

        cache
            .insert(alice, &ViewKey::Pipeline, json!({"deals": 1}))
            .await;

        assert!(cache.get(bob, &ViewKey::Pipeline).await.is_none());
    }
}
