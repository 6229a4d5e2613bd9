//! Server-side sessions stored in a [`Cache`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use newsletter_core::ports::{Cache, SessionError, SessionStore};

/// Default idle lifetime of a session key: two weeks.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(14 * 24 * 3600);

/// Session store namespacing each key under `session:<id>:`.
pub struct CacheSessionStore {
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl CacheSessionStore {
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    fn key(session_id: &str, key: &str) -> String {
        format!("session:{session_id}:{key}")
    }
}

#[async_trait]
impl SessionStore for CacheSessionStore {
    async fn get(&self, session_id: &str, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.cache.get(&Self::key(session_id, key)).await)
    }

    async fn set(&self, session_id: &str, key: &str, value: &str) -> Result<(), SessionError> {
        self.cache
            .set(&Self::key(session_id, key), value, Some(self.ttl))
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))
    }

    async fn remove(&self, session_id: &str, key: &str) -> Result<Option<String>, SessionError> {
        self.cache
            .take(&Self::key(session_id, key))
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use newsletter_core::ports::CURRENT_POST_KEY;

    fn store() -> CacheSessionStore {
        CacheSessionStore::new(Arc::new(InMemoryCache::new()), DEFAULT_SESSION_TTL)
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = store();
        store.set("alice", CURRENT_POST_KEY, "3").await.unwrap();

        assert_eq!(
            store.get("alice", CURRENT_POST_KEY).await.unwrap(),
            Some("3".to_string())
        );
        assert_eq!(store.get("bob", CURRENT_POST_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_pops_value() {
        let store = store();
        store.set("alice", "flash", "Saved").await.unwrap();

        assert_eq!(
            store.remove("alice", "flash").await.unwrap(),
            Some("Saved".to_string())
        );
        assert_eq!(store.remove("alice", "flash").await.unwrap(), None);
    }
}
