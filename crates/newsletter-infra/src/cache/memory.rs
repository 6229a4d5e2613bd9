//! Process-local cache holding session data.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use newsletter_core::ports::{Cache, CacheError};

/// A value and the instant after which it is gone. `None` never expires.
type Slot = (String, Option<Instant>);

fn live(slot: &Slot, now: Instant) -> bool {
    slot.1.is_none_or(|deadline| now <= deadline)
}

/// `HashMap` behind a tokio `RwLock`. Contents do not survive a restart.
///
/// Reads ignore expired slots without touching the lock for writing; the
/// slots themselves are reclaimed by `take`, by overwrites, and in bulk by
/// [`InMemoryCache::purge_expired`].
#[derive(Default)]
pub struct InMemoryCache {
    slots: RwLock<HashMap<String, Slot>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every expired slot and reports how many went.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut slots = self.slots.write().await;
        let held = slots.len();
        slots.retain(|_, slot| live(slot, now));

        let purged = held - slots.len();
        if purged > 0 {
            tracing::debug!(purged, "purged expired cache entries");
        }
        purged
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let slots = self.slots.read().await;
        slots
            .get(key)
            .filter(|slot| live(slot, Instant::now()))
            .map(|(value, _)| value.clone())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let deadline = ttl.map(|ttl| Instant::now() + ttl);
        self.slots
            .write()
            .await
            .insert(key.to_owned(), (value.to_owned(), deadline));
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, CacheError> {
        let slot = self.slots.write().await.remove(key);
        Ok(slot
            .filter(|slot| live(slot, Instant::now()))
            .map(|(value, _)| value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLINK: Duration = Duration::from_millis(1);

    async fn after_blink() {
        tokio::time::sleep(BLINK * 5).await;
    }

    #[tokio::test]
    async fn test_values_without_ttl_stay() {
        let cache = InMemoryCache::new();
        cache.set("session:1:current_post", "4", None).await.unwrap();
        after_blink().await;
        assert_eq!(cache.get("session:1:current_post").await.as_deref(), Some("4"));
    }

    #[tokio::test]
    async fn test_take_hands_out_the_value_once() {
        let cache = InMemoryCache::new();
        cache.set("flash", "hello", None).await.unwrap();

        assert_eq!(cache.take("flash").await.unwrap().as_deref(), Some("hello"));
        assert_eq!(cache.take("flash").await.unwrap(), None);
        assert_eq!(cache.get("flash").await, None);
    }

    #[tokio::test]
    async fn test_expired_values_are_invisible_then_purged() {
        let cache = InMemoryCache::new();
        cache.set("short", "v", Some(BLINK)).await.unwrap();
        cache.set("long", "v", Some(Duration::from_secs(60))).await.unwrap();
        after_blink().await;

        assert_eq!(cache.get("short").await, None);
        assert_eq!(cache.take("short").await.unwrap(), None);

        cache.set("short", "v", Some(BLINK)).await.unwrap();
        after_blink().await;
        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.get("long").await.as_deref(), Some("v"));
    }
}
