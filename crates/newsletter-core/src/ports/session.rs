//! Per-client session storage.

use async_trait::async_trait;

/// Key holding the id of the post the client last viewed.
pub const CURRENT_POST_KEY: &str = "current_post";

/// Key holding a one-shot message for the next rendered page.
pub const FLASH_KEY: &str = "flash";

/// Key/value storage scoped to one client session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str, key: &str) -> Result<Option<String>, SessionError>;

    async fn set(&self, session_id: &str, key: &str, value: &str) -> Result<(), SessionError>;

    /// Remove a key, returning what it held.
    async fn remove(&self, session_id: &str, key: &str) -> Result<Option<String>, SessionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session backend failed: {0}")]
    Backend(String),
}
