use async_trait::async_trait;
use std::time::Duration;

/// Expiring key/value storage. Backs the server-side sessions.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get a live value.
    async fn get(&self, key: &str) -> Option<String>;

    /// Set a value with optional TTL.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Delete a key, returning the value it held.
    async fn take(&self, key: &str) -> Result<Option<String>, CacheError>;
}

/// Cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}
