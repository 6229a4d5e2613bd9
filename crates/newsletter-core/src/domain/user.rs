use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::{AuthenticatedUser, CapabilitySet};

/// User entity - someone who can sign in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub capabilities: CapabilitySet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(username: String, password_hash: String, capabilities: CapabilitySet) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            capabilities,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn identity(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            id: self.id,
            username: self.username.clone(),
            capabilities: self.capabilities.clone(),
        }
    }
}
