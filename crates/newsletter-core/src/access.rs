//! Capabilities, actors and the authorization gate.
//!
//! Every mutation is guarded by [`Actor::authorize`]: an anonymous actor is
//! rejected with [`DomainError::Unauthenticated`], an authenticated actor
//! without the named capability with [`DomainError::Forbidden`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// A named right to perform one mutation on one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    #[serde(rename = "add_post")]
    CreatePost,
    #[serde(rename = "change_post")]
    ChangePost,
    #[serde(rename = "delete_post")]
    DeletePost,
    #[serde(rename = "add_comment")]
    CreateComment,
    #[serde(rename = "change_comment")]
    ChangeComment,
    #[serde(rename = "delete_comment")]
    DeleteComment,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::CreatePost,
        Capability::ChangePost,
        Capability::DeletePost,
        Capability::CreateComment,
        Capability::ChangeComment,
        Capability::DeleteComment,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Capability::CreatePost => "add_post",
            Capability::ChangePost => "change_post",
            Capability::DeletePost => "delete_post",
            Capability::CreateComment => "add_comment",
            Capability::ChangeComment => "change_comment",
            Capability::DeleteComment => "delete_comment",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown capability: {0}")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.code() == s.trim())
            .ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

/// The set of capabilities held by one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Capability::ALL.into_iter().collect()
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn insert(&mut self, capability: Capability) -> bool {
        self.0.insert(capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    /// Comma-separated capability codes, the storage form.
    pub fn to_codes(&self) -> String {
        self.iter().map(Capability::code).collect::<Vec<_>>().join(",")
    }

    /// Parse comma-separated codes. Unknown codes are skipped with a warning.
    pub fn parse_codes(codes: &str) -> Self {
        codes
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .filter_map(|code| match code.parse::<Capability>() {
                Ok(capability) => Some(capability),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring capability code");
                    None
                }
            })
            .collect()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An authenticated identity and what it may do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub username: String,
    pub capabilities: CapabilitySet,
}

/// Whoever issues a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Actor {
    #[default]
    Anonymous,
    User(AuthenticatedUser),
}

impl Actor {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::User(_))
    }

    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            Actor::User(user) => Some(user),
            Actor::Anonymous => None,
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.user()
            .is_some_and(|u| u.capabilities.contains(capability))
    }

    /// Authentication first, then the capability.
    pub fn authorize(&self, capability: Capability) -> Result<&AuthenticatedUser, DomainError> {
        let user = self.user().ok_or(DomainError::Unauthenticated)?;
        if !user.capabilities.contains(capability) {
            tracing::debug!(
                user = %user.username,
                capability = %capability,
                "Capability check failed"
            );
            return Err(DomainError::Forbidden(capability));
        }
        Ok(user)
    }
}
