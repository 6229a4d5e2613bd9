//! Application services - one method per (entity, operation).
//!
//! Each method takes the acting [`Actor`](crate::access::Actor), runs the
//! capability gate, then the lookup, then validation, in that order.

mod comments;
mod posts;

pub use comments::CommentService;
pub use posts::{PostDetail, PostService};

use crate::error::{DomainError, RepoError};

/// Map a repository miss on `id` to a typed not-found.
fn missing(entity_type: &'static str, id: i64) -> impl FnOnce(RepoError) -> DomainError {
    move |err| match err {
        RepoError::NotFound => DomainError::not_found(entity_type, id),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests;
