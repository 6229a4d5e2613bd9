use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::post::PostId;

pub type CommentId = i64;

/// Comment entity - a reply attached to exactly one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: Uuid,
    pub text: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Comment {
    pub fn revise(&mut self, text: String) {
        self.text = text;
        self.modified = Utc::now();
    }
}

/// A comment that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: PostId,
    pub author_id: Uuid,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl NewComment {
    pub fn new(post_id: PostId, author_id: Uuid, text: String) -> Self {
        Self {
            post_id,
            author_id,
            text,
            created: Utc::now(),
        }
    }

    pub fn into_comment(self, id: CommentId) -> Comment {
        Comment {
            id,
            post_id: self.post_id,
            author_id: self.author_id,
            text: self.text,
            created: self.created,
            modified: self.created,
        }
    }
}
