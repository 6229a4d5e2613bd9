use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PostId = i64;

/// Longest accepted title, in characters.
pub const TITLE_MAX_LENGTH: usize = 512;

/// Post entity - an authored article with a markdown body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: Uuid,
    pub title: String,
    pub text: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Post {
    /// Apply an edit. Only `title` and `text` change; `modified` is refreshed.
    pub fn revise(&mut self, title: String, text: String) {
        self.title = title;
        self.text = text;
        self.modified = Utc::now();
    }
}

/// A post that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub title: String,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl NewPost {
    pub fn new(author_id: Uuid, title: String, text: String) -> Self {
        Self {
            author_id,
            title,
            text,
            created: Utc::now(),
        }
    }

    /// Materialize with the id assigned by the store.
    pub fn into_post(self, id: PostId) -> Post {
        Post {
            id,
            author_id: self.author_id,
            title: self.title,
            text: self.text,
            created: self.created,
            modified: self.created,
        }
    }
}
