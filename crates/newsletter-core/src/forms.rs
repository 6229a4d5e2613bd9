//! Client-submitted input for posts and comments.
//!
//! Only the editable fields are accepted: `author`, `post` and the
//! timestamps are always filled in server-side.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::DomainError;

/// Title and body of a post, from the create and update forms.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PostForm {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 512,
        message = "Title must be between 1 and 512 characters."
    ))]
    pub title: String,

    #[serde(default)]
    pub text: String,
}

impl PostForm {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }

    /// Strip surrounding whitespace, then validate.
    pub fn clean(self) -> Result<Self, DomainError> {
        let cleaned = Self {
            title: self.title.trim().to_string(),
            text: self.text.trim().to_string(),
        };
        cleaned.validate()?;
        Ok(cleaned)
    }
}

/// Body of a comment, from the comment forms.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub text: String,
}

impl CommentForm {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn clean(self) -> Result<Self, DomainError> {
        let cleaned = Self {
            text: self.text.trim().to_string(),
        };
        cleaned.validate()?;
        Ok(cleaned)
    }
}
