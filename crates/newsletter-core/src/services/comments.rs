use std::sync::Arc;

use crate::access::{Actor, Capability};
use crate::domain::{Comment, CommentId, NewComment, Post, PostId};
use crate::error::DomainError;
use crate::forms::CommentForm;
use crate::ports::{CommentRepository, PostRepository};

use super::missing;

/// Comment use cases.
#[derive(Clone)]
pub struct CommentService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(posts: Arc<dyn PostRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { posts, comments }
    }

    async fn post(&self, post_id: PostId) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    /// A post and its comments, newest first.
    pub async fn for_post(&self, post_id: PostId) -> Result<(Post, Vec<Comment>), DomainError> {
        let post = self.post(post_id).await?;
        let comments = self.comments.find_by_post(post_id).await?;
        Ok((post, comments))
    }

    pub async fn get(&self, id: CommentId) -> Result<Comment, DomainError> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", id))
    }

    /// Gate and parent lookup for the comment form.
    pub async fn authorize_create(
        &self,
        actor: &Actor,
        post_id: PostId,
    ) -> Result<Post, DomainError> {
        actor.authorize(Capability::CreateComment)?;
        self.post(post_id).await
    }

    /// Attach a comment to `post_id`. The post comes from the URL and the
    /// author from the actor, never from the submitted form.
    pub async fn create(
        &self,
        actor: &Actor,
        post_id: PostId,
        form: CommentForm,
    ) -> Result<Comment, DomainError> {
        let author = actor.authorize(Capability::CreateComment)?;
        self.post(post_id).await?;
        let form = form.clean()?;

        let comment = self
            .comments
            .create(NewComment::new(post_id, author.id, form.text))
            .await?;

        tracing::info!(
            comment_id = comment.id,
            post_id,
            author = %author.username,
            "Comment created"
        );
        Ok(comment)
    }

    pub async fn edit(&self, actor: &Actor, id: CommentId) -> Result<Comment, DomainError> {
        actor.authorize(Capability::ChangeComment)?;
        self.get(id).await
    }

    /// Change the text. Post, author and creation date never change.
    pub async fn update(
        &self,
        actor: &Actor,
        id: CommentId,
        form: CommentForm,
    ) -> Result<Comment, DomainError> {
        let editor = actor.authorize(Capability::ChangeComment)?;
        let mut comment = self.get(id).await?;
        let form = form.clean()?;

        comment.revise(form.text);
        let comment = self
            .comments
            .save(comment)
            .await
            .map_err(missing("comment", id))?;

        tracing::info!(comment_id = id, editor = %editor.username, "Comment updated");
        Ok(comment)
    }

    pub async fn confirm_delete(
        &self,
        actor: &Actor,
        id: CommentId,
    ) -> Result<Comment, DomainError> {
        actor.authorize(Capability::DeleteComment)?;
        self.get(id).await
    }

    pub async fn delete(&self, actor: &Actor, id: CommentId) -> Result<Comment, DomainError> {
        let user = actor.authorize(Capability::DeleteComment)?;
        let comment = self.get(id).await?;

        self.comments
            .delete(id)
            .await
            .map_err(missing("comment", id))?;

        tracing::info!(comment_id = id, user = %user.username, "Comment deleted");
        Ok(comment)
    }
}
