use std::sync::Arc;

use crate::access::{Actor, Capability};
use crate::domain::{Comment, NewPost, Post, PostId};
use crate::error::DomainError;
use crate::forms::PostForm;
use crate::pagination::{POSTS_PER_PAGE, Page, PageRequest};
use crate::ports::{CommentRepository, MarkdownRenderer, PostRepository};

use super::missing;

/// A post ready for its detail page.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    pub html: String,
    pub comments: Vec<Comment>,
}

/// Post use cases.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    markdown: Arc<dyn MarkdownRenderer>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        markdown: Arc<dyn MarkdownRenderer>,
    ) -> Self {
        Self {
            posts,
            comments,
            markdown,
        }
    }

    /// One page of posts, newest first. Page 1 always exists, even when
    /// there are no posts; any other page past the end is not found.
    pub async fn list(&self, page: u64) -> Result<Page<Post>, DomainError> {
        let request = PageRequest::new(page, POSTS_PER_PAGE);
        if page == 0 || !request.is_addressable() {
            return Err(DomainError::not_found("page", page));
        }

        let result = self.posts.list(request).await?;

        if page > result.num_pages() {
            return Err(DomainError::not_found("page", page));
        }
        Ok(result)
    }

    pub async fn get(&self, id: PostId) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id))
    }

    /// The post, its rendered body and its comments.
    pub async fn detail(&self, id: PostId) -> Result<PostDetail, DomainError> {
        let post = self.get(id).await?;
        let comments = self.comments.find_by_post(id).await?;
        let html = self.markdown.render(&post.text);
        Ok(PostDetail {
            post,
            html,
            comments,
        })
    }

    /// Gate for the create form.
    pub fn authorize_create(&self, actor: &Actor) -> Result<(), DomainError> {
        actor.authorize(Capability::CreatePost).map(|_| ())
    }

    pub async fn create(&self, actor: &Actor, form: PostForm) -> Result<Post, DomainError> {
        let author = actor.authorize(Capability::CreatePost)?;
        let form = form.clean()?;

        let post = self
            .posts
            .create(NewPost::new(author.id, form.title, form.text))
            .await?;

        tracing::info!(post_id = post.id, author = %author.username, "Post created");
        Ok(post)
    }

    /// Gate and load for the update form.
    pub async fn edit(&self, actor: &Actor, id: PostId) -> Result<Post, DomainError> {
        actor.authorize(Capability::ChangePost)?;
        self.get(id).await
    }

    /// Change title and text. Author and creation date never change.
    pub async fn update(
        &self,
        actor: &Actor,
        id: PostId,
        form: PostForm,
    ) -> Result<Post, DomainError> {
        let editor = actor.authorize(Capability::ChangePost)?;
        let mut post = self.get(id).await?;
        let form = form.clean()?;

        post.revise(form.title, form.text);
        let post = self.posts.save(post).await.map_err(missing("post", id))?;

        tracing::info!(post_id = post.id, editor = %editor.username, "Post updated");
        Ok(post)
    }

    /// Gate and load for the delete confirmation.
    pub async fn confirm_delete(&self, actor: &Actor, id: PostId) -> Result<Post, DomainError> {
        actor.authorize(Capability::DeletePost)?;
        self.get(id).await
    }

    /// Delete a post and, through the store, all of its comments.
    pub async fn delete(&self, actor: &Actor, id: PostId) -> Result<Post, DomainError> {
        let user = actor.authorize(Capability::DeletePost)?;
        let post = self.get(id).await?;

        self.posts.delete(id).await.map_err(missing("post", id))?;

        tracing::info!(post_id = id, user = %user.username, "Post deleted");
        Ok(post)
    }
}
