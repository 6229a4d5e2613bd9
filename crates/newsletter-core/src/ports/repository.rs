use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, CommentId, NewComment, NewPost, Post, PostId, User};
use crate::error::RepoError;
use crate::pagination::{Page, PageRequest};

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity that already has an ID.
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Insert a new user. A taken username is a constraint violation.
    async fn create(&self, user: User) -> Result<User, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository. Deleting a post deletes its comments.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, PostId> {
    /// Insert a new post; the store assigns the id.
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Posts newest first.
    async fn list(&self, request: PageRequest) -> Result<Page<Post>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, CommentId> {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError>;

    /// Comments of one post, newest first.
    async fn find_by_post(&self, post_id: PostId) -> Result<Vec<Comment>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;
}
