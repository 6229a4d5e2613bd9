//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use newsletter_core::domain::{Comment, NewComment, NewPost, Post, PostId, User};
use newsletter_core::error::RepoError;
use newsletter_core::pagination::{Page, PageRequest};
use newsletter_core::ports::{CommentRepository, PostRepository, UserRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, repo_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, RepoError> {
        let active_model: user::ActiveModel = user.into();
        let model = active_model.insert(&self.db).await.map_err(repo_error)?;
        Ok(model.into())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, draft: NewPost) -> Result<Post, RepoError> {
        let active_model: post::ActiveModel = draft.into();
        let model = active_model.insert(&self.db).await.map_err(repo_error)?;
        Ok(model.into())
    }

    async fn list(&self, request: PageRequest) -> Result<Page<Post>, RepoError> {
        let paginator = PostEntity::find()
            .order_by_desc(post::Column::Created)
            .order_by_desc(post::Column::Id)
            .paginate(&self.db, request.per_page);

        let total_items = paginator.num_items().await.map_err(repo_error)?;
        let models = paginator
            .fetch_page(request.page.saturating_sub(1))
            .await
            .map_err(repo_error)?;

        Ok(Page {
            items: models.into_iter().map(Into::into).collect(),
            page: request.page,
            per_page: request.per_page,
            total_items,
        })
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, draft: NewComment) -> Result<Comment, RepoError> {
        let active_model: comment::ActiveModel = draft.into();
        let model = active_model.insert(&self.db).await.map_err(repo_error)?;
        Ok(model.into())
    }

    async fn find_by_post(&self, post_id: PostId) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_desc(comment::Column::Created)
            .order_by_desc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        CommentEntity::find()
            .count(&self.db)
            .await
            .map_err(repo_error)
    }
}
