//! In-memory store - used when no database is configured, and in tests.
//!
//! One lock guards every table so a post delete and its comment cascade
//! happen atomically.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use newsletter_core::domain::{Comment, CommentId, NewComment, NewPost, Post, PostId, User};
use newsletter_core::error::RepoError;
use newsletter_core::pagination::{Page, PageRequest};
use newsletter_core::ports::{BaseRepository, CommentRepository, PostRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    posts: BTreeMap<PostId, Post>,
    comments: BTreeMap<CommentId, Comment>,
    last_post_id: PostId,
    last_comment_id: CommentId,
}

/// Users, posts and comments held in process memory.
#[derive(Default)]
pub struct InMemoryDatabase {
    tables: RwLock<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryDatabase {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .users
            .values()
            .any(|u| u.username == user.username && u.id != user.id);
        if taken {
            return Err(RepoError::Constraint(format!(
                "username {} already exists",
                user.username
            )));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.users.remove(&id).ok_or(RepoError::NotFound)?;

        let authored: Vec<PostId> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in authored {
            tables.posts.remove(&post_id);
        }
        let Tables {
            posts, comments, ..
        } = &mut *tables;
        comments.retain(|_, c| c.author_id != id && posts.contains_key(&c.post_id));
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryDatabase {
    async fn create(&self, user: User) -> Result<User, RepoError> {
        if self.tables.read().await.users.contains_key(&user.id) {
            return Err(RepoError::Constraint(format!("user {} already exists", user.id)));
        }
        BaseRepository::<User, Uuid>::save(self, user).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Post, PostId> for InMemoryDatabase {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let slot = tables.posts.get_mut(&post.id).ok_or(RepoError::NotFound)?;
        *slot = post.clone();
        Ok(post)
    }

    /// Removes the post and every comment attached to it.
    async fn delete(&self, id: PostId) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.posts.remove(&id).ok_or(RepoError::NotFound)?;

        let before = tables.comments.len();
        tables.comments.retain(|_, c| c.post_id != id);
        tracing::debug!(
            post_id = id,
            cascaded = before - tables.comments.len(),
            "Deleted post and its comments"
        );
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryDatabase {
    async fn create(&self, draft: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        tables.last_post_id += 1;
        let post = draft.into_post(tables.last_post_id);
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn list(&self, request: PageRequest) -> Result<Page<Post>, RepoError> {
        let tables = self.tables.read().await;

        let mut posts: Vec<&Post> = tables.posts.values().collect();
        posts.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));

        let items = posts
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.per_page as usize)
            .cloned()
            .collect();

        Ok(Page {
            items,
            page: request.page,
            per_page: request.per_page,
            total_items: tables.posts.len() as u64,
        })
    }
}

#[async_trait]
impl BaseRepository<Comment, CommentId> for InMemoryDatabase {
    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn save(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .comments
            .get_mut(&comment.id)
            .ok_or(RepoError::NotFound)?;
        *slot = comment.clone();
        Ok(comment)
    }

    async fn delete(&self, id: CommentId) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.comments.remove(&id).ok_or(RepoError::NotFound)?;
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryDatabase {
    async fn create(&self, draft: NewComment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&draft.post_id) {
            return Err(RepoError::Constraint(format!(
                "post {} does not exist",
                draft.post_id
            )));
        }
        tables.last_comment_id += 1;
        let comment = draft.into_comment(tables.last_comment_id);
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_by_post(&self, post_id: PostId) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        Ok(comments)
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.tables.read().await.comments.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsletter_core::access::CapabilitySet;

    async fn seed_post(db: &InMemoryDatabase, author_id: Uuid, title: &str) -> Post {
        PostRepository::create(
            db,
            NewPost::new(author_id, title.to_string(), String::new()),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_delete_post_cascades_to_its_comments_only() {
        let db = InMemoryDatabase::new();
        let author = Uuid::new_v4();
        let doomed = seed_post(&db, author, "doomed").await;
        let kept = seed_post(&db, author, "kept").await;

        for text in ["a", "b"] {
            CommentRepository::create(&db, NewComment::new(doomed.id, author, text.into()))
                .await
                .unwrap();
        }
        CommentRepository::create(&db, NewComment::new(kept.id, author, "c".into()))
            .await
            .unwrap();

        BaseRepository::<Post, PostId>::delete(&db, doomed.id)
            .await
            .unwrap();

        assert!(db.find_by_post(doomed.id).await.unwrap().is_empty());
        assert_eq!(db.find_by_post(kept.id).await.unwrap().len(), 1);
        assert_eq!(db.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_paged() {
        let db = InMemoryDatabase::new();
        let author = Uuid::new_v4();
        for i in 0..12 {
            seed_post(&db, author, &format!("post {i}")).await;
        }

        let first = db.list(PageRequest::new(1, 10)).await.unwrap();
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total_items, 12);
        assert_eq!(first.items[0].title, "post 11");
        assert!(
            first
                .items
                .windows(2)
                .all(|w| (w[0].created, w[0].id) > (w[1].created, w[1].id))
        );

        let second = db.list(PageRequest::new(2, 10)).await.unwrap();
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.items[1].title, "post 0");
    }

    #[tokio::test]
    async fn test_comment_on_missing_post_is_rejected() {
        let db = InMemoryDatabase::new();
        let result =
            CommentRepository::create(&db, NewComment::new(7, Uuid::new_v4(), "x".into())).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_duplicate_username_is_a_constraint() {
        let db = InMemoryDatabase::new();
        let first = User::new("toto".into(), "h".into(), CapabilitySet::empty());
        let second = User::new("toto".into(), "h".into(), CapabilitySet::empty());

        BaseRepository::<User, Uuid>::save(&db, first).await.unwrap();
        let result = BaseRepository::<User, Uuid>::save(&db, second).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_save_missing_post_is_not_found() {
        let db = InMemoryDatabase::new();
        let post = NewPost::new(Uuid::new_v4(), "t".into(), String::new()).into_post(9);
        let result = BaseRepository::<Post, PostId>::save(&db, post).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }
}
