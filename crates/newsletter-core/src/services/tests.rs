use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::access::{Actor, AuthenticatedUser, Capability, CapabilitySet};
use crate::domain::{Comment, CommentId, NewComment, NewPost, Post, PostId};
use crate::error::{DomainError, RepoError};
use crate::forms::{CommentForm, PostForm};
use crate::pagination::{Page, PageRequest};
use crate::ports::{BaseRepository, CommentRepository, MarkdownRenderer, PostRepository};

use super::{CommentService, PostService};

#[derive(Default)]
struct Store {
    posts: Mutex<Vec<Post>>,
    comments: Mutex<Vec<Comment>>,
}

#[async_trait]
impl BaseRepository<Post, PostId> for Store {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.lock().unwrap();
        let slot = posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepoError::NotFound)?;
        *slot = post.clone();
        Ok(post)
    }

    async fn delete(&self, id: PostId) -> Result<(), RepoError> {
        self.posts.lock().unwrap().retain(|p| p.id != id);
        self.comments.lock().unwrap().retain(|c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for Store {
    async fn create(&self, draft: NewPost) -> Result<Post, RepoError> {
        let mut posts = self.posts.lock().unwrap();
        let post = draft.into_post(posts.len() as PostId + 1);
        posts.push(post.clone());
        Ok(post)
    }

    async fn list(&self, request: PageRequest) -> Result<Page<Post>, RepoError> {
        let posts = self.posts.lock().unwrap();
        let mut items: Vec<Post> = posts.iter().rev().cloned().collect();
        let total_items = items.len() as u64;
        items = items
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.per_page as usize)
            .collect();
        Ok(Page {
            items,
            page: request.page,
            per_page: request.per_page,
            total_items,
        })
    }
}

#[async_trait]
impl BaseRepository<Comment, CommentId> for Store {
    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, RepoError> {
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn save(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut comments = self.comments.lock().unwrap();
        let slot = comments
            .iter_mut()
            .find(|c| c.id == comment.id)
            .ok_or(RepoError::NotFound)?;
        *slot = comment.clone();
        Ok(comment)
    }

    async fn delete(&self, id: CommentId) -> Result<(), RepoError> {
        self.comments.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for Store {
    async fn create(&self, draft: NewComment) -> Result<Comment, RepoError> {
        let mut comments = self.comments.lock().unwrap();
        let comment = draft.into_comment(comments.len() as CommentId + 1);
        comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_by_post(&self, post_id: PostId) -> Result<Vec<Comment>, RepoError> {
        let comments = self.comments.lock().unwrap();
        Ok(comments
            .iter()
            .rev()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.comments.lock().unwrap().len() as u64)
    }
}

struct Upper;

impl MarkdownRenderer for Upper {
    fn render(&self, markdown: &str) -> String {
        markdown.to_uppercase()
    }
}

fn services() -> (PostService, CommentService) {
    let store = Arc::new(Store::default());
    (
        PostService::new(store.clone(), store.clone(), Arc::new(Upper)),
        CommentService::new(store.clone(), store),
    )
}

fn actor(capabilities: &[Capability]) -> Actor {
    Actor::User(AuthenticatedUser {
        id: Uuid::new_v4(),
        username: "tester".to_string(),
        capabilities: capabilities.iter().copied().collect::<CapabilitySet>(),
    })
}

fn admin() -> Actor {
    actor(&Capability::ALL)
}

#[tokio::test]
async fn test_create_forces_author() {
    let (posts, _) = services();
    let author = admin();

    let post = posts
        .create(&author, PostForm::new("  Title  ", "body"))
        .await
        .unwrap();

    assert_eq!(post.title, "Title");
    assert_eq!(Some(post.author_id), author.user().map(|u| u.id));
}

#[tokio::test]
async fn test_gate_runs_before_lookup() {
    let (posts, comments) = services();

    let err = posts
        .update(&Actor::Anonymous, 99, PostForm::new("x", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthenticated));

    let err = comments
        .delete(&actor(&[Capability::ChangeComment]), 99)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Forbidden(Capability::DeleteComment)
    ));
}

#[tokio::test]
async fn test_lookup_runs_before_validation() {
    let (posts, _) = services();

    let err = posts
        .update(&admin(), 99, PostForm::new("", ""))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::NotFound { entity_type: "post", .. }));
}

#[tokio::test]
async fn test_list_page_bounds() {
    let (posts, _) = services();

    let first = posts.list(1).await.unwrap();
    assert!(first.is_empty());
    assert!(posts.list(0).await.is_err());
    assert!(posts.list(2).await.is_err());
    assert!(matches!(
        posts.list(u64::MAX).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_detail_renders_markdown_with_comments() {
    let (posts, comments) = services();
    let author = admin();
    let post = posts
        .create(&author, PostForm::new("T", "hello"))
        .await
        .unwrap();
    comments
        .create(&author, post.id, CommentForm::new("first"))
        .await
        .unwrap();
    comments
        .create(&author, post.id, CommentForm::new("second"))
        .await
        .unwrap();

    let detail = posts.detail(post.id).await.unwrap();

    assert_eq!(detail.html, "HELLO");
    let texts: Vec<_> = detail.comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["second", "first"]);
}

#[tokio::test]
async fn test_comment_on_missing_post_is_not_found() {
    let (_, comments) = services();

    let err = comments
        .create(&admin(), 5, CommentForm::new("orphan"))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::NotFound { entity_type: "post", .. }));
}

#[tokio::test]
async fn test_comment_update_only_touches_text() {
    let (posts, comments) = services();
    let author = admin();
    let post = posts.create(&author, PostForm::new("T", "")).await.unwrap();
    let original = comments
        .create(&author, post.id, CommentForm::new("Hello World"))
        .await
        .unwrap();

    let updated = comments
        .update(
            &actor(&[Capability::ChangeComment]),
            original.id,
            CommentForm::new("hello world 2"),
        )
        .await
        .unwrap();

    assert_eq!(updated.text, "hello world 2");
    assert_eq!(updated.post_id, original.post_id);
    assert_eq!(updated.author_id, original.author_id);
    assert_eq!(updated.created, original.created);
}

#[tokio::test]
async fn test_delete_post_returns_it() {
    let (posts, comments) = services();
    let author = admin();
    let post = posts.create(&author, PostForm::new("Gone", "")).await.unwrap();
    let comment = comments
        .create(&author, post.id, CommentForm::new("c"))
        .await
        .unwrap();

    let deleted = posts.delete(&author, post.id).await.unwrap();

    assert_eq!(deleted.title, "Gone");
    assert!(posts.get(post.id).await.is_err());
    assert!(comments.get(comment.id).await.is_err());
}
