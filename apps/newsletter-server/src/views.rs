//! View models and askama templates for the HTML pages.
//!
//! Every URL a template prints is computed here from [`Route`], so the
//! templates never build paths themselves.

use std::collections::HashMap;

use actix_web::{HttpResponse, http::StatusCode, http::header};
use askama::Template;
use uuid::Uuid;

use newsletter_core::access::{Actor, Capability};
use newsletter_core::domain::{Comment, Post};
use newsletter_core::ports::UserRepository;
use newsletter_core::{FieldErrors, Route};

use crate::middleware::error::PageResult;
use crate::middleware::session::Session;
use crate::state::AppState;

const TIMESTAMP_FORMAT: &str = "%B %-d, %Y %H:%M";

/// Layout data shared by every page.
#[derive(Clone)]
pub struct Chrome {
    pub flash: Option<String>,
    pub username: Option<String>,
    pub home_href: String,
    pub create_href: String,
    pub login_href: String,
    pub logout_href: String,
    pub can_add_post: bool,
    pub can_change_post: bool,
    pub can_delete_post: bool,
    pub can_add_comment: bool,
    pub can_change_comment: bool,
    pub can_delete_comment: bool,
}

impl Chrome {
    /// Build the layout for `actor`, consuming any pending flash message.
    pub async fn load(state: &AppState, actor: &Actor, session: &Session) -> Self {
        Self {
            flash: session.take_flash().await,
            username: actor.user().map(|u| u.username.clone()),
            home_href: Route::PostList.path(),
            create_href: Route::PostCreate.path(),
            login_href: state.site.login_url.clone(),
            logout_href: Route::Logout.path(),
            can_add_post: actor.has(Capability::CreatePost),
            can_change_post: actor.has(Capability::ChangePost),
            can_delete_post: actor.has(Capability::DeletePost),
            can_add_comment: actor.has(Capability::CreateComment),
            can_change_comment: actor.has(Capability::ChangeComment),
            can_delete_comment: actor.has(Capability::DeleteComment),
        }
    }
}

/// Usernames by user id, for the "by ..." lines.
pub struct AuthorNames(HashMap<Uuid, String>);

impl AuthorNames {
    pub async fn resolve(users: &dyn UserRepository, ids: impl IntoIterator<Item = Uuid>) -> Self {
        let mut names = HashMap::new();
        for id in ids {
            if names.contains_key(&id) {
                continue;
            }
            match users.find_by_id(id).await {
                Ok(Some(user)) => {
                    names.insert(id, user.username);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(user_id = %id, error = %e, "Author lookup failed"),
            }
        }
        Self(names)
    }

    fn name(&self, id: &Uuid) -> String {
        self.0
            .get(id)
            .cloned()
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[derive(Clone)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub created: String,
    pub modified: String,
    pub detail_href: String,
    pub update_href: String,
    pub delete_href: String,
    pub comments_href: String,
    pub comment_create_href: String,
}

impl PostRow {
    pub fn new(post: &Post, names: &AuthorNames) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            author: names.name(&post.author_id),
            created: post.created.format(TIMESTAMP_FORMAT).to_string(),
            modified: post.modified.format(TIMESTAMP_FORMAT).to_string(),
            detail_href: Route::PostDetail(post.id).path(),
            update_href: Route::PostUpdate(post.id).path(),
            delete_href: Route::PostDelete(post.id).path(),
            comments_href: Route::PostComments(post.id).path(),
            comment_create_href: Route::CommentCreate(post.id).path(),
        }
    }
}

#[derive(Clone)]
pub struct CommentRow {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub created: String,
    pub post_href: String,
    pub detail_href: String,
    pub update_href: String,
    pub delete_href: String,
}

impl CommentRow {
    pub fn new(comment: &Comment, names: &AuthorNames) -> Self {
        Self {
            id: comment.id,
            author: names.name(&comment.author_id),
            text: comment.text.clone(),
            created: comment.created.format(TIMESTAMP_FORMAT).to_string(),
            post_href: Route::PostDetail(comment.post_id).path(),
            detail_href: Route::CommentDetail(comment.id).path(),
            update_href: Route::CommentUpdate(comment.id).path(),
            delete_href: Route::CommentDelete(comment.id).path(),
        }
    }

    pub fn many(comments: &[Comment], names: &AuthorNames) -> Vec<Self> {
        comments.iter().map(|c| Self::new(c, names)).collect()
    }
}

/// Messages for one form field, empty when it is fine.
pub fn field_errors(errors: &FieldErrors, field: &str) -> Vec<String> {
    errors.get(field).to_vec()
}

#[derive(Template)]
#[template(path = "post_list.html")]
pub struct PostListTemplate {
    pub chrome: Chrome,
    pub posts: Vec<PostRow>,
    pub is_empty: bool,
    pub page: u64,
    pub num_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_href: String,
    pub next_href: String,
}

#[derive(Template)]
#[template(path = "post_detail.html")]
pub struct PostDetailTemplate {
    pub chrome: Chrome,
    pub post: PostRow,
    pub html: String,
    pub comments: Vec<CommentRow>,
    pub comment_text: String,
    pub comment_errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "post_form.html")]
pub struct PostFormTemplate {
    pub chrome: Chrome,
    pub heading: String,
    pub action: String,
    pub cancel_href: String,
    pub title: String,
    pub text: String,
    pub title_errors: Vec<String>,
    pub text_errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub chrome: Chrome,
    pub heading: String,
    pub subject: String,
    pub action: String,
    pub cancel_href: String,
}

#[derive(Template)]
#[template(path = "comment_list.html")]
pub struct CommentListTemplate {
    pub chrome: Chrome,
    pub post: PostRow,
    pub comments: Vec<CommentRow>,
}

#[derive(Template)]
#[template(path = "comment_detail.html")]
pub struct CommentDetailTemplate {
    pub chrome: Chrome,
    pub comment: CommentRow,
}

#[derive(Template)]
#[template(path = "comment_form.html")]
pub struct CommentFormTemplate {
    pub chrome: Chrome,
    pub heading: String,
    pub action: String,
    pub cancel_href: String,
    pub text: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub chrome: Chrome,
    pub action: String,
    pub next: String,
    pub username: String,
    pub error: Option<String>,
}

/// Standalone error page; it has no layout so it renders without a session.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub title: &'static str,
    pub message: String,
}

/// Render `template` with `status`, attaching a freshly minted session cookie.
pub fn render<T: Template>(
    template: &T,
    status: StatusCode,
    session: &Session,
) -> PageResult<HttpResponse> {
    let body = template.render()?;
    let mut response = HttpResponse::build(status);
    response.content_type("text/html; charset=utf-8");
    if let Some(cookie) = session.cookie() {
        response.cookie(cookie);
    }
    Ok(response.body(body))
}

/// 302 to `location`, attaching a freshly minted session cookie.
pub fn redirect(location: &str, session: &Session) -> HttpResponse {
    let mut response = HttpResponse::Found();
    response.insert_header((header::LOCATION, location));
    if let Some(cookie) = session.cookie() {
        response.cookie(cookie);
    }
    response.finish()
}
