//! The routing table and redirect targets.
//!
//! Posts and comments are addressed by numeric id only. [`Route::path`] is
//! the one place URLs are built; handlers never format paths by hand.

use std::fmt;

use crate::domain::{CommentId, PostId};

/// Every named page of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    PostList,
    PostCreate,
    PostDetail(PostId),
    PostUpdate(PostId),
    PostDelete(PostId),
    PostComments(PostId),
    CommentCreate(PostId),
    CommentDetail(CommentId),
    CommentUpdate(CommentId),
    CommentDelete(CommentId),
    Login,
    Logout,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::PostList => "/".to_string(),
            Route::PostCreate => "/create".to_string(),
            Route::PostDetail(id) => format!("/{id}"),
            Route::PostUpdate(id) => format!("/{id}/update"),
            Route::PostDelete(id) => format!("/{id}/delete"),
            Route::PostComments(id) => format!("/{id}/comments"),
            Route::CommentCreate(id) => format!("/{id}/comments/create"),
            Route::CommentDetail(id) => format!("/comments/{id}"),
            Route::CommentUpdate(id) => format!("/comments/{id}/update"),
            Route::CommentDelete(id) => format!("/comments/{id}/delete"),
            Route::Login => "/accounts/login".to_string(),
            Route::Logout => "/accounts/logout".to_string(),
        }
    }

    /// List page `page`; the first page has no query string.
    pub fn post_list_page(page: u64) -> String {
        if page <= 1 {
            Route::PostList.path()
        } else {
            format!("/?page={page}")
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Where a comment update or delete sends the client back to.
///
/// Comments are addressed by their own id, so the only record of which post
/// the client came from is the session's current-post marker.
pub fn return_to(current_post: Option<PostId>) -> Route {
    match current_post {
        Some(post_id) => Route::PostDetail(post_id),
        None => Route::PostList,
    }
}
