//! Post pages: list, detail (with comment submission), create, update, delete.

use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};
use serde::Deserialize;

use newsletter_core::access::Actor;
use newsletter_core::domain::PostId;
use newsletter_core::forms::{CommentForm, PostForm};
use newsletter_core::services::PostDetail;
use newsletter_core::{DomainError, FieldErrors, Route};

use crate::middleware::auth::CurrentActor;
use crate::middleware::error::{PageError, PageResult, reject};
use crate::middleware::session::Session;
use crate::state::AppState;
use crate::views::{
    AuthorNames, Chrome, CommentRow, ConfirmDeleteTemplate, PostDetailTemplate,
    PostFormTemplate, PostListTemplate, PostRow, field_errors, redirect, render,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    page: Option<String>,
}

/// `?page=` as a number; `last` is accepted as the final page.
enum PageParam {
    Number(u64),
    Last,
}

fn page_param(raw: Option<&str>) -> Option<PageParam> {
    match raw.map(str::trim) {
        None | Some("") => Some(PageParam::Number(1)),
        Some("last") => Some(PageParam::Last),
        Some(n) => n.parse().ok().map(PageParam::Number),
    }
}

/// GET / - newest posts first, ten per page.
pub async fn list(
    req: HttpRequest,
    state: web::Data<AppState>,
    CurrentActor(actor): CurrentActor,
    session: Session,
    query: web::Query<ListQuery>,
) -> PageResult<HttpResponse> {
    let page = match page_param(query.page.as_deref()).ok_or(PageError::NotFound)? {
        PageParam::Number(n) => n,
        PageParam::Last => state
            .posts
            .list(1)
            .await
            .map_err(reject(&req, &state.site))?
            .num_pages(),
    };

    let result = state
        .posts
        .list(page)
        .await
        .map_err(reject(&req, &state.site))?;

    let names = AuthorNames::resolve(
        state.users.as_ref(),
        result.items.iter().map(|p| p.author_id),
    )
    .await;

    let template = PostListTemplate {
        chrome: Chrome::load(&state, &actor, &session).await,
        posts: result.items.iter().map(|p| PostRow::new(p, &names)).collect(),
        is_empty: result.is_empty(),
        page: result.page,
        num_pages: result.num_pages(),
        has_previous: result.has_previous(),
        has_next: result.has_next(),
        previous_href: Route::post_list_page(result.page.saturating_sub(1)),
        next_href: Route::post_list_page(result.page + 1),
    };
    render(&template, StatusCode::OK, &session)
}

async fn render_detail(
    state: &AppState,
    actor: &Actor,
    session: &Session,
    detail: PostDetail,
    comment: CommentForm,
    errors: FieldErrors,
    status: StatusCode,
) -> PageResult<HttpResponse> {
    let names = AuthorNames::resolve(
        state.users.as_ref(),
        std::iter::once(detail.post.author_id).chain(detail.comments.iter().map(|c| c.author_id)),
    )
    .await;

    let template = PostDetailTemplate {
        chrome: Chrome::load(state, actor, session).await,
        post: PostRow::new(&detail.post, &names),
        html: detail.html,
        comments: CommentRow::many(&detail.comments, &names),
        comment_text: comment.text,
        comment_errors: field_errors(&errors, "text"),
    };
    render(&template, status, session)
}

/// GET /{id} - the post, its comments and a comment form. Remembers the
/// post in the session so comment edits can return here.
pub async fn detail(
    req: HttpRequest,
    state: web::Data<AppState>,
    CurrentActor(actor): CurrentActor,
    mut session: Session,
    path: web::Path<PostId>,
) -> PageResult<HttpResponse> {
    let id = path.into_inner();
    let detail = state
        .posts
        .detail(id)
        .await
        .map_err(reject(&req, &state.site))?;
    session.set_current_post(id).await?;

    render_detail(
        &state,
        &actor,
        &session,
        detail,
        CommentForm::default(),
        FieldErrors::new(),
        StatusCode::OK,
    )
    .await
}

/// POST /{id} - submit a comment from the detail page.
pub async fn comment(
    req: HttpRequest,
    state: web::Data<AppState>,
    CurrentActor(actor): CurrentActor,
    mut session: Session,
    path: web::Path<PostId>,
    form: web::Form<CommentForm>,
) -> PageResult<HttpResponse> {
    let id = path.into_inner();
    let form = form.into_inner();

    match state.comments.create(&actor, id, form.clone()).await {
        Ok(_) => {
            session.set_current_post(id).await?;
            session.flash("Comment successfully added").await;
            Ok(redirect(&Route::PostDetail(id).path(), &session))
        }
        Err(DomainError::Validation(errors)) => {
            let detail = state
                .posts
                .detail(id)
                .await
                .map_err(reject(&req, &state.site))?;
            session.set_current_post(id).await?;
            render_detail(
                &state,
                &actor,
                &session,
                detail,
                form,
                errors,
                StatusCode::UNPROCESSABLE_ENTITY,
            )
            .await
        }
        Err(e) => Err(reject(&req, &state.site)(e)),
    }
}

fn post_form(
    chrome: Chrome,
    heading: String,
    action: Route,
    cancel: Route,
    form: PostForm,
    errors: &FieldErrors,
) -> PostFormTemplate {
    PostFormTemplate {
        chrome,
        heading,
        action: action.path(),
        cancel_href: cancel.path(),
        title: form.title,
        text: form.text,
        title_errors: field_errors(errors, "title"),
        text_errors: field_errors(errors, "text"),
    }
}

/// GET /create
pub async fn create_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    CurrentActor(actor): CurrentActor,
    session: Session,
) -> PageResult<HttpResponse> {
    state
        .posts
        .authorize_create(&actor)
        .map_err(reject(&req, &state.site))?;

    let template = post_form(
        Chrome::load(&state, &actor, &session).await,
        "New post".to_string(),
        Route::PostCreate,
        Route::PostList,
        PostForm::default(),
        &FieldErrors::new(),
    );
    render(&template, StatusCode::OK, &session)
}

/// POST /create
pub async fn create(
    req: HttpRequest,
    state: web::Data<AppState>,
    CurrentActor(actor): CurrentActor,
    session: Session,
    form: web::Form<PostForm>,
) -> PageResult<HttpResponse> {
    let form = form.into_inner();

    match state.posts.create(&actor, form.clone()).await {
        Ok(post) => {
            session
                .flash(format!("Post '{}' added successfully", post.title))
                .await;
            Ok(redirect(&Route::PostDetail(post.id).path(), &session))
        }
        Err(DomainError::Validation(errors)) => {
            let template = post_form(
                Chrome::load(&state, &actor, &session).await,
                "New post".to_string(),
                Route::PostCreate,
                Route::PostList,
                form,
                &errors,
            );
            render(&template, StatusCode::UNPROCESSABLE_ENTITY, &session)
        }
        Err(e) => Err(reject(&req, &state.site)(e)),
    }
}

/// GET /{id}/update
pub async fn update_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    CurrentActor(actor): CurrentActor,
    session: Session,
    path: web::Path<PostId>,
) -> PageResult<HttpResponse> {
    let id = path.into_inner();
    let post = state
        .posts
        .edit(&actor, id)
        .await
        .map_err(reject(&req, &state.site))?;

    let template = post_form(
        Chrome::load(&state, &actor, &session).await,
        format!("Edit '{}'", post.title),
        Route::PostUpdate(id),
        Route::PostDetail(id),
        PostForm::new(post.title, post.text),
        &FieldErrors::new(),
    );
    render(&template, StatusCode::OK, &session)
}

/// POST /{id}/update
pub async fn update(
    req: HttpRequest,
    state: web::Data<AppState>,
    CurrentActor(actor): CurrentActor,
    session: Session,
    path: web::Path<PostId>,
    form: web::Form<PostForm>,
) -> PageResult<HttpResponse> {
    let id = path.into_inner();
    let form = form.into_inner();

    match state.posts.update(&actor, id, form.clone()).await {
        Ok(post) => {
            session
                .flash(format!("Post '{}' updated successfully", post.title))
                .await;
            Ok(redirect(&Route::PostDetail(post.id).path(), &session))
        }
        Err(DomainError::Validation(errors)) => {
            let template = post_form(
                Chrome::load(&state, &actor, &session).await,
                "Edit post".to_string(),
                Route::PostUpdate(id),
                Route::PostDetail(id),
                form,
                &errors,
            );
            render(&template, StatusCode::UNPROCESSABLE_ENTITY, &session)
        }
        Err(e) => Err(reject(&req, &state.site)(e)),
    }
}

/// GET /{id}/delete
pub async fn delete_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    CurrentActor(actor): CurrentActor,
    session: Session,
    path: web::Path<PostId>,
) -> PageResult<HttpResponse> {
    let id = path.into_inner();
    let post = state
        .posts
        .confirm_delete(&actor, id)
        .await
        .map_err(reject(&req, &state.site))?;

    let template = ConfirmDeleteTemplate {
        chrome: Chrome::load(&state, &actor, &session).await,
        heading: "Delete post".to_string(),
        subject: format!("the post '{}' and all of its comments", post.title),
        action: Route::PostDelete(id).path(),
        cancel_href: Route::PostDetail(id).path(),
    };
    render(&template, StatusCode::OK, &session)
}

/// POST /{id}/delete
pub async fn delete(
    req: HttpRequest,
    state: web::Data<AppState>,
    CurrentActor(actor): CurrentActor,
    session: Session,
    path: web::Path<PostId>,
) -> PageResult<HttpResponse> {
    let post = state
        .posts
        .delete(&actor, path.into_inner())
        .await
        .map_err(reject(&req, &state.site))?;

    session
        .flash(format!("Post '{}' deleted successfully", post.title))
        .await;
    Ok(redirect(&Route::PostList.path(), &session))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(raw: Option<&str>) -> Option<u64> {
        match page_param(raw) {
            Some(PageParam::Number(n)) => Some(n),
            _ => None,
        }
    }

    #[test]
    fn test_page_param_defaults_to_first_page() {
        assert_eq!(number(None), Some(1));
        assert_eq!(number(Some("")), Some(1));
        assert_eq!(number(Some("3")), Some(3));
    }

    #[test]
    fn test_page_param_rejects_garbage() {
        assert!(page_param(Some("abc")).is_none());
        assert!(page_param(Some("-1")).is_none());
        assert!(matches!(page_param(Some("last")), Some(PageParam::Last)));
    }
}
