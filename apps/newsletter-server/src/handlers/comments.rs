//! Comment pages.
//!
//! Comments are addressed by their own id, so update and delete send the
//! client back through [`return_to`] with the session's current-post marker.

use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};

use newsletter_core::domain::{CommentId, PostId};
use newsletter_core::forms::CommentForm;
use newsletter_core::routes::return_to;
use newsletter_core::{DomainError, FieldErrors, Route};

use crate::middleware::auth::CurrentActor;
use crate::middleware::error::{PageResult, reject};
use crate::middleware::session::Session;
use crate::state::AppState;
use crate::views::{
    AuthorNames, Chrome, CommentDetailTemplate, CommentFormTemplate, CommentListTemplate,
    CommentRow, ConfirmDeleteTemplate, PostRow, field_errors, redirect, render,
};

/// GET /{id}/comments
pub async fn list_for_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    CurrentActor(actor): CurrentActor,
    session: Session,
    path: web::Path<PostId>,
) -> PageResult<HttpResponse> {
    let (post, comments) = state
        .comments
        .for_post(path.into_inner())
        .await
        .map_err(reject(&req, &state.site))?;

    let names = AuthorNames::resolve(
        state.users.as_ref(),
        std::iter::once(post.author_id).chain(comments.iter().map(|c| c.author_id)),
    )
    .await;

    let template = CommentListTemplate {
        chrome: Chrome::load(&state, &actor, &session).await,
        post: PostRow::new(&post, &names),
        comments: CommentRow::many(&comments, &names),
    };
    render(&template, StatusCode::OK, &session)
}

/// GET /comments/{id}
pub async fn detail(
    req: HttpRequest,
    state: web::Data<AppState>,
    CurrentActor(actor): CurrentActor,
    session: Session,
    path: web::Path<CommentId>,
) -> PageResult<HttpResponse> {
    let comment = state
        .comments
        .get(path.into_inner())
        .await
        .map_err(reject(&req, &state.site))?;

    let names = AuthorNames::resolve(state.users.as_ref(), [comment.author_id]).await;
    let template = CommentDetailTemplate {
        chrome: Chrome::load(&state, &actor, &session).await,
        comment: CommentRow::new(&comment, &names),
    };
    render(&template, StatusCode::OK, &session)
}

fn comment_form(
    chrome: Chrome,
    heading: &str,
    action: Route,
    cancel: Route,
    form: CommentForm,
    errors: &FieldErrors,
) -> CommentFormTemplate {
    CommentFormTemplate {
        chrome,
        heading: heading.to_string(),
        action: action.path(),
        cancel_href: cancel.path(),
        text: form.text,
        errors: field_errors(errors, "text"),
    }
}

/// GET /{id}/comments/create
pub async fn create_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    CurrentActor(actor): CurrentActor,
    session: Session,
    path: web::Path<PostId>,
) -> PageResult<HttpResponse> {
    let post = state
        .comments
        .authorize_create(&actor, path.into_inner())
        .await
        .map_err(reject(&req, &state.site))?;

    let template = comment_form(
        Chrome::load(&state, &actor, &session).await,
        &format!("Comment on '{}'", post.title),
        Route::CommentCreate(post.id),
        Route::PostDetail(post.id),
        CommentForm::default(),
        &FieldErrors::new(),
    );
    render(&template, StatusCode::OK, &session)
}

/// POST /{id}/comments/create - post and author come from the URL and the
/// actor, whatever the form says.
pub async fn create(
    req: HttpRequest,
    state: web::Data<AppState>,
    CurrentActor(actor): CurrentActor,
    session: Session,
    path: web::Path<PostId>,
    form: web::Form<CommentForm>,
) -> PageResult<HttpResponse> {
    let post_id = path.into_inner();
    let form = form.into_inner();

    match state.comments.create(&actor, post_id, form.clone()).await {
        Ok(comment) => {
            session.flash("Comment successfully added").await;
            Ok(redirect(&Route::PostDetail(comment.post_id).path(), &session))
        }
        Err(DomainError::Validation(errors)) => {
            let template = comment_form(
                Chrome::load(&state, &actor, &session).await,
                "New comment",
                Route::CommentCreate(post_id),
                Route::PostDetail(post_id),
                form,
                &errors,
            );
            render(&template, StatusCode::UNPROCESSABLE_ENTITY, &session)
        }
        Err(e) => Err(reject(&req, &state.site)(e)),
    }
}

/// GET /comments/{id}/update
pub async fn update_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    CurrentActor(actor): CurrentActor,
    session: Session,
    path: web::Path<CommentId>,
) -> PageResult<HttpResponse> {
    let id = path.into_inner();
    let comment = state
        .comments
        .edit(&actor, id)
        .await
        .map_err(reject(&req, &state.site))?;

    let template = comment_form(
        Chrome::load(&state, &actor, &session).await,
        "Edit comment",
        Route::CommentUpdate(id),
        return_to(session.current_post()),
        CommentForm::new(comment.text),
        &FieldErrors::new(),
    );
    render(&template, StatusCode::OK, &session)
}

/// POST /comments/{id}/update
pub async fn update(
    req: HttpRequest,
    state: web::Data<AppState>,
    CurrentActor(actor): CurrentActor,
    session: Session,
    path: web::Path<CommentId>,
    form: web::Form<CommentForm>,
) -> PageResult<HttpResponse> {
    let id = path.into_inner();
    let form = form.into_inner();

    match state.comments.update(&actor, id, form.clone()).await {
        Ok(_) => {
            session.flash("Comment successfully updated").await;
            Ok(redirect(&return_to(session.current_post()).path(), &session))
        }
        Err(DomainError::Validation(errors)) => {
            let template = comment_form(
                Chrome::load(&state, &actor, &session).await,
                "Edit comment",
                Route::CommentUpdate(id),
                return_to(session.current_post()),
                form,
                &errors,
            );
            render(&template, StatusCode::UNPROCESSABLE_ENTITY, &session)
        }
        Err(e) => Err(reject(&req, &state.site)(e)),
    }
}

/// GET /comments/{id}/delete
pub async fn delete_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    CurrentActor(actor): CurrentActor,
    session: Session,
    path: web::Path<CommentId>,
) -> PageResult<HttpResponse> {
    let id = path.into_inner();
    state
        .comments
        .confirm_delete(&actor, id)
        .await
        .map_err(reject(&req, &state.site))?;

    let template = ConfirmDeleteTemplate {
        chrome: Chrome::load(&state, &actor, &session).await,
        heading: "Delete comment".to_string(),
        subject: "this comment".to_string(),
        action: Route::CommentDelete(id).path(),
        cancel_href: return_to(session.current_post()).path(),
    };
    render(&template, StatusCode::OK, &session)
}

/// POST /comments/{id}/delete
pub async fn delete(
    req: HttpRequest,
    state: web::Data<AppState>,
    CurrentActor(actor): CurrentActor,
    session: Session,
    path: web::Path<CommentId>,
) -> PageResult<HttpResponse> {
    state
        .comments
        .delete(&actor, path.into_inner())
        .await
        .map_err(reject(&req, &state.site))?;

    session.flash("Comment successfully deleted").await;
    Ok(redirect(&return_to(session.current_post()).path(), &session))
}
