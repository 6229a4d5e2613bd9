//! Browser login and logout. The access token travels in an HttpOnly cookie.

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};
use serde::Deserialize;

use newsletter_core::Route;

use crate::middleware::auth::{CurrentActor, TOKEN_COOKIE};
use crate::middleware::error::{PageError, PageResult, reject};
use crate::middleware::session::Session;
use crate::state::AppState;
use crate::views::{Chrome, LoginTemplate, redirect, render};

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    next: Option<String>,
}

/// Only same-site absolute paths are followed after login.
fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => Route::PostList.path(),
    }
}

fn token_cookie(value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(TOKEN_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie.set_max_age(CookieDuration::seconds(max_age_secs));
    cookie
}

/// GET /accounts/login
pub async fn login_form(
    state: web::Data<AppState>,
    CurrentActor(actor): CurrentActor,
    session: Session,
    query: web::Query<NextQuery>,
) -> PageResult<HttpResponse> {
    let template = LoginTemplate {
        chrome: Chrome::load(&state, &actor, &session).await,
        action: Route::Login.path(),
        next: safe_next(query.next.as_deref()),
        username: String::new(),
        error: None,
    };
    render(&template, StatusCode::OK, &session)
}

/// POST /accounts/login
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    CurrentActor(actor): CurrentActor,
    session: Session,
    form: web::Form<LoginForm>,
) -> PageResult<HttpResponse> {
    let form = form.into_inner();
    let next = safe_next(form.next.as_deref());

    let user = state
        .authenticate(form.username.trim(), &form.password)
        .await
        .map_err(reject(&req, &state.site))?;

    let Some(user) = user else {
        tracing::info!(username = %form.username, "Login rejected");
        let template = LoginTemplate {
            chrome: Chrome::load(&state, &actor, &session).await,
            action: Route::Login.path(),
            next,
            username: form.username,
            error: Some("Please enter a correct username and password.".to_string()),
        };
        return render(&template, StatusCode::UNAUTHORIZED, &session);
    };

    let token = state
        .tokens
        .generate_token(&user.identity())
        .map_err(|e| PageError::Internal(e.to_string()))?;
    tracing::info!(username = %user.username, "User logged in");

    let mut response = redirect(&next, &session);
    response
        .add_cookie(&token_cookie(
            token,
            state.tokens.expiration_seconds(),
            state.site.secure_cookies,
        ))
        .map_err(|e| PageError::Internal(e.to_string()))?;
    Ok(response)
}

/// POST /accounts/logout
pub async fn logout(state: web::Data<AppState>, session: Session) -> PageResult<HttpResponse> {
    let mut removal = token_cookie(String::new(), 0, state.site.secure_cookies);
    removal.make_removal();

    let mut response = redirect(&Route::PostList.path(), &session);
    response
        .add_cookie(&removal)
        .map_err(|e| PageError::Internal(e.to_string()))?;
    Ok(response)
}
