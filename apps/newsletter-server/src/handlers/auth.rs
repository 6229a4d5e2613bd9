//! JSON authentication API.

use actix_web::{HttpResponse, web};

use newsletter_core::domain::User;
use newsletter_shared::dto::{AuthResponse, Credentials, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const MIN_PASSWORD_LENGTH: usize = 8;

fn issue_token(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let token = state
        .tokens
        .generate_token(&user.identity())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let lifetime = u64::try_from(state.tokens.expiration_seconds()).unwrap_or(0);
    Ok(AuthResponse::bearer(token, lifetime))
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<Credentials>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let username = req.username.trim();

    if username.is_empty() {
        return Err(AppError::BadRequest("Username is required".to_string()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let user = state
        .register_user(
            username,
            &req.password,
            state.site.default_capabilities.clone(),
        )
        .await?;

    Ok(HttpResponse::Created().json(issue_token(&state, &user)?))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<Credentials>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .authenticate(req.username.trim(), &req.password)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(issue_token(&state, &user)?))
}

/// GET /api/auth/me - Protected route
pub async fn me(Identity(user): Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(UserResponse {
        id: user.id.to_string(),
        username: user.username,
        capabilities: user
            .capabilities
            .iter()
            .map(|c| c.code().to_string())
            .collect(),
    }))
}
