//! Authentication extractors.
//!
//! The access token comes from an `Authorization: Bearer` header or, for
//! browsers, the `newsletter_token` cookie set by the login form.

use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, web};
use std::fmt;
use std::future::{Ready, ready};

use newsletter_core::access::{Actor, AuthenticatedUser};
use newsletter_core::ports::AuthError;
use newsletter_shared::ErrorResponse;

use crate::state::AppState;

/// Name of the access token cookie.
pub const TOKEN_COOKIE: &str = "newsletter_token";

/// The raw token. An `Authorization` header wins over the cookie.
fn bearer_token(req: &HttpRequest) -> Result<String, AuthError> {
    match req.headers().get(header::AUTHORIZATION) {
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_owned)
            .ok_or_else(|| AuthError::InvalidToken("malformed Authorization header".into())),
        None => req
            .cookie(TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_owned())
            .ok_or(AuthError::MissingAuth),
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AuthError> {
    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        tracing::error!("AppState is not registered as app data");
        AuthError::InvalidToken("server misconfigured".into())
    })?;

    let claims = state.tokens.validate_token(&bearer_token(req)?)?;
    Ok(claims.into())
}

/// Required identity for the JSON API. Rejects with a 401 problem body.
#[derive(Debug, Clone)]
pub struct Identity(pub AuthenticatedUser);

/// Why [`Identity`] could not be extracted.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl AuthenticationError {
    fn problem(&self) -> ErrorResponse {
        let (title, detail) = match &self.0 {
            AuthError::HashingError(_) => return ErrorResponse::internal_error(),
            AuthError::InvalidCredentials => return ErrorResponse::unauthorized(),
            AuthError::TokenExpired => ("Token Expired", "The access token has expired; log in again."),
            AuthError::InvalidToken(reason) => ("Invalid Token", reason.as_str()),
            AuthError::MissingAuth => (
                "Authentication Required",
                "Send a Bearer token or log in through /accounts/login.",
            ),
        };
        ErrorResponse::new(401, title).with_detail(detail)
    }
}

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        if matches!(self.0, AuthError::HashingError(_)) {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::UNAUTHORIZED
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.problem())
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(Identity).map_err(AuthenticationError))
    }
}

/// Whoever is making the request. Never fails: a missing, expired or
/// forged token is just an anonymous actor.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl FromRequest for CurrentActor {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let actor = match authenticate(req) {
            Ok(user) => Actor::User(user),
            Err(AuthError::MissingAuth) => Actor::Anonymous,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unusable access token");
                Actor::Anonymous
            }
        };
        ready(Ok(CurrentActor(actor)))
    }
}
