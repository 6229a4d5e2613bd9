//! Error mapping.
//!
//! [`AppError`] answers the JSON API with RFC 7807 bodies. [`PageError`]
//! answers the HTML pages: an error page, or a redirect to the login form.

use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, http::header};
use std::fmt;

use newsletter_core::error::{DomainError, FieldErrors};
use newsletter_shared::ErrorResponse;

use crate::config::SiteSettings;
use crate::views::ErrorTemplate;

/// Failure of a JSON API handler, answered with an RFC 7807 body.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
    Conflict(String),
    Internal(String),
    Validation(FieldErrors),
}

impl AppError {
    fn problem(&self) -> ErrorResponse {
        match self {
            AppError::NotFound(detail) => ErrorResponse::new(404, "Not Found").with_detail(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::Forbidden(detail) => ErrorResponse::new(403, "Forbidden").with_detail(detail),
            AppError::Conflict(detail) => ErrorResponse::conflict(detail),
            AppError::Internal(_) => ErrorResponse::internal_error(),
            AppError::Validation(errors) => {
                ErrorResponse::new(422, "Unprocessable Entity").with_detail(errors.to_string())
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(detail) => write!(f, "internal error: {detail}"),
            other => {
                let problem = other.problem();
                match problem.detail {
                    Some(detail) => write!(f, "{}: {detail}", problem.title),
                    None => f.write_str(&problem.title),
                }
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.problem().status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = self {
            tracing::error!(%detail, "request failed");
        }
        HttpResponse::build(self.status_code()).json(self.problem())
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{entity_type} {id} does not exist"))
            }
            DomainError::Validation(errors) => AppError::Validation(errors),
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Unauthenticated => AppError::Unauthorized,
            DomainError::Forbidden(capability) => {
                AppError::Forbidden(format!("missing capability {capability}"))
            }
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias for JSON handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Failure of an HTML page handler.
#[derive(Debug)]
pub enum PageError {
    /// Send the client to the login form. Holds the full location.
    LoginRequired(String),
    Forbidden,
    NotFound,
    Invalid(FieldErrors),
    Conflict(String),
    Internal(String),
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageError::LoginRequired(location) => write!(f, "Login required: {}", location),
            PageError::Forbidden => write!(f, "Forbidden"),
            PageError::NotFound => write!(f, "Not found"),
            PageError::Invalid(errors) => write!(f, "Invalid input: {}", errors),
            PageError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            PageError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl PageError {
    fn page(&self) -> (&'static str, String) {
        match self {
            PageError::Forbidden => (
                "Forbidden",
                "You do not have permission to do that.".to_string(),
            ),
            PageError::NotFound => (
                "Not Found",
                "The page you asked for does not exist.".to_string(),
            ),
            PageError::Invalid(errors) => ("Invalid Input", errors.to_string()),
            PageError::Conflict(msg) => ("Conflict", msg.clone()),
            PageError::LoginRequired(_) | PageError::Internal(_) => (
                "Server Error",
                "Something went wrong on our side.".to_string(),
            ),
        }
    }
}

impl ResponseError for PageError {
    fn status_code(&self) -> StatusCode {
        match self {
            PageError::LoginRequired(_) => StatusCode::FOUND,
            PageError::Forbidden => StatusCode::FORBIDDEN,
            PageError::NotFound => StatusCode::NOT_FOUND,
            PageError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PageError::Conflict(_) => StatusCode::CONFLICT,
            PageError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let PageError::LoginRequired(location) = self {
            return HttpResponse::Found()
                .insert_header((header::LOCATION, location.as_str()))
                .finish();
        }
        if let PageError::Internal(detail) = self {
            tracing::error!("Internal error: {}", detail);
        }

        let (title, message) = self.page();
        let status = self.status_code();
        let template = ErrorTemplate {
            status: status.as_u16(),
            title,
            message,
        };

        match askama::Template::render(&template) {
            Ok(body) => HttpResponse::build(status)
                .content_type("text/html; charset=utf-8")
                .body(body),
            Err(e) => {
                tracing::error!(error = %e, "Error page rendering failed");
                HttpResponse::build(status).body(title)
            }
        }
    }
}

impl From<askama::Error> for PageError {
    fn from(err: askama::Error) -> Self {
        PageError::Internal(format!("template rendering failed: {err}"))
    }
}

impl From<newsletter_core::ports::SessionError> for PageError {
    fn from(err: newsletter_core::ports::SessionError) -> Self {
        PageError::Internal(err.to_string())
    }
}

/// Result type alias for page handlers.
pub type PageResult<T> = Result<T, PageError>;

/// Login form location that returns to the current request afterwards.
pub fn login_location(login_url: &str, req: &HttpRequest) -> String {
    let next = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| req.path());
    let separator = if login_url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}next={}",
        login_url,
        separator,
        urlencoding::encode(next)
    )
}

/// Build the mapper from domain failures to page failures for `req`.
///
/// An anonymous actor is sent to the login form; a signed-in actor without
/// the capability gets a 403.
pub fn reject<'a>(
    req: &'a HttpRequest,
    site: &'a SiteSettings,
) -> impl FnOnce(DomainError) -> PageError + 'a {
    move |err| match err {
        DomainError::Unauthenticated => {
            PageError::LoginRequired(login_location(&site.login_url, req))
        }
        DomainError::Forbidden(capability) => {
            tracing::debug!(%capability, path = req.path(), "Capability missing");
            PageError::Forbidden
        }
        DomainError::NotFound { .. } => PageError::NotFound,
        DomainError::Validation(errors) => PageError::Invalid(errors),
        DomainError::Duplicate(msg) => PageError::Conflict(msg),
        DomainError::Internal(msg) => PageError::Internal(msg),
    }
}
