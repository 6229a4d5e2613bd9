//! Shared fixtures for the HTTP tests.

#![allow(dead_code)]

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;

use newsletter_core::access::{Actor, Capability, CapabilitySet};
use newsletter_core::domain::{Comment, Post, User};
use newsletter_core::forms::{CommentForm, PostForm};
use newsletter_core::ports::UserRepository;
use newsletter_server::config::SiteSettings;
use newsletter_server::middleware::session::SESSION_COOKIE;
use newsletter_server::state::AppState;

/// Build an initialised test service over `$state`.
macro_rules! app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state.clone()))
                .configure(newsletter_server::handlers::configure_routes),
        )
        .await
    };
}

pub fn state() -> AppState {
    AppState::in_memory(SiteSettings::default())
}

/// A stored user holding `capabilities`, with a bearer header value.
pub struct TestUser {
    pub actor: Actor,
    pub bearer: String,
}

impl TestUser {
    pub fn auth_header(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, self.bearer.clone())
    }
}

pub async fn user(state: &AppState, username: &str, capabilities: &[Capability]) -> TestUser {
    let capabilities: CapabilitySet = capabilities.iter().copied().collect();
    let user = state
        .users
        .create(User::new(
            username.to_string(),
            "not-a-real-hash".to_string(),
            capabilities,
        ))
        .await
        .unwrap();

    let identity = user.identity();
    let token = state.tokens.generate_token(&identity).unwrap();
    TestUser {
        actor: Actor::User(identity),
        bearer: format!("Bearer {token}"),
    }
}

pub async fn admin(state: &AppState) -> TestUser {
    user(state, "admin", &Capability::ALL).await
}

pub async fn post(state: &AppState, author: &TestUser, title: &str, text: &str) -> Post {
    state
        .posts
        .create(&author.actor, PostForm::new(title, text))
        .await
        .unwrap()
}

pub async fn comment(state: &AppState, author: &TestUser, post: &Post, text: &str) -> Comment {
    state
        .comments
        .create(&author.actor, post.id, CommentForm::new(text))
        .await
        .unwrap()
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// The session cookie a response minted, if any.
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
}
