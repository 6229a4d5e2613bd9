//! Server-side session extractor.
//!
//! The client only ever holds an opaque id in the `newsletter_session`
//! cookie. Everything else lives in the [`SessionStore`].

use std::sync::Arc;

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures::future::LocalBoxFuture;
use uuid::Uuid;

use newsletter_core::domain::PostId;
use newsletter_core::ports::{CURRENT_POST_KEY, FLASH_KEY, SessionError, SessionStore};

use crate::state::AppState;

/// Name of the session id cookie.
pub const SESSION_COOKIE: &str = "newsletter_session";

/// The current client's session, with the current-post marker preloaded.
pub struct Session {
    id: String,
    fresh: bool,
    secure: bool,
    current_post: Option<PostId>,
    store: Arc<dyn SessionStore>,
}

impl Session {
    /// Id of the post this client last viewed, if any.
    pub fn current_post(&self) -> Option<PostId> {
        self.current_post
    }

    pub async fn set_current_post(&mut self, post_id: PostId) -> Result<(), SessionError> {
        self.store
            .set(&self.id, CURRENT_POST_KEY, &post_id.to_string())
            .await?;
        self.current_post = Some(post_id);
        Ok(())
    }

    /// Queue a message for the next rendered page. Unlike the post marker, a
    /// store failure is only logged: losing the message must not fail the write.
    pub async fn flash(&self, message: impl AsRef<str>) {
        if let Err(e) = self.store.set(&self.id, FLASH_KEY, message.as_ref()).await {
            tracing::warn!(error = %e, "Failed to store flash message");
        }
    }

    /// Pop the queued message. A broken store only costs the message.
    pub async fn take_flash(&self) -> Option<String> {
        if self.fresh {
            return None;
        }
        match self.store.remove(&self.id, FLASH_KEY).await {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read flash message");
                None
            }
        }
    }

    /// The cookie to send back, only when the id was minted for this request.
    pub fn cookie(&self) -> Option<Cookie<'static>> {
        if !self.fresh {
            return None;
        }
        let mut cookie = Cookie::new(SESSION_COOKIE, self.id.clone());
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_secure(self.secure);
        Some(cookie)
    }
}

impl FromRequest for Session {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let existing = req
            .cookie(SESSION_COOKIE)
            .and_then(|c| Uuid::parse_str(c.value()).ok());

        Box::pin(async move {
            let Some(state) = state else {
                tracing::error!("AppState not found in app data");
                return Err(actix_web::error::ErrorInternalServerError(
                    "Server configuration error",
                ));
            };

            let store = state.sessions.clone();
            let secure = state.site.secure_cookies;

            let Some(id) = existing else {
                return Ok(Session {
                    id: Uuid::new_v4().to_string(),
                    fresh: true,
                    secure,
                    current_post: None,
                    store,
                });
            };

            let id = id.to_string();
            let current_post = match store.get(&id, CURRENT_POST_KEY).await {
                Ok(value) => value.and_then(|v| v.parse().ok()),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to load session");
                    None
                }
            };

            Ok(Session {
                id,
                fresh: false,
                secure,
                current_post,
                store,
            })
        })
    }
}
