//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod cache;
mod markdown;
mod repository;
mod session;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use cache::{Cache, CacheError};
pub use markdown::MarkdownRenderer;
pub use repository::{BaseRepository, CommentRepository, PostRepository, UserRepository};
pub use session::{CURRENT_POST_KEY, FLASH_KEY, SessionError, SessionStore};
