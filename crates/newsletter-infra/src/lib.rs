//! # Newsletter Infrastructure
//!
//! Concrete implementations of the ports defined in `newsletter-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `auth` - JWT + Argon2 authentication

pub mod cache;
pub mod database;
pub mod markdown;
pub mod session;

#[cfg(feature = "auth")]
pub mod auth;

pub use cache::InMemoryCache;
pub use database::{DatabaseConnections, InMemoryDatabase};
pub use markdown::ComrakMarkdownRenderer;
pub use session::CacheSessionStore;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
