//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use newsletter_core::access::{Capability, CapabilitySet};
use newsletter_infra::JwtConfig;
use newsletter_infra::database::DatabaseConfig;
use newsletter_infra::session::DEFAULT_SESSION_TTL;

/// Settings the HTML handlers read on every request.
#[derive(Debug, Clone)]
pub struct SiteSettings {
    /// Where unauthenticated actors are sent, with `?next=`.
    pub login_url: String,
    /// Capabilities granted to users created through registration.
    pub default_capabilities: CapabilitySet,
    /// Mark session and token cookies `Secure`.
    pub secure_cookies: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            login_url: "/accounts/login".to_string(),
            default_capabilities: [Capability::CreateComment].into_iter().collect(),
            secure_cookies: false,
        }
    }
}

/// An account created at startup with every capability.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub username: String,
    pub password: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Apply pending migrations before serving.
    pub auto_migrate: bool,
    pub session_ttl: Duration,
    pub jwt: JwtConfig,
    pub site: SiteSettings,
    pub admin: Option<AdminAccount>,
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

fn flag(key: &str) -> bool {
    env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS").unwrap_or(20),
            min_connections: parsed("DB_MIN_CONNECTIONS").unwrap_or(2),
        });

        let defaults = SiteSettings::default();
        let site = SiteSettings {
            login_url: env::var("LOGIN_URL").unwrap_or(defaults.login_url),
            default_capabilities: env::var("DEFAULT_CAPABILITIES")
                .map(|codes| CapabilitySet::parse_codes(&codes))
                .unwrap_or(defaults.default_capabilities),
            secure_cookies: flag("SECURE_COOKIES"),
        };

        let admin = match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
            (Ok(username), Ok(password)) if !username.is_empty() && !password.is_empty() => {
                Some(AdminAccount { username, password })
            }
            _ => None,
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT").unwrap_or(8080),
            database,
            auto_migrate: flag("AUTO_MIGRATE"),
            session_ttl: parsed("SESSION_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_SESSION_TTL),
            jwt: JwtConfig::from_env(),
            site,
            admin,
        }
    }
}
