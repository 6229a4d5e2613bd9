//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use newsletter_core::DomainError;
use newsletter_core::access::CapabilitySet;
use newsletter_core::domain::User;
use newsletter_core::ports::{
    CommentRepository, MarkdownRenderer, PasswordService, PostRepository, SessionStore,
    TokenService, UserRepository,
};
use newsletter_core::services::{CommentService, PostService};
use newsletter_infra::{
    Argon2PasswordService, CacheSessionStore, ComrakMarkdownRenderer, InMemoryCache,
    InMemoryDatabase, JwtConfig, JwtTokenService,
};

use crate::config::{AdminAccount, AppConfig, SiteSettings};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub comments: CommentService,
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionStore>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub site: Arc<SiteSettings>,
}

/// The three repositories, from one backend.
struct Stores {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    users: Arc<dyn UserRepository>,
}

impl Stores {
    fn in_memory() -> Self {
        let db = Arc::new(InMemoryDatabase::new());
        Self {
            posts: db.clone(),
            comments: db.clone(),
            users: db,
        }
    }

    #[cfg(feature = "postgres")]
    async fn connect(config: &AppConfig) -> Self {
        use migration::{Migrator, MigratorTrait};
        use newsletter_infra::database::{
            DatabaseConnections, PostgresCommentRepository, PostgresPostRepository,
            PostgresUserRepository,
        };

        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::in_memory();
        };

        let connections = match DatabaseConnections::init(db_config).await {
            Ok(connections) => connections,
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                return Self::in_memory();
            }
        };

        if config.auto_migrate {
            match Migrator::up(&connections.main, None).await {
                Ok(()) => tracing::info!("Database migrations applied"),
                Err(e) => tracing::error!(error = %e, "Database migrations failed"),
            }
        }

        Self {
            posts: Arc::new(PostgresPostRepository::new(connections.main.clone())),
            comments: Arc::new(PostgresCommentRepository::new(connections.main.clone())),
            users: Arc::new(PostgresUserRepository::new(connections.main)),
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn connect(_config: &AppConfig) -> Self {
        tracing::info!("Running without postgres feature - using in-memory store");
        Self::in_memory()
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let stores = Stores::connect(config).await;

        let cache = Arc::new(InMemoryCache::new());
        spawn_session_sweeper(cache.clone(), config.session_ttl);
        let sessions = Arc::new(CacheSessionStore::new(cache, config.session_ttl));

        let state = Self::assemble(stores, sessions, config.jwt.clone(), config.site.clone());
        tracing::info!("Application state initialized");
        state
    }

    /// Everything in memory. Used by tests and local experiments.
    pub fn in_memory(site: SiteSettings) -> Self {
        let sessions = Arc::new(CacheSessionStore::new(
            Arc::new(InMemoryCache::new()),
            Duration::from_secs(3600),
        ));
        Self::assemble(Stores::in_memory(), sessions, JwtConfig::default(), site)
    }

    fn assemble(
        stores: Stores,
        sessions: Arc<dyn SessionStore>,
        jwt: JwtConfig,
        site: SiteSettings,
    ) -> Self {
        let markdown: Arc<dyn MarkdownRenderer> = Arc::new(ComrakMarkdownRenderer::new());

        Self {
            posts: PostService::new(stores.posts.clone(), stores.comments.clone(), markdown),
            comments: CommentService::new(stores.posts, stores.comments),
            users: stores.users,
            sessions,
            tokens: Arc::new(JwtTokenService::new(jwt)),
            passwords: Arc::new(Argon2PasswordService::new()),
            site: Arc::new(site),
        }
    }

    /// Create a user, rejecting taken usernames.
    pub async fn register_user(
        &self,
        username: &str,
        password: &str,
        capabilities: CapabilitySet,
    ) -> Result<User, DomainError> {
        if self.users.find_by_username(username).await?.is_some() {
            return Err(DomainError::Duplicate(format!(
                "username {username} already registered"
            )));
        }

        let password_hash = self
            .passwords
            .hash(password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let user = User::new(username.to_string(), password_hash, capabilities);
        let user = self.users.create(user).await?;
        tracing::info!(username = %user.username, "User registered");
        Ok(user)
    }

    /// Look a user up and check the password. `None` on any mismatch.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            return Ok(None);
        };

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        Ok(valid.then_some(user))
    }

    /// Ensure the configured admin exists with every capability.
    pub async fn bootstrap_admin(&self, admin: &AdminAccount) -> Result<(), DomainError> {
        match self.users.find_by_username(&admin.username).await? {
            Some(mut user) if user.capabilities != CapabilitySet::all() => {
                user.capabilities = CapabilitySet::all();
                user.updated_at = chrono::Utc::now();
                self.users.save(user).await?;
                tracing::info!(username = %admin.username, "Admin capabilities restored");
            }
            Some(_) => {}
            None => {
                self.register_user(&admin.username, &admin.password, CapabilitySet::all())
                    .await?;
                tracing::info!(username = %admin.username, "Admin account created");
            }
        }
        Ok(())
    }
}

/// Drop expired session keys every `ttl / 4`, at least once a minute.
fn spawn_session_sweeper(cache: Arc<InMemoryCache>, ttl: Duration) {
    let every = (ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(60));
    actix_rt::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            cache.purge_expired().await;
        }
    });
}
