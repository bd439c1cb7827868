//! Business logic, one service per resource.
//!
//! Services own the authorization rules that depend on data (authorship, task/comment
//! relationships) and keep the read caches coherent. Role checks that depend only on the
//! caller are done by the handlers.

pub mod auth;
pub mod bootstrap;
pub mod comment;
pub mod task;

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthMiddleware, JwtService};
use crate::cache::TtlCache;
use crate::config::Config;
use crate::dto::{CommentDto, TaskDto};
use crate::repository::{CommentRepository, TaskRepository, TokenRepository, UserRepository};

pub use auth::AuthService;
pub use comment::CommentService;
pub use task::TaskService;

/// Read caches shared by the task and comment services.
#[derive(Debug)]
pub struct ReadCache {
    pub tasks: TtlCache<i64, TaskDto>,
    pub comments: TtlCache<i64, CommentDto>,
}

impl ReadCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            tasks: TtlCache::new(ttl, max_entries),
            comments: TtlCache::new(ttl, max_entries),
        }
    }
}

/// Shared application state handed to every handler through `web::Data`.
pub struct AppState {
    pub auth: AuthService,
    pub tasks: TaskService,
    pub comments: CommentService,
    jwt: JwtService,
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
}

impl AppState {
    /// Wires every service onto one store.
    pub fn new<S>(store: S, config: &Config) -> Self
    where
        S: UserRepository + TaskRepository + CommentRepository + TokenRepository + Clone + 'static,
    {
        let users: Arc<dyn UserRepository> = Arc::new(store.clone());
        let tasks: Arc<dyn TaskRepository> = Arc::new(store.clone());
        let comments: Arc<dyn CommentRepository> = Arc::new(store.clone());
        let tokens: Arc<dyn TokenRepository> = Arc::new(store);

        let jwt = JwtService::new(&config.jwt_secret, config.jwt_expiration_hours);
        let cache = Arc::new(ReadCache::new(
            Duration::from_secs(config.cache_ttl_seconds),
            config.cache_max_entries,
        ));

        Self {
            auth: AuthService::new(
                users.clone(),
                tokens.clone(),
                jwt.clone(),
                config.bcrypt_cost,
            ),
            tasks: TaskService::new(
                tasks.clone(),
                users.clone(),
                comments.clone(),
                cache.clone(),
            ),
            comments: CommentService::new(comments, tasks, users.clone(), cache),
            jwt,
            users,
            tokens,
        }
    }

    pub fn auth_middleware(&self) -> AuthMiddleware {
        AuthMiddleware::new(self.jwt.clone(), self.users.clone(), self.tokens.clone())
    }

    pub fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }
}
