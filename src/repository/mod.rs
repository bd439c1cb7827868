//! Storage interface.
//!
//! Services depend only on these traits. [`postgres::PgStore`] is the production
//! implementation; [`memory::MemoryStore`] keeps everything in process memory and backs the
//! test suites.

use async_trait::async_trait;

use crate::dto::PageRequest;
use crate::error::AppError;
use crate::models::{
    Comment, NewComment, NewTask, NewToken, NewUser, Role, Task, Token, User,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user. A duplicate email yields `AppError::Conflict`.
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_role(&self, role: Role) -> Result<Vec<User>, AppError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert(&self, task: NewTask) -> Result<Task, AppError>;
    /// Persists every mutable column of `task`.
    async fn update(&self, task: &Task) -> Result<Task, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, AppError>;
    /// Returns one page of all tasks ordered by id, plus the total count.
    async fn find_all(&self, page: PageRequest) -> Result<(Vec<Task>, u64), AppError>;
    async fn find_by_author(
        &self,
        author_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Task>, AppError>;
    /// Deletes the task and its comments. Returns `false` if nothing was deleted.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: NewComment) -> Result<Comment, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, AppError>;
    /// Returns one page of a task's comments ordered by id, plus the total count.
    async fn find_by_task(
        &self,
        task_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<Comment>, u64), AppError>;
    async fn find_all_by_task(&self, task_id: i64) -> Result<Vec<Comment>, AppError>;
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn insert(&self, token: NewToken) -> Result<Token, AppError>;
    async fn find_by_value(&self, token_value: &str) -> Result<Option<Token>, AppError>;
    /// Marks every active token of the user as revoked and expired.
    /// Returns the number of tokens changed.
    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, AppError>;
}
