use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{CommentRepository, TaskRepository, TokenRepository, UserRepository};
use crate::dto::PageRequest;
use crate::error::AppError;
use crate::models::{
    Comment, NewComment, NewTask, NewToken, NewUser, Role, Task, Token, User,
};

/// PostgreSQL-backed store. Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the versioned scripts under `migrations/` that have not run yet.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {}", e)))
    }
}

fn to_count(total: i64) -> u64 {
    u64::try_from(total).unwrap_or_default()
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (firstname, lastname, email, password_hash, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, firstname, lastname, email, password_hash, role",
        )
        .bind(user.firstname)
        .bind(user.lastname)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, firstname, lastname, email, password_hash, role FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, firstname, lastname, email, password_hash, role FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_role(&self, role: Role) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, firstname, lastname, email, password_hash, role FROM users
             WHERE role = $1 ORDER BY id",
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}

#[async_trait]
impl TaskRepository for PgStore {
    async fn insert(&self, task: NewTask) -> Result<Task, AppError> {
        let task = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (title, description, status, priority, author_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, title, description, status, priority, author_id, assignee_id",
        )
        .bind(task.title)
        .bind(task.description)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.author_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    async fn update(&self, task: &Task) -> Result<Task, AppError> {
        let task = sqlx::query_as::<_, Task>(
            "UPDATE tasks
             SET title = $1, description = $2, status = $3, priority = $4, assignee_id = $5
             WHERE id = $6
             RETURNING id, title, description, status, priority, author_id, assignee_id",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.assignee_id)
        .bind(task.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, status, priority, author_id, assignee_id
             FROM tasks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn find_all(&self, page: PageRequest) -> Result<(Vec<Task>, u64), AppError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, status, priority, author_id, assignee_id
             FROM tasks ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
            .fetch_one(&self.pool)
            .await?;

        Ok((tasks, to_count(total)))
    }

    async fn find_by_author(
        &self,
        author_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, status, priority, author_id, assignee_id
             FROM tasks WHERE author_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
        )
        .bind(author_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        // comments.task_id is declared ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CommentRepository for PgStore {
    async fn insert(&self, comment: NewComment) -> Result<Comment, AppError> {
        let comment = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (content, task_id, author_id)
             VALUES ($1, $2, $3)
             RETURNING id, content, task_id, author_id",
        )
        .bind(comment.content)
        .bind(comment.task_id)
        .bind(comment.author_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, AppError> {
        let comment = sqlx::query_as::<_, Comment>(
            "SELECT id, content, task_id, author_id FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn find_by_task(
        &self,
        task_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<Comment>, u64), AppError> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, content, task_id, author_id FROM comments
             WHERE task_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
        )
        .bind(task_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE task_id = $1")
            .bind(task_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((comments, to_count(total)))
    }

    async fn find_all_by_task(&self, task_id: i64) -> Result<Vec<Comment>, AppError> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, content, task_id, author_id FROM comments
             WHERE task_id = $1 ORDER BY id",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TokenRepository for PgStore {
    async fn insert(&self, token: NewToken) -> Result<Token, AppError> {
        let token = sqlx::query_as::<_, Token>(
            "INSERT INTO tokens (token_value, token_type, user_id)
             VALUES ($1, $2, $3)
             RETURNING id, token_value, token_type, revoked, expired, user_id",
        )
        .bind(token.token_value)
        .bind(token.token_type)
        .bind(token.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(token)
    }

    async fn find_by_value(&self, token_value: &str) -> Result<Option<Token>, AppError> {
        let token = sqlx::query_as::<_, Token>(
            "SELECT id, token_value, token_type, revoked, expired, user_id
             FROM tokens WHERE token_value = $1",
        )
        .bind(token_value)
        .fetch_optional(&self.pool)
        .await?;
        Ok(token)
    }

    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE tokens SET revoked = TRUE, expired = TRUE
             WHERE user_id = $1 AND (revoked = FALSE OR expired = FALSE)",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
