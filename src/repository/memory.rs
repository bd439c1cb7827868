//! In-memory implementation of the storage traits.
//!
//! Mirrors the constraints the PostgreSQL schema enforces (unique emails and token values,
//! foreign keys, cascading comment deletion) so that services behave the same on both
//! stores. It is useful for tests and for running the API without a database.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{CommentRepository, TaskRepository, TokenRepository, UserRepository};
use crate::dto::PageRequest;
use crate::error::AppError;
use crate::models::{
    Comment, NewComment, NewTask, NewToken, NewUser, Role, Task, Token, User,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    tasks: BTreeMap<i64, Task>,
    comments: BTreeMap<i64, Comment>,
    tokens: BTreeMap<i64, Token>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn require_user(&self, id: i64) -> Result<(), AppError> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::Conflict(format!(
                "Data integrity violation: user {} does not exist",
                id
            )))
        }
    }
}

fn page_of<T: Clone>(rows: impl Iterator<Item = T>, page: PageRequest) -> Vec<T> {
    rows.skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(page.limit()).unwrap_or(0))
        .collect()
}

/// Process-local store. Cloning shares the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email is already in use".into()));
        }
        let user = User {
            id: tables.next_id(),
            firstname: user.firstname,
            lastname: user.lastname,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_role(&self, role: Role) -> Result<Vec<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn insert(&self, task: NewTask) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        tables.require_user(task.author_id)?;
        let task = Task {
            id: tables.next_id(),
            title: task.title,
            description: task.description,
            status: Some(task.status),
            priority: task.priority,
            author_id: task.author_id,
            assignee_id: None,
        };
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update(&self, task: &Task) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        if let Some(assignee_id) = task.assignee_id {
            tables.require_user(assignee_id)?;
        }
        match tables.tasks.get_mut(&task.id) {
            Some(stored) => {
                stored.title = task.title.clone();
                stored.description = task.description.clone();
                stored.status = task.status;
                stored.priority = task.priority;
                stored.assignee_id = task.assignee_id;
                Ok(stored.clone())
            }
            None => Err(AppError::NotFound("Record not found".into())),
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, AppError> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn find_all(&self, page: PageRequest) -> Result<(Vec<Task>, u64), AppError> {
        let tables = self.tables.read().await;
        let total = tables.tasks.len() as u64;
        Ok((page_of(tables.tasks.values().cloned(), page), total))
    }

    async fn find_by_author(
        &self,
        author_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Task>, AppError> {
        let tables = self.tables.read().await;
        let authored = tables
            .tasks
            .values()
            .filter(|t| t.author_id == author_id)
            .cloned();
        Ok(page_of(authored, page))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let removed = tables.tasks.remove(&id).is_some();
        if removed {
            tables.comments.retain(|_, c| c.task_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn insert(&self, comment: NewComment) -> Result<Comment, AppError> {
        let mut tables = self.tables.write().await;
        tables.require_user(comment.author_id)?;
        if !tables.tasks.contains_key(&comment.task_id) {
            return Err(AppError::Conflict(format!(
                "Data integrity violation: task {} does not exist",
                comment.task_id
            )));
        }
        let comment = Comment {
            id: tables.next_id(),
            content: comment.content,
            task_id: comment.task_id,
            author_id: comment.author_id,
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, AppError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn find_by_task(
        &self,
        task_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<Comment>, u64), AppError> {
        let tables = self.tables.read().await;
        let of_task = || {
            tables
                .comments
                .values()
                .filter(move |c| c.task_id == task_id)
                .cloned()
        };
        let total = of_task().count() as u64;
        Ok((page_of(of_task(), page), total))
    }

    async fn find_all_by_task(&self, task_id: i64) -> Result<Vec<Comment>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|c| c.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.write().await.comments.remove(&id).is_some())
    }
}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn insert(&self, token: NewToken) -> Result<Token, AppError> {
        let mut tables = self.tables.write().await;
        tables.require_user(token.user_id)?;
        if tables
            .tokens
            .values()
            .any(|t| t.token_value == token.token_value)
        {
            return Err(AppError::Conflict(
                "Data integrity violation: duplicate token".into(),
            ));
        }
        let token = Token {
            id: tables.next_id(),
            token_value: token.token_value,
            token_type: token.token_type,
            revoked: false,
            expired: false,
            user_id: token.user_id,
        };
        tables.tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn find_by_value(&self, token_value: &str) -> Result<Option<Token>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tokens
            .values()
            .find(|t| t.token_value == token_value)
            .cloned())
    }

    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, AppError> {
        let mut tables = self.tables.write().await;
        let mut changed = 0;
        for token in tables
            .tokens
            .values_mut()
            .filter(|t| t.user_id == user_id && t.is_active())
        {
            token.revoked = true;
            token.expired = true;
            changed += 1;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, TaskStatus};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            firstname: "Anna".into(),
            lastname: "Smirnova".into(),
            email: email.into(),
            password_hash: "hash".into(),
            role: Role::User,
        }
    }

    fn new_task(author_id: i64, title: &str) -> NewTask {
        NewTask {
            title: title.into(),
            description: "desc".into(),
            status: TaskStatus::Pending,
            priority: Some(Priority::Medium),
            author_id,
        }
    }

    #[actix_rt::test]
    async fn test_duplicate_email_is_conflict() {
        let store = MemoryStore::new();
        UserRepository::insert(&store, new_user("a@example.com"))
            .await
            .unwrap();

        let err = UserRepository::insert(&store, new_user("a@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::Conflict("Email is already in use".into()));
    }

    #[actix_rt::test]
    async fn test_task_pagination_and_cascade() {
        let store = MemoryStore::new();
        let author = UserRepository::insert(&store, new_user("b@example.com"))
            .await
            .unwrap();
        for n in 0..5 {
            TaskRepository::insert(&store, new_task(author.id, &format!("Task {}", n)))
                .await
                .unwrap();
        }

        let (page, total) = store.find_all(PageRequest::new(1, 2)).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(
            page.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(),
            vec!["Task 2", "Task 3"]
        );

        let first = store.find_all(PageRequest::new(0, 1)).await.unwrap().0.remove(0);
        CommentRepository::insert(
            &store,
            NewComment {
                content: "hi".into(),
                task_id: first.id,
                author_id: author.id,
            },
        )
        .await
        .unwrap();

        assert!(TaskRepository::delete(&store, first.id).await.unwrap());
        assert!(store.find_all_by_task(first.id).await.unwrap().is_empty());
        assert!(!TaskRepository::delete(&store, first.id).await.unwrap());
    }

    #[actix_rt::test]
    async fn test_task_requires_existing_author() {
        let store = MemoryStore::new();
        let err = TaskRepository::insert(&store, new_task(42, "Orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[actix_rt::test]
    async fn test_revoke_tokens() {
        let store = MemoryStore::new();
        let user = UserRepository::insert(&store, new_user("c@example.com"))
            .await
            .unwrap();
        TokenRepository::insert(&store, NewToken::bearer("t1".into(), user.id))
            .await
            .unwrap();
        TokenRepository::insert(&store, NewToken::bearer("t2".into(), user.id))
            .await
            .unwrap();

        assert_eq!(store.revoke_all_for_user(user.id).await.unwrap(), 2);
        assert_eq!(store.revoke_all_for_user(user.id).await.unwrap(), 0);

        let token = store.find_by_value("t1").await.unwrap().unwrap();
        assert!(!token.is_active());
    }
}
