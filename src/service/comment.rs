use std::sync::Arc;

use super::task::{load_task, load_user};
use super::ReadCache;
use crate::auth::CurrentUser;
use crate::dto::{CommentDto, Page, PageRequest};
use crate::error::AppError;
use crate::models::{Comment, CommentInput, NewComment};
use crate::repository::{CommentRepository, TaskRepository, UserRepository};

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    tasks: Arc<dyn TaskRepository>,
    users: Arc<dyn UserRepository>,
    cache: Arc<ReadCache>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        tasks: Arc<dyn TaskRepository>,
        users: Arc<dyn UserRepository>,
        cache: Arc<ReadCache>,
    ) -> Self {
        Self {
            comments,
            tasks,
            users,
            cache,
        }
    }

    pub async fn get_comment_by_id(&self, comment_id: i64) -> Result<CommentDto, AppError> {
        if let Some(dto) = self.cache.comments.get(&comment_id) {
            log::debug!("Comment {} served from cache", comment_id);
            return Ok(dto);
        }

        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;
        let dto = self.to_dto(&comment).await?;
        self.cache.comments.insert(comment_id, dto.clone());
        Ok(dto)
    }

    pub async fn get_comments_by_task_id(
        &self,
        task_id: i64,
        page: PageRequest,
    ) -> Result<Page<CommentDto>, AppError> {
        let task = load_task(self.tasks.as_ref(), task_id).await?;
        let (comments, total) = self.comments.find_by_task(task_id, page).await?;

        let mut content = Vec::with_capacity(comments.len());
        for comment in &comments {
            let author = load_user(self.users.as_ref(), comment.author_id).await?;
            content.push(CommentDto::new(comment, &task, &author));
        }
        Ok(Page::new(content, page, total))
    }

    pub async fn add_comment(
        &self,
        task_id: i64,
        input: CommentInput,
        user: &CurrentUser,
    ) -> Result<CommentDto, AppError> {
        let task = load_task(self.tasks.as_ref(), task_id).await?;
        let author = load_user(self.users.as_ref(), user.id).await?;

        let comment = self
            .comments
            .insert(NewComment {
                content: input.content,
                task_id,
                author_id: author.id,
            })
            .await?;
        self.cache.tasks.invalidate(&task_id);
        log::info!("User {} commented on task {}", user.email, task_id);

        Ok(CommentDto::new(&comment, &task, &author))
    }

    pub async fn delete_comment(&self, comment_id: i64, user: &CurrentUser) -> Result<(), AppError> {
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;

        if !user.is_admin() && comment.author_id != user.id {
            log::warn!("User {} may not delete comment {}", user.email, comment_id);
            return Err(AppError::Forbidden("You cannot delete this comment".into()));
        }

        self.comments.delete(comment_id).await?;
        self.cache.comments.invalidate(&comment_id);
        self.cache.tasks.invalidate(&comment.task_id);
        log::info!("Comment {} deleted by {}", comment_id, user.email);
        Ok(())
    }

    async fn to_dto(&self, comment: &Comment) -> Result<CommentDto, AppError> {
        let task = load_task(self.tasks.as_ref(), comment.task_id).await?;
        let author = load_user(self.users.as_ref(), comment.author_id).await?;
        Ok(CommentDto::new(comment, &task, &author))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTask, NewUser, Role, TaskInput};
    use crate::repository::MemoryStore;
    use std::time::Duration;

    async fn setup() -> (MemoryStore, CommentService, Arc<ReadCache>, CurrentUser, i64) {
        let store = MemoryStore::new();
        let cache = Arc::new(ReadCache::new(Duration::from_secs(60), 100));
        let service = CommentService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            cache.clone(),
        );

        let author = UserRepository::insert(
            &store,
            NewUser {
                firstname: "Nina".into(),
                lastname: "Orlova".into(),
                email: "nina@example.com".into(),
                password_hash: "hash".into(),
                role: Role::User,
            },
        )
        .await
        .unwrap();
        let task = TaskRepository::insert(
            &store,
            NewTask::new(
                TaskInput {
                    title: "Plan sprint".into(),
                    description: "Pick stories".into(),
                    status: None,
                    priority: None,
                },
                author.id,
            ),
        )
        .await
        .unwrap();

        (store, service, cache, CurrentUser::from(&author), task.id)
    }

    fn comment(text: &str) -> CommentInput {
        CommentInput {
            content: text.into(),
        }
    }

    #[actix_rt::test]
    async fn test_add_and_page_comments() {
        let (_store, service, _cache, nina, task_id) = setup().await;
        for n in 0..3 {
            service
                .add_comment(task_id, comment(&format!("note {}", n)), &nina)
                .await
                .unwrap();
        }

        let page = service
            .get_comments_by_task_id(task_id, PageRequest::new(0, 2))
            .await
            .unwrap();
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.content.len(), 2);
        assert_eq!(page.content[0].content, "note 0");
        assert_eq!(page.content[0].task_short_dto.title, "Plan sprint");
        assert_eq!(page.content[0].user_short_dto.firstname, "Nina");
    }

    #[actix_rt::test]
    async fn test_missing_task() {
        let (_store, service, _cache, nina, _task_id) = setup().await;

        assert_eq!(
            service
                .add_comment(404, comment("hello"), &nina)
                .await
                .unwrap_err(),
            AppError::NotFound("Task not found".into())
        );
        assert_eq!(
            service
                .get_comments_by_task_id(404, PageRequest::default())
                .await
                .unwrap_err(),
            AppError::NotFound("Task not found".into())
        );
    }

    #[test_log::test(actix_rt::test)]
    async fn test_delete_comment_permissions() {
        let (store, service, cache, nina, task_id) = setup().await;
        let created = service
            .add_comment(task_id, comment("mine"), &nina)
            .await
            .unwrap();
        service.get_comment_by_id(created.id).await.unwrap();
        assert!(cache.comments.get(&created.id).is_some());

        let stranger = CurrentUser {
            id: 777,
            email: "stranger@example.com".into(),
            role: Role::User,
        };
        assert_eq!(
            service.delete_comment(created.id, &stranger).await.unwrap_err(),
            AppError::Forbidden("You cannot delete this comment".into())
        );

        service.delete_comment(created.id, &nina).await.unwrap();
        assert!(cache.comments.get(&created.id).is_none());
        assert!(CommentRepository::find_by_id(&store, created.id)
            .await
            .unwrap()
            .is_none());
        assert_eq!(
            service.get_comment_by_id(created.id).await.unwrap_err(),
            AppError::NotFound("Comment not found".into())
        );
    }
}
