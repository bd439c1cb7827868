use std::collections::HashMap;
use std::sync::Arc;

use super::ReadCache;
use crate::auth::CurrentUser;
use crate::dto::{CommentDto, Page, PageRequest, TaskDto, UserShortDto};
use crate::error::AppError;
use crate::models::{NewTask, Task, TaskInput, User};
use crate::repository::{CommentRepository, TaskRepository, UserRepository};

pub(crate) async fn load_user(users: &dyn UserRepository, id: i64) -> Result<User, AppError> {
    users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

pub(crate) async fn load_task(tasks: &dyn TaskRepository, id: i64) -> Result<Task, AppError> {
    tasks
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))
}

/// Task management: creation, assignment, editing and deletion.
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    users: Arc<dyn UserRepository>,
    comments: Arc<dyn CommentRepository>,
    cache: Arc<ReadCache>,
}

impl TaskService {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        users: Arc<dyn UserRepository>,
        comments: Arc<dyn CommentRepository>,
        cache: Arc<ReadCache>,
    ) -> Self {
        Self {
            tasks,
            users,
            comments,
            cache,
        }
    }

    /// Creates a task authored by `user`. New tasks always start as `PENDING`.
    pub async fn create_task(
        &self,
        input: TaskInput,
        user: &CurrentUser,
    ) -> Result<TaskDto, AppError> {
        let task = self.tasks.insert(NewTask::new(input, user.id)).await?;
        log::info!("User {} created task {}", user.email, task.id);
        self.to_dto(&task).await
    }

    pub async fn assign_task(&self, task_id: i64, user_id: i64) -> Result<TaskDto, AppError> {
        let mut task = load_task(self.tasks.as_ref(), task_id).await?;
        let assignee = load_user(self.users.as_ref(), user_id).await?;

        task.assignee_id = Some(assignee.id);
        let task = self.tasks.update(&task).await?;
        self.cache.tasks.invalidate(&task.id);
        log::info!("Task {} assigned to user {}", task.id, assignee.id);

        self.to_dto(&task).await
    }

    pub async fn get_all_tasks(&self, page: PageRequest) -> Result<Page<TaskDto>, AppError> {
        let (tasks, total) = self.tasks.find_all(page).await?;
        let mut content = Vec::with_capacity(tasks.len());
        for task in &tasks {
            content.push(self.to_dto(task).await?);
        }
        Ok(Page::new(content, page, total))
    }

    pub async fn get_task(&self, task_id: i64) -> Result<TaskDto, AppError> {
        if let Some(dto) = self.cache.tasks.get(&task_id) {
            log::debug!("Task {} served from cache", task_id);
            return Ok(dto);
        }

        let task = load_task(self.tasks.as_ref(), task_id).await?;
        let dto = self.to_dto(&task).await?;
        self.cache.tasks.insert(task_id, dto.clone());
        Ok(dto)
    }

    /// Tasks authored by `user`, one page at a time.
    pub async fn get_user_tasks(
        &self,
        user: &CurrentUser,
        page: PageRequest,
    ) -> Result<Vec<TaskDto>, AppError> {
        let tasks = self.tasks.find_by_author(user.id, page).await?;
        let mut dtos = Vec::with_capacity(tasks.len());
        for task in &tasks {
            dtos.push(self.to_dto(task).await?);
        }
        Ok(dtos)
    }

    pub async fn update_task(
        &self,
        task_id: i64,
        input: TaskInput,
        user: &CurrentUser,
    ) -> Result<TaskDto, AppError> {
        let mut task = load_task(self.tasks.as_ref(), task_id).await?;
        if !user.is_admin() && task.author_id != user.id {
            log::warn!("User {} may not edit task {}", user.email, task_id);
            return Err(AppError::Forbidden("No permission to edit this task".into()));
        }

        let renamed = task.title != input.title;
        task.apply(input);
        let task = self.tasks.update(&task).await?;
        self.cache.tasks.invalidate(&task_id);
        if renamed {
            self.evict_comments(task_id).await?;
        }
        log::info!("Task {} updated by {}", task_id, user.email);

        self.to_dto(&task).await
    }

    /// Deletes a task together with its comments.
    pub async fn delete_task(&self, task_id: i64, user: &CurrentUser) -> Result<(), AppError> {
        let task = load_task(self.tasks.as_ref(), task_id).await?;
        if !user.is_admin() && task.author_id != user.id {
            log::warn!("User {} may not delete task {}", user.email, task_id);
            return Err(AppError::Forbidden("You can only delete your own tasks".into()));
        }

        self.evict_comments(task_id).await?;
        self.tasks.delete(task_id).await?;
        self.cache.tasks.invalidate(&task_id);
        log::info!("Task {} deleted by {}", task_id, user.email);
        Ok(())
    }

    /// Deletes a comment addressed through its task.
    pub async fn delete_comment(
        &self,
        task_id: i64,
        comment_id: i64,
        user: &CurrentUser,
    ) -> Result<(), AppError> {
        load_task(self.tasks.as_ref(), task_id).await?;
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .filter(|comment| comment.task_id == task_id)
            .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;

        if !user.is_admin() && comment.author_id != user.id {
            log::warn!("User {} may not delete comment {}", user.email, comment_id);
            return Err(AppError::Forbidden(
                "You can only delete your own comments".into(),
            ));
        }

        self.comments.delete(comment_id).await?;
        self.cache.comments.invalidate(&comment_id);
        self.cache.tasks.invalidate(&task_id);
        log::info!("Comment {} on task {} deleted by {}", comment_id, task_id, user.email);
        Ok(())
    }

    /// Cached comments embed the task title.
    async fn evict_comments(&self, task_id: i64) -> Result<(), AppError> {
        for comment in self.comments.find_all_by_task(task_id).await? {
            self.cache.comments.invalidate(&comment.id);
        }
        Ok(())
    }

    async fn to_dto(&self, task: &Task) -> Result<TaskDto, AppError> {
        let author = load_user(self.users.as_ref(), task.author_id).await?;
        let assignee = match task.assignee_id {
            Some(id) => Some(UserShortDto::from(
                &load_user(self.users.as_ref(), id).await?,
            )),
            None => None,
        };

        let mut people: HashMap<i64, User> = HashMap::new();
        people.insert(author.id, author.clone());

        let comments = self.comments.find_all_by_task(task.id).await?;
        let mut comment_dtos = Vec::with_capacity(comments.len());
        for comment in &comments {
            if !people.contains_key(&comment.author_id) {
                let commenter = load_user(self.users.as_ref(), comment.author_id).await?;
                people.insert(commenter.id, commenter);
            }
            if let Some(commenter) = people.get(&comment.author_id) {
                comment_dtos.push(CommentDto::new(comment, task, commenter));
            }
        }

        Ok(TaskDto::new(
            task,
            UserShortDto::from(&author),
            assignee,
            comment_dtos,
        ))
    }
}
