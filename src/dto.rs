//! Response shapes returned by the API, and the mapping from stored entities to them.
//!
//! Entities never leave the service layer directly: handlers always answer with one of
//! these types, so password hashes and raw foreign keys stay internal.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::{Comment, Priority, Role, Task, TaskStatus, User};

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserShortDto {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
    pub role: Role,
}

impl From<&User> for UserShortDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            role: user.role,
        }
    }
}

/// Reference to a task embedded in other responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskShortDto {
    pub id: i64,
    pub title: String,
}

impl From<&Task> for TaskShortDto {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: i64,
    pub content: String,
    pub task_short_dto: TaskShortDto,
    pub user_short_dto: UserShortDto,
}

impl CommentDto {
    pub fn new(comment: &Comment, task: &Task, author: &User) -> Self {
        Self {
            id: comment.id,
            content: comment.content.clone(),
            task_short_dto: TaskShortDto::from(task),
            user_short_dto: UserShortDto::from(author),
        }
    }
}

/// Full view of a task with its people and comments resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub author: UserShortDto,
    pub assignee: Option<UserShortDto>,
    pub comments: Vec<CommentDto>,
}

impl TaskDto {
    pub fn new(
        task: &Task,
        author: UserShortDto,
        assignee: Option<UserShortDto>,
        comments: Vec<CommentDto>,
    ) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            author,
            assignee,
            comments,
        }
    }
}

/// Zero-based pagination parameters taken from the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageRequest {
    /// Page number, starting at 0.
    #[serde(default)]
    pub page: u32,
    /// Page size, between 1 and 100.
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    pub size: u32,
}

fn default_page_size() -> u32 {
    10
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: default_page_size(),
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[aliases(TaskPage = Page<TaskDto>, CommentPage = Page<CommentDto>)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size.max(1));
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages: total_elements.div_ceil(size),
        }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    pub status: u16,
    /// ISO-8601 local date-time (UTC) at which the error was produced.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status,
            timestamp: Utc::now()
                .naive_utc()
                .format("%Y-%m-%dT%H:%M:%S%.3f")
                .to_string(),
            errors: None,
        }
    }
}
