use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Newly created, not started. Every task starts here.
    Pending,
    /// Being worked on.
    InProgress,
    /// Finished.
    Complete,
}

/// Input structure for creating or updating a task.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct TaskInput {
    /// The title of the task.
    /// Must be between 1 and 255 characters.
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    /// The description of the task.
    /// Must be between 1 and 5000 characters.
    #[validate(length(
        min = 1,
        max = 5000,
        message = "Description must be between 1 and 5000 characters"
    ))]
    pub description: String,

    /// Ignored on creation (tasks always start as `PENDING`); applied on update.
    pub status: Option<TaskStatus>,

    pub priority: Option<Priority>,
}

/// Represents a task as stored in the `tasks` table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    /// Identifier of the user who created the task.
    pub author_id: i64,
    /// Identifier of the user the task is assigned to, if any.
    pub assignee_id: Option<i64>,
}

/// Values for inserting a task. The id is generated by the store.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Option<Priority>,
    pub author_id: i64,
}

impl NewTask {
    /// Creates a task owned by `author_id`. The status from the input is discarded:
    /// new tasks are always `PENDING` and unassigned.
    pub fn new(input: TaskInput, author_id: i64) -> Self {
        Self {
            title: input.title,
            description: input.description,
            status: TaskStatus::Pending,
            priority: input.priority,
            author_id,
        }
    }
}

impl Task {
    /// Applies an update payload. Absent status or priority keep their current value;
    /// the author and assignee are left untouched.
    pub fn apply(&mut self, input: TaskInput) {
        self.title = input.title;
        self.description = input.description;
        if input.status.is_some() {
            self.status = input.status;
        }
        if input.priority.is_some() {
            self.priority = input.priority;
        }
    }
}
