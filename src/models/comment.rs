use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A comment on a task, as stored in the `comments` table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub task_id: i64,
    pub author_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub task_id: i64,
    pub author_id: i64,
}

/// Payload for adding a comment to a task.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CommentInput {
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Comment must be between 1 and 2000 characters"
    ))]
    pub content: String,
}
