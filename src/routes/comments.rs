use crate::{
    auth::CurrentUser,
    dto::PageRequest,
    error::AppError,
    models::CommentInput,
    service::AppState,
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/v1/comments/{taskId}",
    tag = "Comments",
    params(("taskId" = i64, Path, description = "Task to comment on")),
    request_body = CommentInput,
    responses(
        (status = 200, description = "Comment added", body = crate::dto::CommentDto),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 404, description = "Task not found", body = crate::dto::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[post("/{taskId}")]
pub async fn add_comment(
    state: web::Data<AppState>,
    user: CurrentUser,
    task_id: web::Path<i64>,
    comment_data: web::Json<CommentInput>,
) -> Result<impl Responder, AppError> {
    comment_data.validate()?;
    let comment = state
        .comments
        .add_comment(task_id.into_inner(), comment_data.into_inner(), &user)
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// Fetch a single comment (administrators only)
#[utoipa::path(
    get,
    path = "/api/v1/comments/{commentId}",
    tag = "Comments",
    params(("commentId" = i64, Path, description = "Comment id")),
    responses(
        (status = 200, description = "The comment", body = crate::dto::CommentDto),
        (status = 403, description = "Not an administrator", body = crate::dto::ErrorResponse),
        (status = 404, description = "Comment not found", body = crate::dto::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/{commentId}")]
pub async fn get_comment(
    state: web::Data<AppState>,
    user: CurrentUser,
    comment_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    user.require_admin()?;
    let comment = state
        .comments
        .get_comment_by_id(comment_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

#[utoipa::path(
    get,
    path = "/api/v1/comments/task/{taskId}",
    tag = "Comments",
    params(("taskId" = i64, Path, description = "Task id"), PageRequest),
    responses(
        (status = 200, description = "One page of the task's comments", body = crate::dto::CommentPage),
        (status = 404, description = "Task not found", body = crate::dto::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/task/{taskId}")]
pub async fn get_task_comments(
    state: web::Data<AppState>,
    _user: CurrentUser,
    task_id: web::Path<i64>,
    page: web::Query<PageRequest>,
) -> Result<impl Responder, AppError> {
    page.validate()?;
    let comments = state
        .comments
        .get_comments_by_task_id(task_id.into_inner(), page.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(comments))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/{commentId}",
    tag = "Comments",
    params(("commentId" = i64, Path, description = "Comment id")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 403, description = "Not the comment author", body = crate::dto::ErrorResponse),
        (status = 404, description = "Comment not found", body = crate::dto::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[delete("/{commentId}")]
pub async fn delete_comment(
    state: web::Data<AppState>,
    user: CurrentUser,
    comment_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state
        .comments
        .delete_comment(comment_id.into_inner(), &user)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
