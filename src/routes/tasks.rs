use crate::{
    auth::CurrentUser,
    dto::PageRequest,
    error::AppError,
    models::TaskInput,
    service::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Create a task
///
/// The caller becomes the author. New tasks always start as `PENDING`.
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    tag = "Tasks",
    request_body = TaskInput,
    responses(
        (status = 200, description = "Task created", body = crate::dto::TaskDto),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task = state
        .tasks
        .create_task(task_data.into_inner(), &user)
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Assign a task to a user (administrators only)
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{taskId}/assign/{userId}",
    tag = "Tasks",
    params(
        ("taskId" = i64, Path, description = "Task id"),
        ("userId" = i64, Path, description = "Assignee id")
    ),
    responses(
        (status = 200, description = "Task assigned", body = crate::dto::TaskDto),
        (status = 403, description = "Not an administrator", body = crate::dto::ErrorResponse),
        (status = 404, description = "Task or user not found", body = crate::dto::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[put("/{taskId}/assign/{userId}")]
pub async fn assign_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(i64, i64)>,
) -> Result<impl Responder, AppError> {
    user.require_admin()?;
    let (task_id, user_id) = path.into_inner();
    let task = state.tasks.assign_task(task_id, user_id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// List every task (administrators only)
#[utoipa::path(
    get,
    path = "/api/v1/tasks/all",
    tag = "Tasks",
    params(PageRequest),
    responses(
        (status = 200, description = "One page of tasks", body = crate::dto::TaskPage),
        (status = 403, description = "Not an administrator", body = crate::dto::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/all")]
pub async fn get_all_tasks(
    state: web::Data<AppState>,
    user: CurrentUser,
    page: web::Query<PageRequest>,
) -> Result<impl Responder, AppError> {
    user.require_admin()?;
    page.validate()?;
    let tasks = state.tasks.get_all_tasks(page.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

#[utoipa::path(
    get,
    path = "/api/v1/tasks/{taskId}",
    tag = "Tasks",
    params(("taskId" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "The task", body = crate::dto::TaskDto),
        (status = 404, description = "Task not found", body = crate::dto::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/{taskId}")]
pub async fn get_task(
    state: web::Data<AppState>,
    _user: CurrentUser,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.get_task(task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// List the caller's own tasks
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    tag = "Tasks",
    params(PageRequest),
    responses(
        (status = 200, description = "Tasks authored by the caller", body = [crate::dto::TaskDto])
    ),
    security(("bearer_auth" = []))
)]
#[get("")]
pub async fn get_user_tasks(
    state: web::Data<AppState>,
    user: CurrentUser,
    page: web::Query<PageRequest>,
) -> Result<impl Responder, AppError> {
    page.validate()?;
    let tasks = state
        .tasks
        .get_user_tasks(&user, page.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Update a task
///
/// Allowed for the author and for administrators. Omitted status or priority keep their
/// current values.
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{taskId}",
    tag = "Tasks",
    params(("taskId" = i64, Path, description = "Task id")),
    request_body = TaskInput,
    responses(
        (status = 200, description = "Task updated", body = crate::dto::TaskDto),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 403, description = "Not the author", body = crate::dto::ErrorResponse),
        (status = 404, description = "Task not found", body = crate::dto::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[put("/{taskId}")]
pub async fn update_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    task_id: web::Path<i64>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task = state
        .tasks
        .update_task(task_id.into_inner(), task_data.into_inner(), &user)
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Delete a task and its comments
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{taskId}",
    tag = "Tasks",
    params(("taskId" = i64, Path, description = "Task id")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 403, description = "Not the author", body = crate::dto::ErrorResponse),
        (status = 404, description = "Task not found", body = crate::dto::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[delete("/{taskId}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state.tasks.delete_task(task_id.into_inner(), &user).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a comment of a task
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{taskId}/comments/{commentId}",
    tag = "Tasks",
    params(
        ("taskId" = i64, Path, description = "Task id"),
        ("commentId" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 403, description = "Not the comment author", body = crate::dto::ErrorResponse),
        (status = 404, description = "Task or comment not found", body = crate::dto::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[delete("/{taskId}/comments/{commentId}")]
pub async fn delete_task_comment(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(i64, i64)>,
) -> Result<impl Responder, AppError> {
    let (task_id, comment_id) = path.into_inner();
    state
        .tasks
        .delete_comment(task_id, comment_id, &user)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
