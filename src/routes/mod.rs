pub mod auth;
pub mod comments;
pub mod health;
pub mod tasks;

use actix_web::web;

/// Registers every `/api` route. Mount inside a scope wrapped in `AuthMiddleware`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1/auth")
            .service(auth::register)
            .service(auth::authenticate)
            .service(auth::me)
            .service(auth::logout),
    )
    .service(
        web::scope("/v1/tasks")
            .service(tasks::create_task)
            .service(tasks::get_user_tasks)
            // before get_task so that "all" is not taken for an id
            .service(tasks::get_all_tasks)
            .service(tasks::assign_task)
            .service(tasks::delete_task_comment)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    )
    .service(
        web::scope("/v1/comments")
            .service(comments::get_task_comments)
            .service(comments::add_comment)
            .service(comments::get_comment)
            .service(comments::delete_comment),
    );
}
