//! OpenAPI document served at `/v3/api-docs`, browsable through Swagger UI at `/swagger-ui/`.

use actix_web::{get, http::header, HttpResponse, Responder};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::{Config as SwaggerConfig, SwaggerUi};

use crate::auth::{AuthenticationRequest, AuthenticationResponse, RegisterRequest};
use crate::dto::{
    CommentDto, CommentPage, ErrorResponse, TaskDto, TaskPage, TaskShortDto, UserShortDto,
};
use crate::models::{CommentInput, Priority, Role, TaskInput, TaskStatus};
use crate::routes::{auth, comments, health, tasks};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Task Management API",
        version = "1.0",
        description = "Tasks, assignments and comments with JWT authentication."
    ),
    paths(
        health::health,
        auth::register,
        auth::authenticate,
        auth::me,
        auth::logout,
        tasks::create_task,
        tasks::assign_task,
        tasks::get_all_tasks,
        tasks::get_task,
        tasks::get_user_tasks,
        tasks::update_task,
        tasks::delete_task,
        tasks::delete_task_comment,
        comments::add_comment,
        comments::get_comment,
        comments::get_task_comments,
        comments::delete_comment,
    ),
    components(schemas(
        health::HealthStatus,
        RegisterRequest,
        AuthenticationRequest,
        AuthenticationResponse,
        UserShortDto,
        TaskShortDto,
        TaskDto,
        TaskPage,
        CommentDto,
        CommentPage,
        TaskInput,
        CommentInput,
        TaskStatus,
        Priority,
        Role,
        ErrorResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and sign-in"),
        (name = "Tasks", description = "Task management"),
        (name = "Comments", description = "Task comments"),
        (name = "Health", description = "Liveness")
    )
)]
pub struct ApiDoc;

const API_DOCS_PATH: &str = "/v3/api-docs";

#[get("/v3/api-docs")]
pub async fn api_docs() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Swagger UI loading the document from [`api_docs`].
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui/{_:.*}").config(SwaggerConfig::new([API_DOCS_PATH]))
}

#[get("/swagger-ui.html")]
pub async fn swagger_ui_redirect() -> impl Responder {
    HttpResponse::PermanentRedirect()
        .insert_header((header::LOCATION, "/swagger-ui/"))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test as actix_test, App};

    #[test]
    fn test_document_lists_routes_and_security() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();

        assert_eq!(doc["info"]["title"], "Task Management API");
        assert!(doc["paths"]["/api/v1/tasks/{taskId}"]["put"].is_object());
        assert!(doc["paths"]["/api/v1/comments/task/{taskId}"]["get"].is_object());
        assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
        assert!(doc["components"]["schemas"]["TaskPage"].is_object());
    }

    #[actix_rt::test]
    async fn test_api_docs_endpoint() {
        let app = actix_test::init_service(App::new().service(api_docs)).await;
        let req = actix_test::TestRequest::get().uri("/v3/api-docs").to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        let json: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(json["info"]["version"], "1.0");
    }

    #[actix_rt::test]
    async fn test_swagger_ui_points_at_api_docs() {
        let app = actix_test::init_service(
            App::new()
                .service(api_docs)
                .service(swagger_ui())
                .service(swagger_ui_redirect),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/swagger-ui/").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = actix_test::TestRequest::get()
            .uri("/swagger-ui/swagger-initializer.js")
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        assert!(String::from_utf8_lossy(&body).contains(API_DOCS_PATH));

        let req = actix_test::TestRequest::get().uri("/swagger-ui.html").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::PERMANENT_REDIRECT);
        assert_eq!(
            resp.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
            Some("/swagger-ui/")
        );
    }
}
