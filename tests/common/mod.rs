#![allow(dead_code)]

use actix_web::{test, web};
use serde_json::{json, Value};
use task_management::config::Config;
use task_management::repository::MemoryStore;
use task_management::service::bootstrap::ensure_first_admin;
use task_management::AppState;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin123";

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://unused".into()),
        "JWT_SECRET" => Some("integration_test_secret".into()),
        "BCRYPT_COST" => Some("4".into()),
        "FIRST_ADMIN_PASSWORD" => Some(ADMIN_PASSWORD.into()),
        _ => None,
    })
    .unwrap()
}

/// Application state over an empty in-memory store, with the first administrator seeded.
pub async fn test_state() -> web::Data<AppState> {
    let config = test_config();
    let state = web::Data::new(AppState::new(MemoryStore::new(), &config));
    ensure_first_admin(state.users().as_ref(), &config.first_admin, config.bcrypt_cost)
        .await
        .unwrap();
    state
}

/// Builds the full application (error handlers, public routes, authenticated `/api` scope).
macro_rules! test_app {
    ($state:expr) => {{
        let state: actix_web::web::Data<task_management::AppState> = $state;
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(state.clone())
                .app_data(
                    actix_web::web::JsonConfig::default()
                        .error_handler(task_management::error::json_error_handler),
                )
                .app_data(
                    actix_web::web::QueryConfig::default()
                        .error_handler(task_management::error::query_error_handler),
                )
                .app_data(
                    actix_web::web::PathConfig::default()
                        .error_handler(task_management::error::path_error_handler),
                )
                .wrap(actix_web::middleware::Logger::default())
                .service(task_management::routes::health::health)
                .service(task_management::openapi::api_docs)
                .service(task_management::openapi::swagger_ui())
                .service(task_management::openapi::swagger_ui_redirect)
                .service(
                    actix_web::web::scope("/api")
                        .wrap(state.auth_middleware())
                        .configure(task_management::routes::config),
                ),
        )
        .await
    }};
}

pub struct TestUser {
    pub id: i64,
    pub token: String,
}

pub async fn register_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    firstname: &str,
) -> TestUser {
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "firstname": firstname,
            "lastname": "Tester",
            "email": email,
            "password": "secret42"
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert!(resp.status().is_success(), "Failed to register {}", email);
    let body: Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().unwrap().to_string();

    let me = whoami(app, &token).await;
    TestUser {
        id: me["id"].as_i64().unwrap(),
        token,
    }
}

pub async fn sign_in(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> TestUser {
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/authenticate")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert!(resp.status().is_success(), "Failed to sign in {}", email);
    let body: Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().unwrap().to_string();

    let me = whoami(app, &token).await;
    TestUser {
        id: me["id"].as_i64().unwrap(),
        token,
    }
}

pub async fn whoami(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    token: &str,
) -> Value {
    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(bearer(token))
        .to_request();
    test::call_and_read_body_json(app, req).await
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (
        actix_web::http::header::AUTHORIZATION,
        format!("Bearer {}", token),
    )
}
