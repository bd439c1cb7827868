use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use std::io;

use task_management::config::Config;
use task_management::error::{json_error_handler, path_error_handler, query_error_handler};
use task_management::repository::PgStore;
use task_management::routes::{self, health};
use task_management::service::bootstrap::ensure_first_admin;
use task_management::{cors, openapi, AppState};

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    log::error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    let store = PgStore::connect(&config.database_url)
        .await
        .map_err(|e| startup_error("Failed to connect to database", e))?;
    store
        .migrate()
        .await
        .map_err(|e| startup_error("Failed to migrate database", e))?;

    let state = web::Data::new(AppState::new(store, &config));
    ensure_first_admin(state.users().as_ref(), &config.first_admin, config.bcrypt_cost)
        .await
        .map_err(|e| startup_error("Failed to create first administrator", e))?;

    log::info!("Starting task management server at {}", config.server_url());

    let origins = config.cors_allowed_origins.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .wrap(cors::cors(&origins))
            .wrap(Logger::default())
            .service(health::health)
            .service(openapi::api_docs)
            .service(openapi::swagger_ui())
            .service(openapi::swagger_ui_redirect)
            .service(
                web::scope("/api")
                    .wrap(state.auth_middleware())
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
