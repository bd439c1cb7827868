//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every handler and service returns `Result<_, AppError>`, and Actix Web turns the error
//! into a JSON `ErrorResponse` with the matching HTTP status.
//!
//! `From` implementations exist for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error` and `bcrypt::BcryptError`, so the `?` operator can be used
//! directly on those results.

use actix_web::{
    error::{JsonPayloadError, PathError, QueryPayloadError, ResponseError},
    http::StatusCode,
    HttpRequest, HttpResponse,
};
use std::collections::BTreeMap;
use std::fmt;
use validator::ValidationErrors;

use crate::dto::ErrorResponse;

/// Name of the unique constraint PostgreSQL generates for `users.email`.
const USERS_EMAIL_CONSTRAINT: &str = "users_email_key";

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Authentication is missing or invalid (HTTP 401).
    Unauthorized(String),
    /// The caller is authenticated but not allowed to perform the action (HTTP 403).
    Forbidden(String),
    /// Malformed request: unreadable body, bad query or path parameters (HTTP 400).
    BadRequest(String),
    /// The requested resource does not exist (HTTP 404).
    NotFound(String),
    /// The request conflicts with stored data, e.g. a duplicate email (HTTP 409).
    Conflict(String),
    /// Unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Error originating from the database driver (HTTP 500).
    /// The detail is logged but not sent to the client.
    DatabaseError(String),
    /// Field-level input validation failures, keyed by field name (HTTP 400).
    ValidationError(BTreeMap<String, String>),
}

impl AppError {
    fn client_message(&self) -> String {
        match self {
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::InternalServerError(msg) => msg.clone(),
            AppError::DatabaseError(_) => "Database error".to_string(),
            AppError::ValidationError(_) => "Validation failed".to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(errors) => {
                let fields: Vec<String> = errors
                    .iter()
                    .map(|(field, msg)| format!("{}: {}", field, msg))
                    .collect();
                write!(f, "Validation Error: {}", fields.join(", "))
            }
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into JSON `ErrorResponse` bodies.
///
/// Client errors are logged at `warn`, server errors at `error`.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::warn!("Request rejected: {}", self);
        }

        let mut body = ErrorResponse::new(self.client_message(), status.as_u16());
        if let AppError::ValidationError(errors) = self {
            body.errors = Some(errors.clone());
        }
        HttpResponse::build(status).json(body)
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`, integrity violations become `Conflict`
/// (with a dedicated message for duplicate emails), everything else is a `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db_err) => {
                if db_err.constraint() == Some(USERS_EMAIL_CONSTRAINT) {
                    AppError::Conflict("Email is already in use".into())
                } else if db_err.is_unique_violation()
                    || db_err.is_foreign_key_violation()
                    || db_err.is_check_violation()
                {
                    AppError::Conflict(format!("Data integrity violation: {}", db_err.message()))
                } else {
                    AppError::DatabaseError(error.to_string())
                }
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into a field map.
///
/// Each field keeps the message of its first failing rule, or the rule code when no
/// message was declared.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        let errors = error
            .field_errors()
            .into_iter()
            .filter_map(|(field, failures)| {
                failures.first().map(|failure| {
                    let message = failure
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| failure.code.to_string());
                    (field.to_string(), message)
                })
            })
            .collect();
        AppError::ValidationError(errors)
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        use jsonwebtoken::errors::ErrorKind;

        let message = match error.kind() {
            ErrorKind::ExpiredSignature => "Token has expired",
            ErrorKind::InvalidSignature | ErrorKind::InvalidToken => "Invalid token",
            _ => "Invalid token format",
        };
        log::debug!("Rejected token: {}", error);
        AppError::Unauthorized(message.to_string())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

/// Error handler for `web::Json` extraction, so malformed bodies get the JSON error shape.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid request body: {}", err)).into()
}

/// Error handler for `web::Query` extraction.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid query parameters: {}", err)).into()
}

/// Error handler for `web::Path` extraction.
pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid path parameter: {}", err)).into()
}
