use crate::{
    auth::{AuthenticationRequest, CurrentUser, RegisterRequest},
    error::AppError,
    service::AppState,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates an account and returns an access token. Administrators may create other
/// administrators by sending `"role": "ADMIN"` with their own token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = crate::auth::AuthenticationResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 409, description = "Email already in use", body = crate::dto::ErrorResponse)
    )
)]
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    caller: Option<CurrentUser>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let response = state
        .auth
        .register(register_data.into_inner(), caller.as_ref())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Sign in
///
/// Exchanges email and password for an access token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/authenticate",
    tag = "Authentication",
    request_body = AuthenticationRequest,
    responses(
        (status = 200, description = "Signed in", body = crate::auth::AuthenticationResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::dto::ErrorResponse)
    )
)]
#[post("/authenticate")]
pub async fn authenticate(
    state: web::Data<AppState>,
    login_data: web::Json<AuthenticationRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;
    let response = state.auth.authenticate(login_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    responses(
        (status = 200, description = "The signed-in user", body = crate::dto::UserShortDto),
        (status = 401, description = "Not authenticated", body = crate::dto::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/me")]
pub async fn me(state: web::Data<AppState>, user: CurrentUser) -> Result<impl Responder, AppError> {
    let dto = state.auth.current_user(&user.email).await?;
    Ok(HttpResponse::Ok().json(dto))
}

/// Sign out
///
/// Revokes every token of the caller, including the one used for this request.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Authentication",
    responses(
        (status = 204, description = "Signed out"),
        (status = 401, description = "Not authenticated", body = crate::dto::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[post("/logout")]
pub async fn logout(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    state.auth.logout(&user).await?;
    Ok(HttpResponse::NoContent().finish())
}
