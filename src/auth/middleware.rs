use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::extractors::{BearerToken, CurrentUser};
use crate::auth::token::JwtService;
use crate::error::AppError;
use crate::repository::{TokenRepository, UserRepository};

/// Paths reachable without a token.
const PUBLIC_PATHS: [&str; 2] = ["/api/v1/auth/register", "/api/v1/auth/authenticate"];

/// Authenticates requests carrying `Authorization: Bearer <jwt>`.
///
/// On success the request gets a [`CurrentUser`] and the raw [`BearerToken`] in its
/// extensions. Requests without a token are rejected unless the path is public.
#[derive(Clone)]
pub struct AuthMiddleware {
    jwt: JwtService,
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
}

impl AuthMiddleware {
    pub fn new(
        jwt: JwtService,
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenRepository>,
    ) -> Self {
        Self { jwt, users, tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            auth: self.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    auth: AuthMiddleware,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let auth = self.auth.clone();

        let bearer = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string());

        Box::pin(async move {
            match bearer {
                Some(token) => match auth.authenticate(&token).await {
                    Ok(user) => {
                        log::debug!("Authenticated {} for {}", user.email, req.path());
                        req.extensions_mut().insert(user);
                        req.extensions_mut().insert(BearerToken(token));
                    }
                    Err(err) => {
                        log::debug!("Rejected token for {}: {}", req.path(), err);
                        return Ok(req.error_response(err).map_into_right_body());
                    }
                },
                None if PUBLIC_PATHS.contains(&req.path()) => {
                    log::debug!("Anonymous request to {}", req.path());
                }
                None => {
                    log::debug!("Missing bearer token for {}", req.path());
                    let err = AppError::Unauthorized("Authentication required".into());
                    return Ok(req.error_response(err).map_into_right_body());
                }
            }
            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

impl AuthMiddleware {
    async fn authenticate(&self, token: &str) -> Result<CurrentUser, AppError> {
        let claims = self.jwt.parse_token(token)?;

        let user = self
            .users
            .find_by_email(&claims.sub)
            .await?
            .filter(|user| self.jwt.is_token_valid(&claims, user))
            .ok_or_else(|| AppError::Unauthorized("Invalid token".into()))?;

        let active = self
            .tokens
            .find_by_value(token)
            .await?
            .map(|record| record.is_active())
            .unwrap_or(false);
        if !active {
            return Err(AppError::Unauthorized("Token has been revoked".into()));
        }

        Ok(CurrentUser::from(&user))
    }
}
