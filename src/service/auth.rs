use std::sync::Arc;

use crate::auth::{
    hash_password, verify_password, AuthenticationRequest, AuthenticationResponse, CurrentUser,
    JwtService, RegisterRequest,
};
use crate::dto::UserShortDto;
use crate::error::AppError;
use crate::models::{NewToken, NewUser, Role, User};
use crate::repository::{TokenRepository, UserRepository};

/// Registration, sign-in and sign-out.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
    jwt: JwtService,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenRepository>,
        jwt: JwtService,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            tokens,
            jwt,
            bcrypt_cost,
        }
    }

    /// Creates an account and signs it in.
    ///
    /// The new account is an administrator only when `ADMIN` was requested by a caller who
    /// is an administrator; otherwise the requested role is ignored.
    pub async fn register(
        &self,
        request: RegisterRequest,
        caller: Option<&CurrentUser>,
    ) -> Result<AuthenticationResponse, AppError> {
        let role = if request.wants_admin() && caller.map_or(false, CurrentUser::is_admin) {
            Role::Admin
        } else {
            Role::User
        };

        let user = self
            .users
            .insert(NewUser {
                firstname: request.firstname,
                lastname: request.lastname,
                email: request.email,
                password_hash: hash_password(&request.password, self.bcrypt_cost)?,
                role,
            })
            .await?;
        log::info!("Registered user {} as {}", user.email, user.role);

        self.issue_token(&user).await
    }

    pub async fn authenticate(
        &self,
        request: AuthenticationRequest,
    ) -> Result<AuthenticationResponse, AppError> {
        let user = match self.users.find_by_email(&request.email).await? {
            Some(user) if verify_password(&request.password, &user.password_hash)? => user,
            _ => {
                log::warn!("Failed sign-in attempt for {}", request.email);
                return Err(AppError::Unauthorized("Invalid credentials".into()));
            }
        };
        log::info!("User {} signed in", user.email);

        self.issue_token(&user).await
    }

    pub async fn current_user(&self, email: &str) -> Result<UserShortDto, AppError> {
        self.users
            .find_by_email(email)
            .await?
            .map(|user| UserShortDto::from(&user))
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    /// Revokes every token the user holds.
    pub async fn logout(&self, user: &CurrentUser) -> Result<(), AppError> {
        let revoked = self.tokens.revoke_all_for_user(user.id).await?;
        log::info!("User {} signed out, {} token(s) revoked", user.email, revoked);
        Ok(())
    }

    async fn issue_token(&self, user: &User) -> Result<AuthenticationResponse, AppError> {
        let token = self.jwt.generate_token(user)?;
        self.tokens
            .insert(NewToken::bearer(token.clone(), user.id))
            .await?;
        Ok(AuthenticationResponse { token })
    }
}
