pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

pub use extractors::{BearerToken, CurrentUser};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, JwtService};

lazy_static! {
    static ref ROLE_REGEX: regex::Regex = regex::Regex::new(r"^(ADMIN|USER)$").unwrap();
}

/// At least 6 ASCII letters or digits, containing at least one of each.
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let allowed = password.chars().all(|c| c.is_ascii_alphanumeric());
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if password.len() >= 6 && allowed && has_letter && has_digit {
        Ok(())
    } else {
        let mut error = ValidationError::new("password_strength");
        error.message = Some(
            "Password must be at least 6 characters long and contain letters and digits".into(),
        );
        Err(error)
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.message = Some("Must not be blank".into());
        Err(error)
    } else {
        Ok(())
    }
}

/// Payload for creating an account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(custom = "validate_not_blank")]
    pub firstname: String,
    #[validate(custom = "validate_not_blank")]
    pub lastname: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(custom = "validate_password_strength")]
    pub password: String,
    /// `ADMIN` or `USER`. Only honoured for administrators; defaults to `USER`.
    #[validate(regex(path = "ROLE_REGEX", message = "Role must be ADMIN or USER"))]
    #[serde(default)]
    pub role: Option<String>,
}

impl RegisterRequest {
    pub fn wants_admin(&self) -> bool {
        self.role.as_deref() == Some("ADMIN")
    }
}

/// Payload for signing in.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AuthenticationRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

/// Returned by registration and sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticationResponse {
    pub token: String,
}
