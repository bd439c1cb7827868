use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Role, User};

/// Claims carried by every access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Email of the user the token was issued to.
    pub sub: String,
    pub role: Role,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiration, seconds since epoch.
    pub exp: i64,
    /// Unique token id, so two tokens issued in the same second still differ.
    pub jti: String,
}

/// Issues and verifies HS256 access tokens.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn new(secret: &str, lifetime_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::hours(lifetime_hours),
        }
    }

    pub fn generate_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        self.encode_claims(&claims)
    }

    /// Checks signature and expiry and returns the claims.
    pub fn parse_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }

    pub fn is_token_valid(&self, claims: &Claims, user: &User) -> bool {
        claims.sub == user.email
    }

    pub(crate) fn encode_claims(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 1,
            firstname: "Olga".into(),
            lastname: "Ivanova".into(),
            email: "olga@example.com".into(),
            password_hash: "hash".into(),
            role: Role::Admin,
        }
    }

    #[test]
    fn test_token_generation_and_verification() {
        let jwt = JwtService::new("test_secret", 24);
        let token = jwt.generate_token(&user()).unwrap();
        let claims = jwt.parse_token(&token).unwrap();

        assert_eq!(claims.sub, "olga@example.com");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert!(jwt.is_token_valid(&claims, &user()));

        let mut other = user();
        other.email = "someone@example.com".into();
        assert!(!jwt.is_token_valid(&claims, &other));
    }

    #[test]
    fn test_tokens_are_unique() {
        let jwt = JwtService::new("test_secret", 24);
        let first = jwt.generate_token(&user()).unwrap();
        let second = jwt.generate_token(&user()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_expired_token() {
        let jwt = JwtService::new("test_secret", 24);
        let now = Utc::now().timestamp();
        let token = jwt
            .encode_claims(&Claims {
                sub: "olga@example.com".into(),
                role: Role::User,
                iat: now - 7200,
                exp: now - 3600,
                jti: Uuid::new_v4().to_string(),
            })
            .unwrap();

        assert_eq!(
            jwt.parse_token(&token).unwrap_err(),
            AppError::Unauthorized("Token has expired".into())
        );
    }

    #[test]
    fn test_invalid_token_signature() {
        let issuer = JwtService::new("one_secret", 24);
        let verifier = JwtService::new("a_completely_different_secret", 24);
        let token = issuer.generate_token(&user()).unwrap();

        assert_eq!(
            verifier.parse_token(&token).unwrap_err(),
            AppError::Unauthorized("Invalid token".into())
        );
    }

    #[test]
    fn test_malformed_token() {
        let jwt = JwtService::new("test_secret", 24);
        let err = jwt.parse_token("not-a-jwt").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
