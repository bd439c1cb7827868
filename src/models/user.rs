use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;

/// Authority granted to a user.
/// Corresponds to the `user_role` SQL enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role")]
pub enum Role {
    /// Regular user: manages own tasks and comments.
    #[sqlx(rename = "ROLE_USER")]
    #[serde(rename = "ROLE_USER")]
    User,
    /// Administrator: may assign tasks, list every task and moderate content.
    #[sqlx(rename = "ROLE_ADMIN")]
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered account as stored in the `users` table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    /// Bcrypt hash; the plain password is never stored.
    pub password_hash: String,
    pub role: Role,
}

/// Values for inserting a user. The id is generated by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"ROLE_USER\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ROLE_ADMIN\"");

        let parsed: Role = serde_json::from_str("\"ROLE_ADMIN\"").unwrap();
        assert_eq!(parsed, Role::Admin);
        assert_eq!(Role::Admin.to_string(), "ROLE_ADMIN");
    }
}
