use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Kind of an issued token. Only bearer tokens exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "token_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    #[default]
    Bearer,
}

/// Record of an issued JWT, used to revoke tokens before they expire.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Token {
    pub id: i64,
    pub token_value: String,
    pub token_type: TokenType,
    pub revoked: bool,
    pub expired: bool,
    pub user_id: i64,
}

impl Token {
    /// A token can authenticate requests only while neither revoked nor expired.
    pub fn is_active(&self) -> bool {
        !self.revoked && !self.expired
    }
}

#[derive(Debug, Clone)]
pub struct NewToken {
    pub token_value: String,
    pub token_type: TokenType,
    pub user_id: i64,
}

impl NewToken {
    pub fn bearer(token_value: String, user_id: i64) -> Self {
        Self {
            token_value,
            token_type: TokenType::default(),
            user_id,
        }
    }
}
