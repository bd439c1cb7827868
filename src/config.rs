use std::env;
use std::fmt;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:*,https://mydomain.com";

/// Error raised when the environment does not describe a usable configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    Missing(&'static str),
    /// A variable is set but cannot be parsed.
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "{} has an invalid value: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Credentials for the administrator account created on first start.
#[derive(Debug, Clone)]
pub struct FirstAdminConfig {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    /// Seeding is skipped when no password is configured.
    pub password: Option<String>,
}

/// Application settings, read from the environment (and `.env` via `dotenv`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
    pub cache_ttl_seconds: u64,
    pub cache_max_entries: usize,
    pub cors_allowed_origins: Vec<String>,
    pub first_admin: FirstAdminConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));
        let or_default =
            |key: &'static str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            server_port: parse(&lookup, "SERVER_PORT", 8080)?,
            server_host: or_default("SERVER_HOST", "127.0.0.1"),
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration_hours: parse(&lookup, "JWT_EXPIRATION_HOURS", 24)?,
            bcrypt_cost: parse(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            cache_ttl_seconds: parse(&lookup, "CACHE_TTL_SECONDS", 600)?,
            cache_max_entries: parse(&lookup, "CACHE_MAX_ENTRIES", 100)?,
            cors_allowed_origins: or_default("CORS_ALLOWED_ORIGINS", DEFAULT_CORS_ORIGINS)
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            first_admin: FirstAdminConfig {
                firstname: or_default("FIRST_ADMIN_FIRSTNAME", "Admin"),
                lastname: or_default("FIRST_ADMIN_LASTNAME", "Admin"),
                email: or_default("FIRST_ADMIN_EMAIL", "admin@example.com"),
                password: lookup("FIRST_ADMIN_PASSWORD").filter(|p| !p.is_empty()),
            },
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
