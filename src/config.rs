use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::models::visit::CancelPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
    #[error("Invalid JWT key material: {0}")]
    Key(#[from] jsonwebtoken::errors::Error),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub environment: String,
    pub jwt_secret_key: String, // Ed25519 private key (PEM)
    pub jwt_public_key: String, // Ed25519 public key (PEM)
    pub auth_issuer: String,
    pub token_ttl_hours: i64,
    pub password_min_length: usize,
    pub cancel_policy: CancelPolicy,
    pub frontend_url: String,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port: parsed("PORT", 3001)?,
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            jwt_secret_key: required("JWT_SECRET_KEY")?,
            jwt_public_key: required("JWT_PUBLIC_KEY")?,
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://api.control-acceso.local".to_string()),
            token_ttl_hours: parsed("TOKEN_TTL_HOURS", 24)?,
            password_min_length: parsed("PASSWORD_MIN_LENGTH", 6)?,
            cancel_policy: parsed("VISIT_CANCEL_POLICY", CancelPolicy::Strict)?,
            frontend_url: env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty()),
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
