use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

use super::permissions::Permissions;
use super::user::UserStatus;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
    pub username: String,
    pub rol_id: String,
    pub perfil_id: String,
}

/// Why an inbound request could not be authenticated.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    #[error("Token de autenticación requerido")]
    MissingToken,
    #[error("Token inválido")]
    InvalidToken,
    #[error("Token expirado")]
    ExpiredToken,
    #[error("Token revocado")]
    RevokedToken,
    #[error("Usuario no encontrado")]
    UserNotFound,
    #[error("Usuario inactivo")]
    UserInactive,
    #[error("Credenciales inválidas")]
    InvalidCredentials,
}

/// The caller resolved from a valid bearer token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
    pub rol_id: String,
    pub perfil_id: String,
    pub estado: UserStatus,
    pub permissions: Permissions,
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RevokedToken {
    pub jti: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}
