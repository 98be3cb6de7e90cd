use std::sync::Arc;
use crate::domain::{
    models::{
        auth::{AuthRejection, Claims, Identity, RevokedToken},
        permissions::Permissions,
        user::User,
    },
    ports::{AuthRepository, ProfileRepository, UserRepository},
};
use crate::config::{Config, ConfigError};
use crate::error::{AppError, FieldError};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use uuid::Uuid;
use chrono::{DateTime, Duration, Utc};
use tracing::{error, info, warn};

pub const AUDIENCE: &str = "access-control-dashboard";

pub fn hash_password(plain: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalWithMsg(format!("password hashing failed: {e}")))
}

fn verify_password(plain: &str, stored_hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(stored_hash).map_err(|_| AppError::Internal)?;
    Ok(Argon2::default().verify_password(plain.as_bytes(), &parsed_hash).is_ok())
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    profiles: Arc<dyn ProfileRepository>,
    revoked: Arc<dyn AuthRepository>,
    config: Config,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    // Verified against for unknown usernames so both paths cost one argon2 run.
    dummy_hash: Option<String>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        profiles: Arc<dyn ProfileRepository>,
        revoked: Arc<dyn AuthRepository>,
        config: Config,
    ) -> Result<Self, ConfigError> {
        let encoding_key = EncodingKey::from_ed_pem(config.jwt_secret_key.as_bytes())?;
        let decoding_key = DecodingKey::from_ed_pem(config.jwt_public_key.as_bytes())?;
        let dummy_hash = hash_password(&Uuid::new_v4().to_string()).ok();

        Ok(Self { users, profiles, revoked, config, encoding_key, decoding_key, dummy_hash })
    }

    /// Checks credentials and issues a session token.
    ///
    /// Unknown, disabled and wrong-password logins are indistinguishable to
    /// the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<(String, User), AppError> {
        let username = username.trim();
        let mut errors = Vec::new();
        if username.is_empty() {
            errors.push(FieldError::new("username", "El usuario es requerido"));
        }
        if password.chars().count() < self.config.password_min_length {
            errors.push(FieldError::new(
                "password",
                format!("La contraseña debe tener al menos {} caracteres", self.config.password_min_length),
            ));
        }
        if !errors.is_empty() {
            return Err(AppError::fields("Datos de entrada inválidos", errors));
        }

        let candidate = self.users.find_by_username(username).await?;
        let mut user = match candidate {
            Some(user) if user.can_authenticate() => user,
            _ => {
                if let Some(dummy) = &self.dummy_hash {
                    let _ = verify_password(password, dummy);
                }
                warn!("Rejected login for unknown or disabled user '{}'", username);
                return Err(AuthRejection::InvalidCredentials.into());
            }
        };

        if !verify_password(password, &user.password_hash)? {
            warn!("Rejected login for user {}: wrong password", user.id);
            return Err(AuthRejection::InvalidCredentials.into());
        }

        let token = self.issue(&user)?;
        let now = Utc::now();
        self.users.touch_last_access(&user.id, now).await?;
        user.ultimo_acceso = Some(now);

        info!("User logged in: {}", user.id);
        Ok((token, user))
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = (now + Duration::hours(self.config.token_ttl_hours)).timestamp() as usize;

        let claims = Claims {
            iss: self.config.auth_issuer.clone(),
            sub: user.id.clone(),
            aud: AUDIENCE.to_string(),
            exp,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            username: user.username.clone(),
            rol_id: user.rol_id.clone(),
            perfil_id: user.perfil_id.clone(),
        };

        encode(&Header::new(Algorithm::EdDSA), &claims, &self.encoding_key).map_err(|e| {
            error!("JWT encoding failed: {}", e);
            AppError::Internal
        })
    }

    /// Resolves a bearer token into the caller's identity. The user row is
    /// re-read so deactivation takes effect before the token expires.
    pub async fn resolve(&self, token: &str) -> Result<Identity, AppError> {
        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_audience(&[AUDIENCE]);
        validation.set_issuer(&[self.config.auth_issuer.as_str()]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthRejection::ExpiredToken,
                _ => AuthRejection::InvalidToken,
            })?
            .claims;

        if self.revoked.is_revoked(&claims.jti).await? {
            return Err(AuthRejection::RevokedToken.into());
        }

        let user = self.users.find_by_id(&claims.sub).await?.ok_or(AuthRejection::UserNotFound)?;
        if !user.can_authenticate() {
            return Err(AuthRejection::UserInactive.into());
        }

        let permissions = match self.profiles.find_by_id(&user.perfil_id).await? {
            Some(profile) if profile.is_active => profile.permisos.0,
            _ => Permissions::default(),
        };

        Ok(Identity {
            user_id: user.id,
            username: user.username,
            rol_id: user.rol_id,
            perfil_id: user.perfil_id,
            estado: user.estado,
            permissions,
            token_id: claims.jti,
            expires_at: DateTime::from_timestamp(claims.exp as i64, 0).unwrap_or_else(Utc::now),
        })
    }

    /// Revokes the token behind `identity` and drops revocations that have
    /// outlived their token.
    pub async fn logout(&self, identity: &Identity) -> Result<(), AppError> {
        self.revoked
            .revoke(&RevokedToken {
                jti: identity.token_id.clone(),
                user_id: identity.user_id.clone(),
                expires_at: identity.expires_at,
            })
            .await?;

        let purged = self.revoked.purge_expired(Utc::now()).await?;
        info!("User {} logged out ({} expired revocations purged)", identity.user_id, purged);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("admin123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("admin123", &hash).unwrap());
        assert!(!verify_password("admin124", &hash).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_internal_error() {
        assert!(matches!(verify_password("x", "not-a-phc-string"), Err(AppError::Internal)));
    }
}
