use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header::AUTHORIZATION, request::Parts},
};
use crate::state::AppState;
use crate::domain::models::auth::{AuthRejection, Identity};
use crate::domain::models::permissions::{Action, Module};
use crate::domain::services::authorization::can_access;
use crate::error::AppError;
use std::sync::Arc;
use tracing::{warn, Span};

/// The authenticated caller, resolved from an `Authorization: Bearer` header.
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthRejection::MissingToken)?;

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let identity = app_state.auth_service.resolve(token).await?;

        Span::current().record("user_id", identity.user_id.as_str());

        Ok(AuthUser(identity))
    }
}

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.0.user_id
    }

    /// Fails with 403 unless the caller's profile grants `action` on `module`.
    pub fn require(&self, module: Module, action: Action) -> Result<(), AppError> {
        if can_access(&self.0.permissions, module, action) {
            return Ok(());
        }
        warn!("User {} denied {} on {}", self.0.user_id, action, module);
        Err(AppError::Forbidden("No tienes permisos para realizar esta acción".into()))
    }
}
