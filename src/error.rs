use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::error;

use crate::config::ConfigError;
use crate::domain::models::auth::AuthRejection;
use crate::domain::models::visit::TransitionError;

static EXPOSE_ERROR_DETAIL: OnceLock<bool> = OnceLock::new();

/// Set once at startup. 500 bodies carry the underlying error only when enabled.
pub fn expose_error_detail(enabled: bool) {
    let _ = EXPOSE_ERROR_DETAIL.set(enabled);
}

// SQLSTATE 22001, value too long for its column.
fn is_truncation(db: &dyn sqlx::error::DatabaseError) -> bool {
    db.code().as_deref() == Some("22001")
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self { field: field.to_string(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] AuthRejection),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Invalid input: {message}")]
    InvalidFields { message: String, errors: Vec<FieldError> },
    #[error("Invalid state transition: {0}")]
    Transition(#[from] TransitionError),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

/// Failures while starting the service, before any request is served.
#[derive(Error, Debug)]
pub enum BootError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Seeding default data failed: {0}")]
    Seed(#[from] AppError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn fields(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        AppError::InvalidFields { message: message.into(), errors }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(e) => match e.as_database_error() {
                Some(db) if db.is_unique_violation() || db.is_foreign_key_violation() || is_truncation(db) => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            // Duplicates keep the 400 the dashboard already handles.
            AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) | AppError::InvalidFields { .. } => StatusCode::BAD_REQUEST,
            AppError::Transition(_) => StatusCode::BAD_REQUEST,
            AppError::Internal | AppError::InternalWithMsg(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let detail = EXPOSE_ERROR_DETAIL.get().copied().unwrap_or(false);
        self.render(detail)
    }
}

impl AppError {
    fn render(self, detail: bool) -> Response {
        let status = self.status();
        let mut errors = None;

        let message = match &self {
            AppError::Database(e) => match e.as_database_error() {
                Some(db) if db.is_unique_violation() => "El registro ya existe (entrada duplicada)".to_string(),
                Some(db) if db.is_foreign_key_violation() => {
                    "Referencia inválida: el rol, perfil o usuario indicado no existe".to_string()
                }
                Some(db) if is_truncation(db) => "Un campo excede la longitud permitida".to_string(),
                _ => {
                    error!("Database error: {:?}", e);
                    "Error interno del servidor".to_string()
                }
            },
            AppError::NotFound(msg) => msg.clone(),
            AppError::Unauthorized(rejection) => rejection.to_string(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::InvalidFields { message, errors: list } => {
                errors = Some(list.clone());
                message.clone()
            }
            AppError::Transition(e) => e.to_string(),
            AppError::Internal => "Error interno del servidor".to_string(),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                "Error interno del servidor".to_string()
            }
        };

        let mut body = json!({
            "success": false,
            "message": message,
        });

        if let Some(errors) = errors {
            body["errors"] = json!(errors);
        }

        if detail && status == StatusCode::INTERNAL_SERVER_ERROR {
            body["error"] = json!(self.to_string());
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized(AuthRejection::MissingToken).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Transition(TransitionError::AlreadyExited).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_internal_detail_only_when_enabled() {
        let err = AppError::InternalWithMsg("pool timed out".into());
        let body = body_of(err.render(false)).await;
        assert_eq!(body["message"], "Error interno del servidor");
        assert!(body.get("error").is_none());

        let err = AppError::InternalWithMsg("pool timed out".into());
        let body = body_of(err.render(true)).await;
        assert_eq!(body["error"], "Internal server error: pool timed out");
    }

    #[tokio::test]
    async fn test_field_errors_are_listed_in_body() {
        let err = AppError::fields(
            "Datos de entrada inválidos",
            vec![FieldError::new("username", "El usuario es requerido")],
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"][0]["field"], "username");
    }
}
