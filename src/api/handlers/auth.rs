use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::dtos::requests::LoginRequest;
use crate::api::dtos::responses::{ApiResponse, LoginResponse, UserResponse};
use crate::api::extractors::{auth::AuthUser, json::JsonBody};
use crate::error::AppError;
use crate::state::AppState;

pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (token, user) = state.auth_service.authenticate(&payload.username, &payload.password).await?;
    let details = state.users.details(user).await?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Inicio de sesión exitoso".to_string(),
        token,
        user: details.into(),
    }))
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let details = state.users.get(user.id()).await?;
    Ok(Json(ApiResponse::ok(UserResponse::from(details))))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    state.auth_service.logout(&identity).await?;
    Ok(Json(ApiResponse::message("Sesión cerrada exitosamente")))
}
