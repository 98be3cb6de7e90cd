use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::dtos::requests::{UpdateStatusRequest, UserListQuery};
use crate::api::dtos::responses::{ApiResponse, PaginatedResponse, UserResponse};
use crate::api::extractors::{auth::AuthUser, json::{ApiQuery, JsonBody}};
use crate::domain::models::permissions::{Action, Module};
use crate::domain::models::user::{UserDraft, UserPatch};
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Module::Users, Action::Read)?;
    let page = state.users.list(&query.into_filter()?).await?;
    Ok(Json(PaginatedResponse::from(page.map(UserResponse::from))))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Module::Users, Action::Read)?;
    let details = state.users.get(&id).await?;
    Ok(Json(ApiResponse::ok(UserResponse::from(details))))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    JsonBody(payload): JsonBody<UserDraft>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Module::Users, Action::Write)?;
    let created = state.users.create(payload, user.id()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Usuario creado exitosamente", UserResponse::from(created))),
    ))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UserPatch>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Module::Users, Action::Write)?;
    let updated = state.users.update(&id, payload, user.id()).await?;
    Ok(Json(ApiResponse::with_message("Usuario actualizado exitosamente", UserResponse::from(updated))))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Module::Users, Action::Write)?;
    let updated = state.users.set_status(&id, payload.status()?, user.id()).await?;
    Ok(Json(ApiResponse::with_message("Estado del usuario actualizado", UserResponse::from(updated))))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Module::Users, Action::Write)?;
    state.users.delete(&id, user.id()).await?;
    Ok(Json(ApiResponse::message("Usuario eliminado exitosamente")))
}

pub async fn list_roles(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    user.require(Module::Users, Action::Read)?;
    Ok(Json(ApiResponse::ok(state.users.roles().await?)))
}

pub async fn list_profiles(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    user.require(Module::Users, Action::Read)?;
    Ok(Json(ApiResponse::ok(state.users.profiles().await?)))
}
