use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::dtos::requests::ResidentListQuery;
use crate::api::dtos::responses::{ApiResponse, PaginatedResponse};
use crate::api::extractors::{auth::AuthUser, json::{ApiQuery, JsonBody}};
use crate::domain::models::permissions::{Action, Module};
use crate::domain::models::resident::{ResidentDraft, ResidentPatch};
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_residents(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<ResidentListQuery>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Module::Residents, Action::Read)?;
    let page = state.residents.list(&query.into_filter()?).await?;
    Ok(Json(PaginatedResponse::from(page)))
}

pub async fn get_resident(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Module::Residents, Action::Read)?;
    Ok(Json(ApiResponse::ok(state.residents.get(&id).await?)))
}

pub async fn create_resident(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    JsonBody(payload): JsonBody<ResidentDraft>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Module::Residents, Action::Write)?;
    let created = state.residents.create(payload, user.id()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::with_message("Residente creado exitosamente", created))))
}

pub async fn update_resident(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<ResidentPatch>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Module::Residents, Action::Write)?;
    let updated = state.residents.update(&id, payload, user.id()).await?;
    Ok(Json(ApiResponse::with_message("Residente actualizado exitosamente", updated)))
}

pub async fn delete_resident(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Module::Residents, Action::Write)?;
    state.residents.delete(&id).await?;
    Ok(Json(ApiResponse::message("Residente eliminado exitosamente")))
}

pub async fn residents_by_departamento(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(departamento): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Module::Residents, Action::Read)?;
    Ok(Json(ApiResponse::ok(state.residents.list_by_departamento(&departamento).await?)))
}

pub async fn resident_statistics(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    user.require(Module::Residents, Action::Read)?;
    Ok(Json(ApiResponse::ok(state.residents.statistics().await?)))
}
