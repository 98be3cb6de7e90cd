//! Handlers shared by `/api/visitas` and `/api/visitas-externas`. Each route is
//! mounted once per record type, e.g. `get(visit::list::<Visit>)`.

use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::dtos::requests::VisitListQuery;
use crate::api::dtos::responses::{ApiResponse, PaginatedResponse};
use crate::api::extractors::{auth::AuthUser, json::{ApiQuery, JsonBody}};
use crate::domain::models::external_visit::ExternalVisit;
use crate::domain::models::permissions::{Action, Module};
use crate::domain::models::visit::{CheckIn, Visit};
use crate::domain::services::visit_lifecycle::VisitLifecycle;
use crate::error::AppError;
use crate::state::AppState;

/// Binds a check-in record type to its permission module and service.
pub trait VisitResource: CheckIn {
    const MODULE: Module;
    const CREATED: &'static str;
    const UPDATED: &'static str;
    const EXITED: &'static str;
    const CANCELLED: &'static str;
    const DELETED: &'static str;

    fn lifecycle(state: &AppState) -> &VisitLifecycle<Self>;
}

impl VisitResource for Visit {
    const MODULE: Module = Module::Visits;
    const CREATED: &'static str = "Visita registrada exitosamente";
    const UPDATED: &'static str = "Visita actualizada exitosamente";
    const EXITED: &'static str = "Salida registrada exitosamente";
    const CANCELLED: &'static str = "Visita cancelada exitosamente";
    const DELETED: &'static str = "Visita eliminada exitosamente";

    fn lifecycle(state: &AppState) -> &VisitLifecycle<Self> {
        &state.visits
    }
}

impl VisitResource for ExternalVisit {
    const MODULE: Module = Module::ExternalVisits;
    const CREATED: &'static str = "Visita externa registrada exitosamente";
    const UPDATED: &'static str = "Visita externa actualizada exitosamente";
    const EXITED: &'static str = "Salida de visita externa registrada exitosamente";
    const CANCELLED: &'static str = "Visita externa cancelada exitosamente";
    const DELETED: &'static str = "Visita externa eliminada exitosamente";

    fn lifecycle(state: &AppState) -> &VisitLifecycle<Self> {
        &state.external_visits
    }
}

pub async fn list<T: VisitResource>(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<VisitListQuery>,
) -> Result<impl IntoResponse, AppError> {
    user.require(T::MODULE, Action::Read)?;
    let page = T::lifecycle(&state).list(&query.into_filter()?).await?;
    Ok(Json(PaginatedResponse::from(page)))
}

pub async fn get<T: VisitResource>(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require(T::MODULE, Action::Read)?;
    Ok(Json(ApiResponse::ok(T::lifecycle(&state).get(&id).await?)))
}

pub async fn create<T: VisitResource>(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    JsonBody(payload): JsonBody<T::Draft>,
) -> Result<impl IntoResponse, AppError> {
    user.require(T::MODULE, Action::Write)?;
    let created = T::lifecycle(&state).create(payload, user.id()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::with_message(T::CREATED, created))))
}

pub async fn update<T: VisitResource>(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<T::Patch>,
) -> Result<impl IntoResponse, AppError> {
    user.require(T::MODULE, Action::Write)?;
    let updated = T::lifecycle(&state).update(&id, payload, user.id()).await?;
    Ok(Json(ApiResponse::with_message(T::UPDATED, updated)))
}

pub async fn register_exit<T: VisitResource>(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require(T::MODULE, Action::Write)?;
    let updated = T::lifecycle(&state).register_exit(&id, user.id()).await?;
    Ok(Json(ApiResponse::with_message(T::EXITED, updated)))
}

pub async fn cancel<T: VisitResource>(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require(T::MODULE, Action::Write)?;
    let updated = T::lifecycle(&state).cancel(&id, user.id()).await?;
    Ok(Json(ApiResponse::with_message(T::CANCELLED, updated)))
}

pub async fn delete<T: VisitResource>(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require(T::MODULE, Action::Write)?;
    T::lifecycle(&state).delete(&id).await?;
    Ok(Json(ApiResponse::message(T::DELETED)))
}

pub async fn statistics<T: VisitResource>(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    user.require(T::MODULE, Action::Read)?;
    Ok(Json(ApiResponse::ok(T::lifecycle(&state).statistics().await?)))
}
