use chrono::NaiveDate;
use serde::Deserialize;
use std::str::FromStr;

use crate::domain::models::pagination::PageRequest;
use crate::domain::models::resident::{ResidentFilter, ResidentStatus, ResidentType};
use crate::domain::models::user::{UserFilter, UserStatus};
use crate::domain::models::visit::{VisitFilter, VisitState};
use crate::error::{AppError, FieldError};

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub estado: Option<String>,
}

impl UpdateStatusRequest {
    pub fn status(self) -> Result<UserStatus, AppError> {
        self.estado
            .as_deref()
            .map(str::trim)
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| {
                AppError::fields(
                    "Estado inválido",
                    vec![FieldError::new("estado", "Debe ser activo, inactivo, bloqueado o pendiente")],
                )
            })
    }
}

/// Blank values and the `todos` sentinel mean "no filter".
fn filter_value(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("todos"))
}

fn parse_filter<T: FromStr>(field: &str, value: Option<String>) -> Result<Option<T>, AppError> {
    match filter_value(value) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("Valor inválido para el filtro {field}: {v}"))),
    }
}

#[derive(Deserialize, Default)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub rol_id: Option<String>,
    pub estado: Option<String>,
}

impl UserListQuery {
    pub fn into_filter(self) -> Result<UserFilter, AppError> {
        Ok(UserFilter {
            page: PageRequest::new(self.page, self.limit),
            estado: parse_filter::<UserStatus>("estado", self.estado)?,
            search: filter_value(self.search),
            rol_id: filter_value(self.rol_id),
        })
    }
}

#[derive(Deserialize, Default)]
pub struct ResidentListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub estado: Option<String>,
    pub tipo: Option<String>,
}

impl ResidentListQuery {
    pub fn into_filter(self) -> Result<ResidentFilter, AppError> {
        Ok(ResidentFilter {
            page: PageRequest::new(self.page, self.limit),
            estado: parse_filter::<ResidentStatus>("estado", self.estado)?,
            tipo: parse_filter::<ResidentType>("tipo", self.tipo)?,
            search: filter_value(self.search),
        })
    }
}

#[derive(Deserialize, Default)]
pub struct VisitListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub estado: Option<String>,
    pub fecha: Option<String>,
}

impl VisitListQuery {
    pub fn into_filter(self) -> Result<VisitFilter, AppError> {
        let fecha = match filter_value(self.fecha) {
            None => None,
            Some(v) => Some(
                NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                    .map_err(|_| AppError::Validation(format!("Fecha inválida: {v}, use el formato YYYY-MM-DD")))?,
            ),
        };

        Ok(VisitFilter {
            page: PageRequest::new(self.page, self.limit),
            estado: parse_filter::<VisitState>("estado", self.estado)?,
            search: filter_value(self.search),
            fecha,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todos_and_blank_mean_no_filter() {
        let query = VisitListQuery {
            estado: Some("todos".into()),
            search: Some("  ".into()),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.estado, None);
        assert_eq!(filter.search, None);
        assert_eq!(filter.page, PageRequest::default());
    }

    #[test]
    fn test_unknown_filter_values_are_rejected() {
        let query = ResidentListQuery { tipo: Some("visitante".into()), ..Default::default() };
        assert!(matches!(query.into_filter(), Err(AppError::Validation(_))));

        let query = VisitListQuery { fecha: Some("18/10/2026".into()), ..Default::default() };
        assert!(matches!(query.into_filter(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_visit_day_filter() {
        let query = VisitListQuery {
            fecha: Some("2026-10-18".into()),
            estado: Some("salida".into()),
            page: Some(2),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.fecha, NaiveDate::from_ymd_opt(2026, 10, 18));
        assert_eq!(filter.estado, Some(VisitState::Salida));
        assert_eq!(filter.page.offset(), 10);
    }

    #[test]
    fn test_status_request_accepts_alias() {
        let request = UpdateStatusRequest { estado: Some("suspendido".into()) };
        assert_eq!(request.status().unwrap(), UserStatus::Bloqueado);
        assert!(UpdateStatusRequest { estado: None }.status().is_err());
    }
}
