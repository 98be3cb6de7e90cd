use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use super::fields::{max_lens, optional, patch_optional, patch_required, required, search_key};
use super::pagination::PageRequest;
use crate::error::FieldError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "visit_estado", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VisitState {
    Ingreso,
    Salida,
    Cancelada,
}

impl FromStr for VisitState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ingreso" => Ok(VisitState::Ingreso),
            "salida" => Ok(VisitState::Salida),
            "cancelada" => Ok(VisitState::Cancelada),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("La visita ya tiene registrada una salida")]
    AlreadyExited,
    #[error("La visita ya está cancelada")]
    AlreadyCancelled,
    #[error("La visita está cancelada y no admite registrar salida")]
    VisitCancelled,
    #[error("La visita ya tiene registrada una salida y no puede cancelarse")]
    ExitRecorded,
    #[error("Transición de estado no permitida")]
    NotAllowed,
}

/// Whether a visit that already exited may still be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelPolicy {
    #[default]
    Strict,
    Permissive,
}

impl FromStr for CancelPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(CancelPolicy::Strict),
            "permissive" => Ok(CancelPolicy::Permissive),
            _ => Err(()),
        }
    }
}

/// A guarded state change: applied only while the row is in one of `from`.
#[derive(Debug, Clone)]
pub struct Transition {
    pub from: &'static [VisitState],
    pub to: VisitState,
    pub stamps_exit: bool,
    pub actor: String,
    pub at: DateTime<Utc>,
}

impl Transition {
    pub fn exit(actor: &str, at: DateTime<Utc>) -> Self {
        Self {
            from: &[VisitState::Ingreso],
            to: VisitState::Salida,
            stamps_exit: true,
            actor: actor.to_string(),
            at,
        }
    }

    pub fn cancel(policy: CancelPolicy, actor: &str, at: DateTime<Utc>) -> Self {
        let from: &'static [VisitState] = match policy {
            CancelPolicy::Strict => &[VisitState::Ingreso],
            CancelPolicy::Permissive => &[VisitState::Ingreso, VisitState::Salida],
        };
        Self { from, to: VisitState::Cancelada, stamps_exit: false, actor: actor.to_string(), at }
    }

    pub fn check(&self, current: VisitState) -> Result<(), TransitionError> {
        if self.from.contains(&current) {
            return Ok(());
        }
        match (self.to, current) {
            (VisitState::Salida, VisitState::Salida) => Err(TransitionError::AlreadyExited),
            (VisitState::Salida, VisitState::Cancelada) => Err(TransitionError::VisitCancelled),
            (VisitState::Cancelada, VisitState::Cancelada) => Err(TransitionError::AlreadyCancelled),
            (VisitState::Cancelada, VisitState::Salida) => Err(TransitionError::ExitRecorded),
            _ => Err(TransitionError::NotAllowed),
        }
    }
}

/// Records that go through the check-in lifecycle `ingreso -> salida | cancelada`.
pub trait CheckIn: Clone + Send + Sync + Unpin + Serialize + 'static {
    type Draft: DeserializeOwned + Send;
    type Patch: DeserializeOwned + Send;

    const NOT_FOUND: &'static str;
    const KIND: &'static str;

    fn from_draft(draft: Self::Draft, actor: &str, at: DateTime<Utc>) -> Result<Self, Vec<FieldError>>;
    fn apply(&mut self, patch: Self::Patch, actor: &str, at: DateTime<Utc>) -> Result<(), Vec<FieldError>>;
    fn id(&self) -> &str;
    fn estado(&self) -> VisitState;
    /// Value of the `busqueda` column.
    fn search_key(&self) -> String;
}

/// Lifecycle columns a patch may name but never change.
#[derive(Debug, Default, Deserialize)]
pub struct LockedFields {
    pub estado: Option<Value>,
    pub fecha_ingreso: Option<Value>,
    pub fecha_salida: Option<Value>,
}

impl LockedFields {
    pub fn check(&self, errors: &mut Vec<FieldError>) {
        let named = [
            ("estado", self.estado.is_some()),
            ("fecha_ingreso", self.fecha_ingreso.is_some()),
            ("fecha_salida", self.fecha_salida.is_some()),
        ];
        for (field, present) in named {
            if present {
                errors.push(FieldError::new(
                    field,
                    "No se puede modificar directamente; use los endpoints de salida o cancelación",
                ));
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Visit {
    pub id: String,
    pub nombre: String,
    pub apellido: Option<String>,
    pub apellido_paterno: Option<String>,
    pub apellido_materno: Option<String>,
    pub documento: String,
    pub departamento: String,
    pub ingreso_vehiculo: bool,
    pub fecha_ingreso: DateTime<Utc>,
    pub fecha_salida: Option<DateTime<Utc>>,
    pub estado: VisitState,
    pub observaciones: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VisitDraft {
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub apellido_paterno: Option<String>,
    pub apellido_materno: Option<String>,
    pub documento: Option<String>,
    pub departamento: Option<String>,
    pub ingreso_vehiculo: Option<bool>,
    pub observaciones: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VisitPatch {
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub apellido_paterno: Option<String>,
    pub apellido_materno: Option<String>,
    pub documento: Option<String>,
    pub departamento: Option<String>,
    pub ingreso_vehiculo: Option<bool>,
    pub observaciones: Option<String>,
    #[serde(flatten)]
    pub locked: LockedFields,
}

impl CheckIn for Visit {
    type Draft = VisitDraft;
    type Patch = VisitPatch;

    const NOT_FOUND: &'static str = "Visita no encontrada";
    const KIND: &'static str = "visit";

    fn from_draft(draft: VisitDraft, actor: &str, at: DateTime<Utc>) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        let nombre = required(&mut errors, "nombre", draft.nombre);
        let documento = required(&mut errors, "documento", draft.documento);
        let departamento = required(&mut errors, "departamento", draft.departamento);
        if !errors.is_empty() {
            return Err(errors);
        }

        let visit = Self {
            id: Uuid::new_v4().to_string(),
            nombre,
            apellido: optional(draft.apellido),
            apellido_paterno: optional(draft.apellido_paterno),
            apellido_materno: optional(draft.apellido_materno),
            documento,
            departamento,
            ingreso_vehiculo: draft.ingreso_vehiculo.unwrap_or(false),
            fecha_ingreso: at,
            fecha_salida: None,
            estado: VisitState::Ingreso,
            observaciones: optional(draft.observaciones),
            created_by: Some(actor.to_string()),
            updated_by: None,
            created_at: at,
            updated_at: at,
        };

        visit.check_lengths(&mut errors);
        if errors.is_empty() { Ok(visit) } else { Err(errors) }
    }

    fn apply(&mut self, patch: VisitPatch, actor: &str, at: DateTime<Utc>) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        patch.locked.check(&mut errors);
        patch_required(&mut errors, "nombre", &mut self.nombre, patch.nombre);
        patch_required(&mut errors, "documento", &mut self.documento, patch.documento);
        patch_required(&mut errors, "departamento", &mut self.departamento, patch.departamento);
        if !errors.is_empty() {
            return Err(errors);
        }

        patch_optional(&mut self.apellido, patch.apellido);
        patch_optional(&mut self.apellido_paterno, patch.apellido_paterno);
        patch_optional(&mut self.apellido_materno, patch.apellido_materno);
        patch_optional(&mut self.observaciones, patch.observaciones);
        if let Some(v) = patch.ingreso_vehiculo {
            self.ingreso_vehiculo = v;
        }

        self.check_lengths(&mut errors);
        if !errors.is_empty() {
            return Err(errors);
        }
        self.updated_by = Some(actor.to_string());
        self.updated_at = at;
        Ok(())
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn estado(&self) -> VisitState {
        self.estado
    }

    fn search_key(&self) -> String {
        search_key([
            Some(self.nombre.as_str()),
            self.apellido.as_deref(),
            self.apellido_paterno.as_deref(),
            self.apellido_materno.as_deref(),
            Some(self.documento.as_str()),
            Some(self.departamento.as_str()),
        ])
    }
}

impl Visit {
    fn check_lengths(&self, errors: &mut Vec<FieldError>) {
        max_lens(errors, &[
            ("nombre", Some(&self.nombre), 100),
            ("apellido", self.apellido.as_deref(), 100),
            ("apellido_paterno", self.apellido_paterno.as_deref(), 100),
            ("apellido_materno", self.apellido_materno.as_deref(), 100),
            ("documento", Some(&self.documento), 20),
            ("departamento", Some(&self.departamento), 100),
        ]);
    }
}

#[derive(Debug, Clone, Default)]
pub struct VisitFilter {
    pub search: Option<String>,
    pub estado: Option<VisitState>,
    pub fecha: Option<NaiveDate>,
    pub page: PageRequest,
}

impl VisitFilter {
    /// The UTC calendar day `[00:00, next 00:00)` selected by `fecha`.
    pub fn day_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.fecha.map(|day| {
            let start = day.and_time(NaiveTime::MIN).and_utc();
            (start, start + Duration::days(1))
        })
    }
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct VisitStatistics {
    pub total_visitas: i64,
    pub visitas_activas: i64,
    pub visitas_completadas: i64,
    pub visitas_canceladas: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> VisitDraft {
        VisitDraft {
            nombre: Some("Luis".into()),
            documento: Some("12345678".into()),
            departamento: Some("101".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_visit_is_checked_in() {
        let now = Utc::now();
        let visit = Visit::from_draft(draft(), "u1", now).unwrap();
        assert_eq!(visit.estado, VisitState::Ingreso);
        assert_eq!(visit.fecha_ingreso, now);
        assert!(visit.fecha_salida.is_none());
        assert_eq!(visit.created_by.as_deref(), Some("u1"));
    }

    #[test]
    fn test_draft_reports_all_missing_fields() {
        let errors = Visit::from_draft(VisitDraft::default(), "u1", Utc::now()).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["nombre", "documento", "departamento"]);
    }

    #[test]
    fn test_overlong_fields_are_rejected_before_storage() {
        let mut d = draft();
        d.documento = Some("1".repeat(25));
        let errors = Visit::from_draft(d, "u1", Utc::now()).unwrap_err();
        assert_eq!(errors[0].field, "documento");

        let mut visit = Visit::from_draft(draft(), "u1", Utc::now()).unwrap();
        let patch = VisitPatch { apellido: Some("Ñ".repeat(101)), ..Default::default() };
        let errors = visit.apply(patch, "u2", Utc::now()).unwrap_err();
        assert_eq!(errors[0].field, "apellido");
    }

    #[test]
    fn test_exit_rules() {
        let exit = Transition::exit("u1", Utc::now());
        assert_eq!(exit.check(VisitState::Ingreso), Ok(()));
        assert_eq!(exit.check(VisitState::Salida), Err(TransitionError::AlreadyExited));
        assert_eq!(exit.check(VisitState::Cancelada), Err(TransitionError::VisitCancelled));
    }

    #[test]
    fn test_cancel_rules_follow_policy() {
        let strict = Transition::cancel(CancelPolicy::Strict, "u1", Utc::now());
        assert_eq!(strict.check(VisitState::Ingreso), Ok(()));
        assert_eq!(strict.check(VisitState::Salida), Err(TransitionError::ExitRecorded));
        assert_eq!(strict.check(VisitState::Cancelada), Err(TransitionError::AlreadyCancelled));

        let permissive = Transition::cancel(CancelPolicy::Permissive, "u1", Utc::now());
        assert_eq!(permissive.check(VisitState::Salida), Ok(()));
        assert_eq!(permissive.check(VisitState::Cancelada), Err(TransitionError::AlreadyCancelled));
    }

    #[test]
    fn test_patch_cannot_touch_lifecycle_fields() {
        let mut visit = Visit::from_draft(draft(), "u1", Utc::now()).unwrap();
        let patch: VisitPatch = serde_json::from_value(serde_json::json!({
            "observaciones": "ok",
            "estado": "salida",
        }))
        .unwrap();

        let errors = visit.apply(patch, "u2", Utc::now()).unwrap_err();
        assert_eq!(errors[0].field, "estado");
        assert_eq!(visit.estado, VisitState::Ingreso);
        assert!(visit.observaciones.is_none());
    }

    #[test]
    fn test_patch_updates_and_clears_fields() {
        let mut visit = Visit::from_draft(draft(), "u1", Utc::now()).unwrap();
        visit.observaciones = Some("nota".into());
        let patch: VisitPatch = serde_json::from_value(serde_json::json!({
            "departamento": "202",
            "observaciones": "",
            "ingreso_vehiculo": true,
        }))
        .unwrap();

        visit.apply(patch, "u2", Utc::now()).unwrap();
        assert_eq!(visit.departamento, "202");
        assert!(visit.observaciones.is_none());
        assert!(visit.ingreso_vehiculo);
        assert_eq!(visit.updated_by.as_deref(), Some("u2"));
    }

    #[test]
    fn test_wire_round_trip_preserves_state_and_timestamps() {
        let mut visit = Visit::from_draft(draft(), "u1", Utc::now()).unwrap();
        visit.estado = VisitState::Salida;
        visit.fecha_salida = Some(Utc::now());

        let json = serde_json::to_string(&visit).unwrap();
        let back: Visit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, visit);
        assert!(json.contains("\"estado\":\"salida\""));
    }

    #[test]
    fn test_day_range_spans_one_utc_day() {
        let filter = VisitFilter { fecha: NaiveDate::from_ymd_opt(2025, 3, 9), ..Default::default() };
        let (start, end) = filter.day_range().unwrap();
        assert_eq!(start.to_rfc3339(), "2025-03-09T00:00:00+00:00");
        assert_eq!(end - start, Duration::days(1));
    }
}
