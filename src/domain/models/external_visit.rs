use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::fields::{max_lens, optional, patch_optional, patch_required, required, search_key};
use super::visit::{CheckIn, LockedFields, VisitState};
use crate::error::FieldError;

/// Contractor, courier or service visit. Tracked like a guest visit but
/// with company, purpose and authorization details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ExternalVisit {
    pub id: String,
    pub nombre: String,
    pub apellido: Option<String>,
    pub documento: String,
    pub empresa: String,
    pub motivo: String,
    pub ubicacion_destino: String,
    pub contacto: String,
    pub vehiculo: Option<String>,
    pub placa: Option<String>,
    pub tipo_visita: String,
    pub autorizacion: String,
    pub acompanantes: Option<String>,
    pub equipamiento: Option<String>,
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
pub struct ExternalVisitDraft {
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub documento: Option<String>,
    pub empresa: Option<String>,
    pub motivo: Option<String>,
    pub ubicacion_destino: Option<String>,
    pub contacto: Option<String>,
    pub vehiculo: Option<String>,
    pub placa: Option<String>,
    pub tipo_visita: Option<String>,
    pub autorizacion: Option<String>,
    pub acompanantes: Option<String>,
    pub equipamiento: Option<String>,
    pub observaciones: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExternalVisitPatch {
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub documento: Option<String>,
    pub empresa: Option<String>,
    pub motivo: Option<String>,
    pub ubicacion_destino: Option<String>,
    pub contacto: Option<String>,
    pub vehiculo: Option<String>,
    pub placa: Option<String>,
    pub tipo_visita: Option<String>,
    pub autorizacion: Option<String>,
    pub acompanantes: Option<String>,
    pub equipamiento: Option<String>,
    pub observaciones: Option<String>,
    #[serde(flatten)]
    pub locked: LockedFields,
}

impl CheckIn for ExternalVisit {
    type Draft = ExternalVisitDraft;
    type Patch = ExternalVisitPatch;

    const NOT_FOUND: &'static str = "Visita externa no encontrada";
    const KIND: &'static str = "external visit";

    fn from_draft(draft: ExternalVisitDraft, actor: &str, at: DateTime<Utc>) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        let nombre = required(&mut errors, "nombre", draft.nombre);
        let documento = required(&mut errors, "documento", draft.documento);
        let empresa = required(&mut errors, "empresa", draft.empresa);
        let motivo = required(&mut errors, "motivo", draft.motivo);
        let ubicacion_destino = required(&mut errors, "ubicacion_destino", draft.ubicacion_destino);
        let contacto = required(&mut errors, "contacto", draft.contacto);
        let tipo_visita = required(&mut errors, "tipo_visita", draft.tipo_visita);
        let autorizacion = required(&mut errors, "autorizacion", draft.autorizacion);
        if !errors.is_empty() {
            return Err(errors);
        }

        let visit = Self {
            id: Uuid::new_v4().to_string(),
            nombre,
            apellido: optional(draft.apellido),
            documento,
            empresa,
            motivo,
            ubicacion_destino,
            contacto,
            vehiculo: optional(draft.vehiculo),
            placa: optional(draft.placa),
            tipo_visita,
            autorizacion,
            acompanantes: optional(draft.acompanantes),
            equipamiento: optional(draft.equipamiento),
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

    fn apply(&mut self, patch: ExternalVisitPatch, actor: &str, at: DateTime<Utc>) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        patch.locked.check(&mut errors);
        patch_required(&mut errors, "nombre", &mut self.nombre, patch.nombre);
        patch_required(&mut errors, "documento", &mut self.documento, patch.documento);
        patch_required(&mut errors, "empresa", &mut self.empresa, patch.empresa);
        patch_required(&mut errors, "motivo", &mut self.motivo, patch.motivo);
        patch_required(&mut errors, "ubicacion_destino", &mut self.ubicacion_destino, patch.ubicacion_destino);
        patch_required(&mut errors, "contacto", &mut self.contacto, patch.contacto);
        patch_required(&mut errors, "tipo_visita", &mut self.tipo_visita, patch.tipo_visita);
        patch_required(&mut errors, "autorizacion", &mut self.autorizacion, patch.autorizacion);
        if !errors.is_empty() {
            return Err(errors);
        }

        patch_optional(&mut self.apellido, patch.apellido);
        patch_optional(&mut self.vehiculo, patch.vehiculo);
        patch_optional(&mut self.placa, patch.placa);
        patch_optional(&mut self.acompanantes, patch.acompanantes);
        patch_optional(&mut self.equipamiento, patch.equipamiento);
        patch_optional(&mut self.observaciones, patch.observaciones);

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
            Some(self.documento.as_str()),
            Some(self.empresa.as_str()),
        ])
    }
}

impl ExternalVisit {
    fn check_lengths(&self, errors: &mut Vec<FieldError>) {
        max_lens(errors, &[
            ("nombre", Some(&self.nombre), 100),
            ("apellido", self.apellido.as_deref(), 100),
            ("documento", Some(&self.documento), 20),
            ("empresa", Some(&self.empresa), 150),
            ("ubicacion_destino", Some(&self.ubicacion_destino), 100),
            ("contacto", Some(&self.contacto), 100),
            ("vehiculo", self.vehiculo.as_deref(), 100),
            ("placa", self.placa.as_deref(), 20),
            ("tipo_visita", Some(&self.tipo_visita), 100),
            ("autorizacion", Some(&self.autorizacion), 100),
            ("acompanantes", self.acompanantes.as_deref(), 100),
        ]);
    }
}
