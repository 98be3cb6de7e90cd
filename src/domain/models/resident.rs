use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use super::fields::{is_email, max_lens, optional, patch_optional, patch_required, required, search_key};
use super::pagination::PageRequest;
use crate::error::FieldError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "resident_tipo_documento", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentType {
    #[default]
    Dni,
    Ce,
    Pasaporte,
    Ruc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "resident_tipo", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResidentType {
    #[default]
    Propietario,
    Inquilino,
    Familiar,
}

impl FromStr for ResidentType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "propietario" => Ok(ResidentType::Propietario),
            "inquilino" => Ok(ResidentType::Inquilino),
            "familiar" => Ok(ResidentType::Familiar),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "resident_estado", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResidentStatus {
    #[default]
    Activo,
    Inactivo,
    Suspendido,
}

impl FromStr for ResidentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activo" => Ok(ResidentStatus::Activo),
            "inactivo" => Ok(ResidentStatus::Inactivo),
            "suspendido" => Ok(ResidentStatus::Suspendido),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Resident {
    pub id: String,
    pub nombre: String,
    pub apellido_paterno: String,
    pub apellido_materno: Option<String>,
    pub documento: String,
    pub tipo_documento: DocumentType,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub departamento: String,
    pub piso: Option<String>,
    pub tipo_residente: ResidentType,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub ocupacion: Option<String>,
    pub empresa: Option<String>,
    pub vehiculo: bool,
    pub placa: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub color: Option<String>,
    pub fecha_registro: NaiveDate,
    pub estado: ResidentStatus,
    pub observaciones: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResidentDraft {
    pub nombre: Option<String>,
    pub apellido_paterno: Option<String>,
    pub apellido_materno: Option<String>,
    pub documento: Option<String>,
    pub tipo_documento: Option<DocumentType>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub departamento: Option<String>,
    pub piso: Option<String>,
    pub tipo_residente: Option<ResidentType>,
    pub fecha_nacimiento: Option<String>,
    pub ocupacion: Option<String>,
    pub empresa: Option<String>,
    pub vehiculo: Option<bool>,
    pub placa: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub color: Option<String>,
    pub fecha_registro: Option<String>,
    pub estado: Option<ResidentStatus>,
    pub observaciones: Option<String>,
}

/// Partial update. Absent fields are kept, empty strings clear optional ones.
#[derive(Debug, Default, Deserialize)]
pub struct ResidentPatch {
    pub nombre: Option<String>,
    pub apellido_paterno: Option<String>,
    pub apellido_materno: Option<String>,
    pub documento: Option<String>,
    pub tipo_documento: Option<DocumentType>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub departamento: Option<String>,
    pub piso: Option<String>,
    pub tipo_residente: Option<ResidentType>,
    pub fecha_nacimiento: Option<String>,
    pub ocupacion: Option<String>,
    pub empresa: Option<String>,
    pub vehiculo: Option<bool>,
    pub placa: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub color: Option<String>,
    pub fecha_registro: Option<String>,
    pub estado: Option<ResidentStatus>,
    pub observaciones: Option<String>,
}

fn parse_date(errors: &mut Vec<FieldError>, field: &str, value: Option<String>) -> Option<NaiveDate> {
    let value = optional(value)?;
    match NaiveDate::parse_from_str(&value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(FieldError::new(field, "Fecha inválida, use el formato YYYY-MM-DD"));
            None
        }
    }
}

impl Resident {
    pub fn from_draft(draft: ResidentDraft, actor: &str, at: DateTime<Utc>) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        let nombre = required(&mut errors, "nombre", draft.nombre);
        let apellido_paterno = required(&mut errors, "apellido_paterno", draft.apellido_paterno);
        let documento = required(&mut errors, "documento", draft.documento);
        let departamento = required(&mut errors, "departamento", draft.departamento);
        let fecha_nacimiento = parse_date(&mut errors, "fecha_nacimiento", draft.fecha_nacimiento);
        let fecha_registro = parse_date(&mut errors, "fecha_registro", draft.fecha_registro);

        let resident = Self {
            id: Uuid::new_v4().to_string(),
            nombre,
            apellido_paterno,
            apellido_materno: optional(draft.apellido_materno),
            documento,
            tipo_documento: draft.tipo_documento.unwrap_or_default(),
            email: optional(draft.email),
            telefono: optional(draft.telefono),
            departamento,
            piso: optional(draft.piso),
            tipo_residente: draft.tipo_residente.unwrap_or_default(),
            fecha_nacimiento,
            ocupacion: optional(draft.ocupacion),
            empresa: optional(draft.empresa),
            vehiculo: draft.vehiculo.unwrap_or(false),
            placa: optional(draft.placa),
            marca: optional(draft.marca),
            modelo: optional(draft.modelo),
            color: optional(draft.color),
            fecha_registro: fecha_registro.unwrap_or_else(|| at.date_naive()),
            estado: draft.estado.unwrap_or_default(),
            observaciones: optional(draft.observaciones),
            created_by: Some(actor.to_string()),
            updated_by: Some(actor.to_string()),
            created_at: at,
            updated_at: at,
        };

        resident.check_formats(&mut errors);
        if errors.is_empty() { Ok(resident) } else { Err(errors) }
    }

    pub fn apply(&mut self, patch: ResidentPatch, actor: &str, at: DateTime<Utc>) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        patch_required(&mut errors, "nombre", &mut self.nombre, patch.nombre);
        patch_required(&mut errors, "apellido_paterno", &mut self.apellido_paterno, patch.apellido_paterno);
        patch_required(&mut errors, "documento", &mut self.documento, patch.documento);
        patch_required(&mut errors, "departamento", &mut self.departamento, patch.departamento);

        if let Some(raw) = patch.fecha_nacimiento {
            self.fecha_nacimiento = parse_date(&mut errors, "fecha_nacimiento", Some(raw));
        }
        if let Some(date) = parse_date(&mut errors, "fecha_registro", patch.fecha_registro) {
            self.fecha_registro = date;
        }

        patch_optional(&mut self.apellido_materno, patch.apellido_materno);
        patch_optional(&mut self.email, patch.email);
        patch_optional(&mut self.telefono, patch.telefono);
        patch_optional(&mut self.piso, patch.piso);
        patch_optional(&mut self.ocupacion, patch.ocupacion);
        patch_optional(&mut self.empresa, patch.empresa);
        patch_optional(&mut self.placa, patch.placa);
        patch_optional(&mut self.marca, patch.marca);
        patch_optional(&mut self.modelo, patch.modelo);
        patch_optional(&mut self.color, patch.color);
        patch_optional(&mut self.observaciones, patch.observaciones);
        if let Some(v) = patch.tipo_documento {
            self.tipo_documento = v;
        }
        if let Some(v) = patch.tipo_residente {
            self.tipo_residente = v;
        }
        if let Some(v) = patch.vehiculo {
            self.vehiculo = v;
        }
        if let Some(v) = patch.estado {
            self.estado = v;
        }

        self.check_formats(&mut errors);
        if !errors.is_empty() {
            return Err(errors);
        }
        self.updated_by = Some(actor.to_string());
        self.updated_at = at;
        Ok(())
    }

    fn check_formats(&self, errors: &mut Vec<FieldError>) {
        if let Some(email) = &self.email
            && !is_email(email)
        {
            errors.push(FieldError::new("email", "El email no es válido"));
        }
        max_lens(errors, &[
            ("nombre", Some(&self.nombre), 100),
            ("apellido_paterno", Some(&self.apellido_paterno), 100),
            ("apellido_materno", self.apellido_materno.as_deref(), 100),
            ("documento", Some(&self.documento), 20),
            ("email", self.email.as_deref(), 150),
            ("telefono", self.telefono.as_deref(), 20),
            ("departamento", Some(&self.departamento), 10),
            ("piso", self.piso.as_deref(), 5),
            ("ocupacion", self.ocupacion.as_deref(), 100),
            ("empresa", self.empresa.as_deref(), 150),
            ("placa", self.placa.as_deref(), 10),
            ("marca", self.marca.as_deref(), 50),
            ("modelo", self.modelo.as_deref(), 50),
            ("color", self.color.as_deref(), 30),
        ]);
    }

    /// Value of the `busqueda` column.
    pub fn search_key(&self) -> String {
        search_key([
            Some(self.nombre.as_str()),
            Some(self.apellido_paterno.as_str()),
            self.apellido_materno.as_deref(),
            Some(self.documento.as_str()),
            self.email.as_deref(),
            Some(self.departamento.as_str()),
        ])
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResidentFilter {
    pub search: Option<String>,
    pub estado: Option<ResidentStatus>,
    pub tipo: Option<ResidentType>,
    pub page: PageRequest,
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct ResidentStatistics {
    pub total_residentes: i64,
    pub residentes_activos: i64,
    pub propietarios: i64,
    pub inquilinos: i64,
    pub familiares: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ResidentDraft {
        ResidentDraft {
            nombre: Some("María".into()),
            apellido_paterno: Some("Quispe".into()),
            documento: Some("40404040".into()),
            departamento: Some("502".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_on_create() {
        let now = Utc::now();
        let resident = Resident::from_draft(draft(), "u1", now).unwrap();
        assert_eq!(resident.tipo_documento, DocumentType::Dni);
        assert_eq!(resident.tipo_residente, ResidentType::Propietario);
        assert_eq!(resident.estado, ResidentStatus::Activo);
        assert_eq!(resident.fecha_registro, now.date_naive());
        assert!(!resident.vehiculo);
    }

    #[test]
    fn test_invalid_email_and_date_are_reported() {
        let mut d = draft();
        d.email = Some("no-es-email".into());
        d.fecha_nacimiento = Some("31/12/1990".into());
        let errors = Resident::from_draft(d, "u1", Utc::now()).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"fecha_nacimiento"));
    }

    #[test]
    fn test_every_sized_column_is_checked() {
        let mut d = draft();
        d.nombre = Some("N".repeat(101));
        d.color = Some("verde oscuro metálico con franjas".into());
        let errors = Resident::from_draft(d, "u1", Utc::now()).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["nombre", "color"]);
    }

    #[test]
    fn test_patch_clears_birth_date_with_empty_string() {
        let mut d = draft();
        d.fecha_nacimiento = Some("1990-12-31".into());
        let mut resident = Resident::from_draft(d, "u1", Utc::now()).unwrap();
        assert!(resident.fecha_nacimiento.is_some());

        let patch = ResidentPatch { fecha_nacimiento: Some(String::new()), ..Default::default() };
        resident.apply(patch, "u2", Utc::now()).unwrap();
        assert!(resident.fecha_nacimiento.is_none());
        assert_eq!(resident.updated_by.as_deref(), Some("u2"));
    }

    #[test]
    fn test_enums_use_wire_spelling() {
        let json = serde_json::json!({ "tipo_documento": "PASAPORTE", "tipo_residente": "inquilino" });
        let patch: ResidentPatch = serde_json::from_value(json).unwrap();
        assert_eq!(patch.tipo_documento, Some(DocumentType::Pasaporte));
        assert_eq!(patch.tipo_residente, Some(ResidentType::Inquilino));
    }
}
