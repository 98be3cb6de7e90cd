use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use super::fields::{
    is_email, is_username, max_len, optional, patch_optional, patch_required, required, search_key,
};
use super::pagination::PageRequest;
use crate::error::FieldError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_estado", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Activo,
    Inactivo,
    #[serde(alias = "suspendido")]
    Bloqueado,
    Pendiente,
}

impl FromStr for UserStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activo" => Ok(UserStatus::Activo),
            "inactivo" => Ok(UserStatus::Inactivo),
            "bloqueado" | "suspendido" => Ok(UserStatus::Bloqueado),
            "pendiente" => Ok(UserStatus::Pendiente),
            _ => Err(()),
        }
    }
}

impl UserStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UserStatus::Activo => "activo",
            UserStatus::Inactivo => "inactivo",
            UserStatus::Bloqueado => "bloqueado",
            UserStatus::Pendiente => "pendiente",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: String,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub rol_id: String,
    pub perfil_id: String,
    pub estado: UserStatus,
    pub ultimo_acceso: Option<DateTime<Utc>>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub is_active: bool,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewUserParams {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub rol_id: String,
    pub perfil_id: String,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub created_by: Option<String>,
}

impl User {
    pub fn new(params: NewUserParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            nombre: params.nombre,
            apellido: params.apellido,
            email: params.email,
            username: params.username,
            password_hash: params.password_hash,
            rol_id: params.rol_id,
            perfil_id: params.perfil_id,
            estado: UserStatus::Activo,
            ultimo_acceso: None,
            telefono: params.telefono,
            direccion: params.direccion,
            is_active: true,
            created_by: params.created_by,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Only live, active accounts may log in or hold a session.
    pub fn can_authenticate(&self) -> bool {
        self.is_active && self.estado == UserStatus::Activo
    }

    /// Value of the `busqueda` column.
    pub fn search_key(&self) -> String {
        search_key([
            Some(self.nombre.as_str()),
            Some(self.apellido.as_str()),
            Some(self.email.as_str()),
            Some(self.username.as_str()),
        ])
    }
}

#[derive(Debug, Default, Clone)]
pub struct UserFilter {
    pub search: Option<String>,
    pub rol_id: Option<String>,
    pub estado: Option<UserStatus>,
    pub page: PageRequest,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserDraft {
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub rol_id: Option<String>,
    pub perfil_id: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
}

/// A create request that passed field validation. The password is still plain text.
#[derive(Debug)]
pub struct ValidUserDraft {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub rol_id: String,
    pub perfil_id: String,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
}

impl UserDraft {
    pub fn validate(self, min_password: usize) -> Result<ValidUserDraft, Vec<FieldError>> {
        let mut errors = Vec::new();
        let draft = ValidUserDraft {
            nombre: required(&mut errors, "nombre", self.nombre),
            apellido: required(&mut errors, "apellido", self.apellido),
            email: required(&mut errors, "email", self.email).to_lowercase(),
            username: required(&mut errors, "username", self.username),
            password: self.password.unwrap_or_default(),
            rol_id: required(&mut errors, "rol_id", self.rol_id),
            perfil_id: required(&mut errors, "perfil_id", self.perfil_id),
            telefono: optional(self.telefono),
            direccion: optional(self.direccion),
        };

        check_names(&mut errors, &draft.nombre, &draft.apellido);
        check_identity(&mut errors, &draft.email, &draft.username);
        check_password(&mut errors, &draft.password, min_password);
        max_len(&mut errors, "telefono", draft.telefono.as_deref(), 20);
        max_len(&mut errors, "direccion", draft.direccion.as_deref(), 500);

        if errors.is_empty() { Ok(draft) } else { Err(errors) }
    }
}

/// Partial update. Absent fields are kept; `password` is re-hashed when present.
#[derive(Debug, Default, Deserialize)]
pub struct UserPatch {
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub rol_id: Option<String>,
    pub perfil_id: Option<String>,
    pub estado: Option<UserStatus>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
}

impl User {
    /// Applies `patch` in place and returns the new plain-text password, if any.
    pub fn apply(
        &mut self,
        patch: UserPatch,
        min_password: usize,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<String>, Vec<FieldError>> {
        let mut errors = Vec::new();
        patch_required(&mut errors, "nombre", &mut self.nombre, patch.nombre);
        patch_required(&mut errors, "apellido", &mut self.apellido, patch.apellido);
        patch_required(&mut errors, "email", &mut self.email, patch.email.map(|e| e.to_lowercase()));
        patch_required(&mut errors, "username", &mut self.username, patch.username);
        patch_required(&mut errors, "rol_id", &mut self.rol_id, patch.rol_id);
        patch_required(&mut errors, "perfil_id", &mut self.perfil_id, patch.perfil_id);
        patch_optional(&mut self.telefono, patch.telefono);
        patch_optional(&mut self.direccion, patch.direccion);
        if let Some(estado) = patch.estado {
            self.estado = estado;
        }

        check_names(&mut errors, &self.nombre, &self.apellido);
        check_identity(&mut errors, &self.email, &self.username);
        if let Some(password) = &patch.password {
            check_password(&mut errors, password, min_password);
        }
        max_len(&mut errors, "telefono", self.telefono.as_deref(), 20);
        max_len(&mut errors, "direccion", self.direccion.as_deref(), 500);

        if !errors.is_empty() {
            return Err(errors);
        }
        self.updated_by = Some(actor.to_string());
        self.updated_at = at;
        Ok(patch.password)
    }
}

fn length_between(errors: &mut Vec<FieldError>, field: &str, value: &str, min: usize, max: usize) {
    let len = value.chars().count();
    // Empty values were already reported as missing.
    if len > 0 && (len < min || len > max) {
        errors.push(FieldError::new(field, format!("El campo {field} debe tener entre {min} y {max} caracteres")));
    }
}

fn check_names(errors: &mut Vec<FieldError>, nombre: &str, apellido: &str) {
    length_between(errors, "nombre", nombre, 2, 100);
    length_between(errors, "apellido", apellido, 2, 100);
}

fn check_identity(errors: &mut Vec<FieldError>, email: &str, username: &str) {
    if !email.is_empty() && !is_email(email) {
        errors.push(FieldError::new("email", "Email inválido"));
    }
    max_len(errors, "email", Some(email), 255);
    length_between(errors, "username", username, 3, 50);
    if !username.is_empty() && !is_username(username) {
        errors.push(FieldError::new("username", "El usuario solo puede contener letras, números y guiones bajos"));
    }
}

fn check_password(errors: &mut Vec<FieldError>, password: &str, min: usize) {
    if password.chars().count() < min {
        errors.push(FieldError::new("password", format!("La contraseña debe tener al menos {min} caracteres")));
    }
}
