use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use super::permissions::Permissions;

/// Coarse access tier assigned to a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: String,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub nivel_acceso: i32,
    pub color: Option<String>,
    pub icono: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn new(nombre: &str, descripcion: &str, nivel_acceso: i32, color: &str, icono: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            nombre: nombre.to_string(),
            descripcion: Some(descripcion.to_string()),
            nivel_acceso: nivel_acceso.clamp(1, 10),
            color: Some(color.to_string()),
            icono: Some(icono.to_string()),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Permission bundle assigned to a user, independent of the role.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: String,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub permisos: Json<Permissions>,
    pub nivel_seguridad: i32,
    pub color: Option<String>,
    pub icono: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(
        nombre: &str,
        descripcion: &str,
        permisos: Permissions,
        nivel_seguridad: i32,
        color: &str,
        icono: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            nombre: nombre.to_string(),
            descripcion: Some(descripcion.to_string()),
            permisos: Json(permisos),
            nivel_seguridad: nivel_seguridad.clamp(1, 5),
            color: Some(color.to_string()),
            icono: Some(icono.to_string()),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
