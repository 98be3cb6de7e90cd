use crate::domain::{
    models::role::{Profile, Role},
    ports::{ProfileRepository, RoleRepository},
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteRoleRepo {
    pool: SqlitePool,
}

impl SqliteRoleRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for SqliteRoleRepo {
    async fn create(&self, role: &Role) -> Result<Role, AppError> {
        sqlx::query_as::<_, Role>(
            "INSERT INTO roles (id, nombre, descripcion, nivel_acceso, color, icono, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
            .bind(&role.id)
            .bind(&role.nombre)
            .bind(&role.descripcion)
            .bind(role.nivel_acceso)
            .bind(&role.color)
            .bind(&role.icono)
            .bind(role.is_active)
            .bind(role.created_at)
            .bind(role.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Role>, AppError> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_name(&self, nombre: &str) -> Result<Option<Role>, AppError> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE nombre = ?")
            .bind(nombre)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_active(&self) -> Result<Vec<Role>, AppError> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE is_active = 1 ORDER BY nivel_acceso DESC, nombre ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}

pub struct SqliteProfileRepo {
    pool: SqlitePool,
}

impl SqliteProfileRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for SqliteProfileRepo {
    async fn create(&self, profile: &Profile) -> Result<Profile, AppError> {
        sqlx::query_as::<_, Profile>(
            "INSERT INTO perfiles (id, nombre, descripcion, permisos, nivel_seguridad, color, icono, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
            .bind(&profile.id)
            .bind(&profile.nombre)
            .bind(&profile.descripcion)
            .bind(&profile.permisos)
            .bind(profile.nivel_seguridad)
            .bind(&profile.color)
            .bind(&profile.icono)
            .bind(profile.is_active)
            .bind(profile.created_at)
            .bind(profile.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Profile>, AppError> {
        sqlx::query_as::<_, Profile>("SELECT * FROM perfiles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_name(&self, nombre: &str) -> Result<Option<Profile>, AppError> {
        sqlx::query_as::<_, Profile>("SELECT * FROM perfiles WHERE nombre = ?")
            .bind(nombre)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_active(&self) -> Result<Vec<Profile>, AppError> {
        sqlx::query_as::<_, Profile>("SELECT * FROM perfiles WHERE is_active = 1 ORDER BY nombre ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
