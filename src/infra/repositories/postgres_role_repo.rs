use crate::domain::{
    models::role::{Profile, Role},
    ports::{ProfileRepository, RoleRepository},
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresRoleRepo {
    pool: PgPool,
}

impl PostgresRoleRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepo {
    async fn create(&self, role: &Role) -> Result<Role, AppError> {
        sqlx::query_as::<_, Role>(
            "INSERT INTO roles (id, nombre, descripcion, nivel_acceso, color, icono, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
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
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_name(&self, nombre: &str) -> Result<Option<Role>, AppError> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE nombre = $1")
            .bind(nombre)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_active(&self) -> Result<Vec<Role>, AppError> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE is_active = TRUE ORDER BY nivel_acceso DESC, nombre ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}

pub struct PostgresProfileRepo {
    pool: PgPool,
}

impl PostgresProfileRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepo {
    async fn create(&self, profile: &Profile) -> Result<Profile, AppError> {
        sqlx::query_as::<_, Profile>(
            "INSERT INTO perfiles (id, nombre, descripcion, permisos, nivel_seguridad, color, icono, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
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
        sqlx::query_as::<_, Profile>("SELECT * FROM perfiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_name(&self, nombre: &str) -> Result<Option<Profile>, AppError> {
        sqlx::query_as::<_, Profile>("SELECT * FROM perfiles WHERE nombre = $1")
            .bind(nombre)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_active(&self) -> Result<Vec<Profile>, AppError> {
        sqlx::query_as::<_, Profile>("SELECT * FROM perfiles WHERE is_active = TRUE ORDER BY nombre ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
