use crate::domain::{
    models::{
        fields::search_pattern,
        pagination::Page,
        user::{User, UserFilter},
    },
    ports::UserRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::error;

const LIST_FILTER: &str = "WHERE is_active = TRUE \
    AND ($1::text IS NULL OR busqueda LIKE $1 ESCAPE '\\') \
    AND ($2::text IS NULL OR rol_id = $2) \
    AND ($3::user_estado IS NULL OR estado = $3)";

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepo {
    async fn create(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO usuarios (id, nombre, apellido, email, username, password_hash, rol_id, perfil_id, estado, \
             ultimo_acceso, telefono, direccion, is_active, created_by, updated_by, created_at, updated_at, busqueda) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) RETURNING *",
        )
            .bind(&user.id)
            .bind(&user.nombre)
            .bind(&user.apellido)
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.rol_id)
            .bind(&user.perfil_id)
            .bind(user.estado)
            .bind(user.ultimo_acceso)
            .bind(&user.telefono)
            .bind(&user.direccion)
            .bind(user.is_active)
            .bind(&user.created_by)
            .bind(&user.updated_by)
            .bind(user.created_at)
            .bind(user.updated_at)
            .bind(user.search_key())
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM usuarios WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM usuarios WHERE username = $1 AND is_active = TRUE")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM usuarios WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM usuarios WHERE email = $1 AND is_active = TRUE")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, filter: &UserFilter) -> Result<Page<User>, AppError> {
        let pattern = filter.search.as_deref().map(search_pattern);

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM usuarios {LIST_FILTER}"))
            .bind(&pattern)
            .bind(&filter.rol_id)
            .bind(filter.estado)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let items = sqlx::query_as::<_, User>(&format!(
            "SELECT * FROM usuarios {LIST_FILTER} ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5"
        ))
            .bind(&pattern)
            .bind(&filter.rol_id)
            .bind(filter.estado)
            .bind(filter.page.limit)
            .bind(filter.page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(Page::new(items, total, filter.page))
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "UPDATE usuarios SET nombre = $1, apellido = $2, email = $3, username = $4, password_hash = $5, rol_id = $6, \
             perfil_id = $7, estado = $8, telefono = $9, direccion = $10, updated_by = $11, updated_at = $12, \
             busqueda = $13 WHERE id = $14 AND is_active = TRUE RETURNING *",
        )
            .bind(&user.nombre)
            .bind(&user.apellido)
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.rol_id)
            .bind(&user.perfil_id)
            .bind(user.estado)
            .bind(&user.telefono)
            .bind(&user.direccion)
            .bind(&user.updated_by)
            .bind(user.updated_at)
            .bind(user.search_key())
            .bind(&user.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".into()))
    }

    async fn soft_delete(&self, id: &str, actor: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE usuarios SET is_active = FALSE, estado = 'inactivo', updated_by = $1, updated_at = $2 \
             WHERE id = $3 AND is_active = TRUE",
        )
            .bind(actor)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Postgres user deactivation failed: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Usuario no encontrado".into()));
        }
        Ok(())
    }

    async fn touch_last_access(&self, id: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("UPDATE usuarios SET ultimo_acceso = $1 WHERE id = $2")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}
