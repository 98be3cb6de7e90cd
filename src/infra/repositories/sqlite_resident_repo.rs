use crate::domain::{
    models::{
        fields::search_pattern,
        pagination::Page,
        resident::{Resident, ResidentFilter, ResidentStatistics},
    },
    ports::ResidentRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

const LIST_FILTER: &str = "WHERE (?1 IS NULL OR busqueda LIKE ?1 ESCAPE '\\') \
    AND (?2 IS NULL OR estado = ?2) \
    AND (?3 IS NULL OR tipo_residente = ?3)";

pub struct SqliteResidentRepo {
    pool: SqlitePool,
}

impl SqliteResidentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResidentRepository for SqliteResidentRepo {
    async fn create(&self, r: &Resident) -> Result<Resident, AppError> {
        sqlx::query_as::<_, Resident>(
            "INSERT INTO residentes (id, nombre, apellido_paterno, apellido_materno, documento, tipo_documento, email, \
             telefono, departamento, piso, tipo_residente, fecha_nacimiento, ocupacion, empresa, vehiculo, placa, marca, \
             modelo, color, fecha_registro, estado, observaciones, created_by, updated_by, created_at, updated_at, \
             busqueda) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
            .bind(&r.id)
            .bind(&r.nombre)
            .bind(&r.apellido_paterno)
            .bind(&r.apellido_materno)
            .bind(&r.documento)
            .bind(r.tipo_documento)
            .bind(&r.email)
            .bind(&r.telefono)
            .bind(&r.departamento)
            .bind(&r.piso)
            .bind(r.tipo_residente)
            .bind(r.fecha_nacimiento)
            .bind(&r.ocupacion)
            .bind(&r.empresa)
            .bind(r.vehiculo)
            .bind(&r.placa)
            .bind(&r.marca)
            .bind(&r.modelo)
            .bind(&r.color)
            .bind(r.fecha_registro)
            .bind(r.estado)
            .bind(&r.observaciones)
            .bind(&r.created_by)
            .bind(&r.updated_by)
            .bind(r.created_at)
            .bind(r.updated_at)
            .bind(r.search_key())
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Resident>, AppError> {
        sqlx::query_as::<_, Resident>("SELECT * FROM residentes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_documento(&self, documento: &str) -> Result<Option<Resident>, AppError> {
        sqlx::query_as::<_, Resident>("SELECT * FROM residentes WHERE documento = ?")
            .bind(documento)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, filter: &ResidentFilter) -> Result<Page<Resident>, AppError> {
        let pattern = filter.search.as_deref().map(search_pattern);

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM residentes {LIST_FILTER}"))
            .bind(&pattern)
            .bind(filter.estado)
            .bind(filter.tipo)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let items = sqlx::query_as::<_, Resident>(&format!(
            "SELECT * FROM residentes {LIST_FILTER} ORDER BY created_at DESC, id DESC LIMIT ?4 OFFSET ?5"
        ))
            .bind(&pattern)
            .bind(filter.estado)
            .bind(filter.tipo)
            .bind(filter.page.limit)
            .bind(filter.page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(Page::new(items, total, filter.page))
    }

    async fn list_by_departamento(&self, departamento: &str) -> Result<Vec<Resident>, AppError> {
        sqlx::query_as::<_, Resident>(
            "SELECT * FROM residentes WHERE departamento = ? AND estado = 'activo' ORDER BY nombre ASC",
        )
            .bind(departamento)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, r: &Resident) -> Result<Resident, AppError> {
        sqlx::query_as::<_, Resident>(
            "UPDATE residentes SET nombre = ?, apellido_paterno = ?, apellido_materno = ?, documento = ?, \
             tipo_documento = ?, email = ?, telefono = ?, departamento = ?, piso = ?, tipo_residente = ?, \
             fecha_nacimiento = ?, ocupacion = ?, empresa = ?, vehiculo = ?, placa = ?, marca = ?, modelo = ?, \
             color = ?, fecha_registro = ?, estado = ?, observaciones = ?, updated_by = ?, updated_at = ?, \
             busqueda = ? WHERE id = ? RETURNING *",
        )
            .bind(&r.nombre)
            .bind(&r.apellido_paterno)
            .bind(&r.apellido_materno)
            .bind(&r.documento)
            .bind(r.tipo_documento)
            .bind(&r.email)
            .bind(&r.telefono)
            .bind(&r.departamento)
            .bind(&r.piso)
            .bind(r.tipo_residente)
            .bind(r.fecha_nacimiento)
            .bind(&r.ocupacion)
            .bind(&r.empresa)
            .bind(r.vehiculo)
            .bind(&r.placa)
            .bind(&r.marca)
            .bind(&r.modelo)
            .bind(&r.color)
            .bind(r.fecha_registro)
            .bind(r.estado)
            .bind(&r.observaciones)
            .bind(&r.updated_by)
            .bind(r.updated_at)
            .bind(r.search_key())
            .bind(&r.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Residente no encontrado".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM residentes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Residente no encontrado".into()));
        }
        Ok(())
    }

    async fn statistics(&self) -> Result<ResidentStatistics, AppError> {
        sqlx::query_as::<_, ResidentStatistics>(
            "SELECT COUNT(*) AS total_residentes, \
                    COUNT(CASE WHEN estado = 'activo' THEN 1 END) AS residentes_activos, \
                    COUNT(CASE WHEN tipo_residente = 'propietario' THEN 1 END) AS propietarios, \
                    COUNT(CASE WHEN tipo_residente = 'inquilino' THEN 1 END) AS inquilinos, \
                    COUNT(CASE WHEN tipo_residente = 'familiar' THEN 1 END) AS familiares \
             FROM residentes",
        )
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
