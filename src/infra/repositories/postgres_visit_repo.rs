use crate::domain::{
    models::{
        external_visit::ExternalVisit,
        fields::search_pattern,
        pagination::Page,
        visit::{CheckIn, Transition, Visit, VisitFilter, VisitStatistics},
    },
    ports::CheckInRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{postgres::PgRow, FromRow, PgPool};

// `$1` search pattern, `$2` estado, `$3`/`$4` fecha_ingreso day range.
const LIST_FILTER: &str = "WHERE ($1::text IS NULL OR busqueda LIKE $1 ESCAPE '\\') \
    AND ($2::visit_estado IS NULL OR estado = $2) \
    AND ($3::timestamptz IS NULL OR (fecha_ingreso >= $3 AND fecha_ingreso < $4))";

async fn list_page<T>(pool: &PgPool, table: &str, filter: &VisitFilter) -> Result<Page<T>, AppError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let pattern = filter.search.as_deref().map(search_pattern);
    let (day_start, day_end) = filter.day_range().unzip();

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} {LIST_FILTER}"))
        .bind(&pattern)
        .bind(filter.estado)
        .bind(day_start)
        .bind(day_end)
        .fetch_one(pool)
        .await
        .map_err(AppError::Database)?;

    let items = sqlx::query_as::<_, T>(&format!(
        "SELECT * FROM {table} {LIST_FILTER} ORDER BY fecha_ingreso DESC, id DESC LIMIT $5 OFFSET $6"
    ))
        .bind(&pattern)
        .bind(filter.estado)
        .bind(day_start)
        .bind(day_end)
        .bind(filter.page.limit)
        .bind(filter.page.offset())
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

    Ok(Page::new(items, total, filter.page))
}

async fn find<T>(pool: &PgPool, table: &str, id: &str) -> Result<Option<T>, AppError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    sqlx::query_as::<_, T>(&format!("SELECT * FROM {table} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)
}

async fn transition<T>(
    pool: &PgPool,
    table: &str,
    id: &str,
    transition: &Transition,
) -> Result<Option<T>, AppError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let allowed = (0..transition.from.len())
        .map(|i| format!("${}", i + 6))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {table} SET estado = $1, fecha_salida = COALESCE($2, fecha_salida), updated_by = $3, updated_at = $4 \
         WHERE id = $5 AND estado IN ({allowed}) RETURNING *"
    );

    let mut query = sqlx::query_as::<_, T>(&sql)
        .bind(transition.to)
        .bind(transition.stamps_exit.then_some(transition.at))
        .bind(&transition.actor)
        .bind(transition.at)
        .bind(id);
    for state in transition.from {
        query = query.bind(*state);
    }

    query.fetch_optional(pool).await.map_err(AppError::Database)
}

async fn delete(pool: &PgPool, table: &str, id: &str, not_found: &str) -> Result<(), AppError> {
    let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
        .bind(id)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(not_found.into()));
    }
    Ok(())
}

async fn statistics(pool: &PgPool, table: &str) -> Result<VisitStatistics, AppError> {
    sqlx::query_as::<_, VisitStatistics>(&format!(
        "SELECT COUNT(*) AS total_visitas, \
                COUNT(CASE WHEN estado = 'ingreso' THEN 1 END) AS visitas_activas, \
                COUNT(CASE WHEN estado = 'salida' THEN 1 END) AS visitas_completadas, \
                COUNT(CASE WHEN estado = 'cancelada' THEN 1 END) AS visitas_canceladas \
         FROM {table}"
    ))
        .fetch_one(pool)
        .await
        .map_err(AppError::Database)
}

pub struct PostgresVisitRepo {
    pool: PgPool,
}

impl PostgresVisitRepo {
    const TABLE: &'static str = "visitas";

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckInRepository<Visit> for PostgresVisitRepo {
    async fn create(&self, visit: &Visit) -> Result<Visit, AppError> {
        sqlx::query_as::<_, Visit>(
            "INSERT INTO visitas (id, nombre, apellido, apellido_paterno, apellido_materno, documento, departamento, \
             ingreso_vehiculo, fecha_ingreso, fecha_salida, estado, observaciones, created_by, updated_by, created_at, \
             updated_at, busqueda) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) RETURNING *"
        )
            .bind(&visit.id)
            .bind(&visit.nombre)
            .bind(&visit.apellido)
            .bind(&visit.apellido_paterno)
            .bind(&visit.apellido_materno)
            .bind(&visit.documento)
            .bind(&visit.departamento)
            .bind(visit.ingreso_vehiculo)
            .bind(visit.fecha_ingreso)
            .bind(visit.fecha_salida)
            .bind(visit.estado)
            .bind(&visit.observaciones)
            .bind(&visit.created_by)
            .bind(&visit.updated_by)
            .bind(visit.created_at)
            .bind(visit.updated_at)
            .bind(visit.search_key())
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Visit>, AppError> {
        find(&self.pool, Self::TABLE, id).await
    }

    async fn list(&self, filter: &VisitFilter) -> Result<Page<Visit>, AppError> {
        list_page(&self.pool, Self::TABLE, filter).await
    }

    async fn update(&self, visit: &Visit) -> Result<Visit, AppError> {
        sqlx::query_as::<_, Visit>(
            "UPDATE visitas SET nombre = $1, apellido = $2, apellido_paterno = $3, apellido_materno = $4, documento = $5, \
             departamento = $6, ingreso_vehiculo = $7, observaciones = $8, updated_by = $9, updated_at = $10, \
             busqueda = $11 WHERE id = $12 RETURNING *"
        )
            .bind(&visit.nombre)
            .bind(&visit.apellido)
            .bind(&visit.apellido_paterno)
            .bind(&visit.apellido_materno)
            .bind(&visit.documento)
            .bind(&visit.departamento)
            .bind(visit.ingreso_vehiculo)
            .bind(&visit.observaciones)
            .bind(&visit.updated_by)
            .bind(visit.updated_at)
            .bind(visit.search_key())
            .bind(&visit.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Visita no encontrada".into()))
    }

    async fn transition(&self, id: &str, t: &Transition) -> Result<Option<Visit>, AppError> {
        transition(&self.pool, Self::TABLE, id, t).await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        delete(&self.pool, Self::TABLE, id, "Visita no encontrada").await
    }

    async fn statistics(&self) -> Result<VisitStatistics, AppError> {
        statistics(&self.pool, Self::TABLE).await
    }
}

pub struct PostgresExternalVisitRepo {
    pool: PgPool,
}

impl PostgresExternalVisitRepo {
    const TABLE: &'static str = "visitas_externas";

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckInRepository<ExternalVisit> for PostgresExternalVisitRepo {
    async fn create(&self, visit: &ExternalVisit) -> Result<ExternalVisit, AppError> {
        sqlx::query_as::<_, ExternalVisit>(
            "INSERT INTO visitas_externas (id, nombre, apellido, documento, empresa, motivo, ubicacion_destino, contacto, \
             vehiculo, placa, tipo_visita, autorizacion, acompanantes, equipamiento, fecha_ingreso, fecha_salida, estado, \
             observaciones, created_by, updated_by, created_at, updated_at, busqueda) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, \
             $22, $23) RETURNING *"
        )
            .bind(&visit.id)
            .bind(&visit.nombre)
            .bind(&visit.apellido)
            .bind(&visit.documento)
            .bind(&visit.empresa)
            .bind(&visit.motivo)
            .bind(&visit.ubicacion_destino)
            .bind(&visit.contacto)
            .bind(&visit.vehiculo)
            .bind(&visit.placa)
            .bind(&visit.tipo_visita)
            .bind(&visit.autorizacion)
            .bind(&visit.acompanantes)
            .bind(&visit.equipamiento)
            .bind(visit.fecha_ingreso)
            .bind(visit.fecha_salida)
            .bind(visit.estado)
            .bind(&visit.observaciones)
            .bind(&visit.created_by)
            .bind(&visit.updated_by)
            .bind(visit.created_at)
            .bind(visit.updated_at)
            .bind(visit.search_key())
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ExternalVisit>, AppError> {
        find(&self.pool, Self::TABLE, id).await
    }

    async fn list(&self, filter: &VisitFilter) -> Result<Page<ExternalVisit>, AppError> {
        list_page(&self.pool, Self::TABLE, filter).await
    }

    async fn update(&self, visit: &ExternalVisit) -> Result<ExternalVisit, AppError> {
        sqlx::query_as::<_, ExternalVisit>(
            "UPDATE visitas_externas SET nombre = $1, apellido = $2, documento = $3, empresa = $4, motivo = $5, \
             ubicacion_destino = $6, contacto = $7, vehiculo = $8, placa = $9, tipo_visita = $10, autorizacion = $11, \
             acompanantes = $12, equipamiento = $13, observaciones = $14, updated_by = $15, updated_at = $16, \
             busqueda = $17 WHERE id = $18 RETURNING *"
        )
            .bind(&visit.nombre)
            .bind(&visit.apellido)
            .bind(&visit.documento)
            .bind(&visit.empresa)
            .bind(&visit.motivo)
            .bind(&visit.ubicacion_destino)
            .bind(&visit.contacto)
            .bind(&visit.vehiculo)
            .bind(&visit.placa)
            .bind(&visit.tipo_visita)
            .bind(&visit.autorizacion)
            .bind(&visit.acompanantes)
            .bind(&visit.equipamiento)
            .bind(&visit.observaciones)
            .bind(&visit.updated_by)
            .bind(visit.updated_at)
            .bind(visit.search_key())
            .bind(&visit.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Visita externa no encontrada".into()))
    }

    async fn transition(&self, id: &str, t: &Transition) -> Result<Option<ExternalVisit>, AppError> {
        transition(&self.pool, Self::TABLE, id, t).await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        delete(&self.pool, Self::TABLE, id, "Visita externa no encontrada").await
    }

    async fn statistics(&self) -> Result<VisitStatistics, AppError> {
        statistics(&self.pool, Self::TABLE).await
    }
}
