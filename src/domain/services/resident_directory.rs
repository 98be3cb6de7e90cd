use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::domain::models::pagination::Page;
use crate::domain::models::resident::{Resident, ResidentDraft, ResidentFilter, ResidentPatch, ResidentStatistics};
use crate::domain::ports::ResidentRepository;
use crate::error::AppError;

const NOT_FOUND: &str = "Residente no encontrado";

pub struct ResidentDirectory {
    repo: Arc<dyn ResidentRepository>,
}

impl ResidentDirectory {
    pub fn new(repo: Arc<dyn ResidentRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, filter: &ResidentFilter) -> Result<Page<Resident>, AppError> {
        self.repo.list(filter).await
    }

    pub async fn get(&self, id: &str) -> Result<Resident, AppError> {
        self.repo.find_by_id(id).await?.ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
    }

    pub async fn create(&self, draft: ResidentDraft, actor: &str) -> Result<Resident, AppError> {
        let resident = Resident::from_draft(draft, actor, Utc::now())
            .map_err(|errors| AppError::fields("Datos de validación incorrectos", errors))?;

        if self.repo.find_by_documento(&resident.documento).await?.is_some() {
            return Err(AppError::Conflict("Ya existe un residente con este número de documento".into()));
        }

        let created = self.repo.create(&resident).await?;
        info!("Registered resident {} in unit {}", created.id, created.departamento);
        Ok(created)
    }

    pub async fn update(&self, id: &str, patch: ResidentPatch, actor: &str) -> Result<Resident, AppError> {
        let mut resident = self.get(id).await?;
        let previous_documento = resident.documento.clone();

        resident
            .apply(patch, actor, Utc::now())
            .map_err(|errors| AppError::fields("Datos de validación incorrectos", errors))?;

        if resident.documento != previous_documento
            && let Some(other) = self.repo.find_by_documento(&resident.documento).await?
            && other.id != resident.id
        {
            return Err(AppError::Conflict("Ya existe otro residente con este número de documento".into()));
        }

        let updated = self.repo.update(&resident).await?;
        info!("Updated resident {} by {}", id, actor);
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.repo.delete(id).await?;
        info!("Deleted resident {}", id);
        Ok(())
    }

    /// Active residents of one unit, by name.
    pub async fn list_by_departamento(&self, departamento: &str) -> Result<Vec<Resident>, AppError> {
        self.repo.list_by_departamento(departamento).await
    }

    pub async fn statistics(&self) -> Result<ResidentStatistics, AppError> {
        self.repo.statistics().await
    }
}
