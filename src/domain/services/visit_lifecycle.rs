use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::domain::models::pagination::Page;
use crate::domain::models::visit::{
    CancelPolicy, CheckIn, Transition, TransitionError, VisitFilter, VisitStatistics,
};
use crate::domain::ports::CheckInRepository;
use crate::error::AppError;

/// Check-in / check-out workflow shared by guest and external visits.
pub struct VisitLifecycle<T: CheckIn> {
    repo: Arc<dyn CheckInRepository<T>>,
    cancel_policy: CancelPolicy,
}

impl<T: CheckIn> VisitLifecycle<T> {
    pub fn new(repo: Arc<dyn CheckInRepository<T>>, cancel_policy: CancelPolicy) -> Self {
        Self { repo, cancel_policy }
    }

    pub async fn create(&self, draft: T::Draft, actor: &str) -> Result<T, AppError> {
        let record = T::from_draft(draft, actor, Utc::now())
            .map_err(|errors| AppError::fields("Faltan campos obligatorios", errors))?;
        let created = self.repo.create(&record).await?;
        info!("Registered {} {} by {}", T::KIND, created.id(), actor);
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> Result<T, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(T::NOT_FOUND.to_string()))
    }

    pub async fn list(&self, filter: &VisitFilter) -> Result<Page<T>, AppError> {
        self.repo.list(filter).await
    }

    pub async fn update(&self, id: &str, patch: T::Patch, actor: &str) -> Result<T, AppError> {
        let mut record = self.get(id).await?;
        record
            .apply(patch, actor, Utc::now())
            .map_err(|errors| AppError::fields("Datos de actualización inválidos", errors))?;
        let updated = self.repo.update(&record).await?;
        info!("Updated {} {} by {}", T::KIND, id, actor);
        Ok(updated)
    }

    pub async fn register_exit(&self, id: &str, actor: &str) -> Result<T, AppError> {
        self.run(id, Transition::exit(actor, Utc::now())).await
    }

    pub async fn cancel(&self, id: &str, actor: &str) -> Result<T, AppError> {
        self.run(id, Transition::cancel(self.cancel_policy, actor, Utc::now())).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.repo.delete(id).await?;
        info!("Deleted {} {}", T::KIND, id);
        Ok(())
    }

    pub async fn statistics(&self) -> Result<VisitStatistics, AppError> {
        self.repo.statistics().await
    }

    async fn run(&self, id: &str, transition: Transition) -> Result<T, AppError> {
        let current = self.get(id).await?;
        transition.check(current.estado())?;

        if let Some(updated) = self.repo.transition(id, &transition).await? {
            info!("{} {} moved {:?} -> {:?} by {}", T::KIND, id, current.estado(), transition.to, transition.actor);
            return Ok(updated);
        }

        // Lost a race: report against whatever state won.
        let latest = self.get(id).await?;
        transition.check(latest.estado())?;
        Err(TransitionError::NotAllowed.into())
    }
}
