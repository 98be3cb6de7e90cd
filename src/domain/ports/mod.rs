use crate::domain::models::{
    auth::RevokedToken,
    pagination::Page,
    resident::{Resident, ResidentFilter, ResidentStatistics},
    role::{Profile, Role},
    user::{User, UserFilter},
    visit::{CheckIn, Transition, VisitFilter, VisitStatistics},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    /// Includes soft-deleted rows so callers can tell "gone" from "disabled".
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    /// True when any row, soft-deleted or not, holds the username.
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn list(&self, filter: &UserFilter) -> Result<Page<User>, AppError>;
    async fn update(&self, user: &User) -> Result<User, AppError>;
    async fn soft_delete(&self, id: &str, actor: &str) -> Result<(), AppError>;
    async fn touch_last_access(&self, id: &str, at: DateTime<Utc>) -> Result<(), AppError>;
}

#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn create(&self, role: &Role) -> Result<Role, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Role>, AppError>;
    async fn find_by_name(&self, nombre: &str) -> Result<Option<Role>, AppError>;
    async fn list_active(&self) -> Result<Vec<Role>, AppError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn create(&self, profile: &Profile) -> Result<Profile, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Profile>, AppError>;
    async fn find_by_name(&self, nombre: &str) -> Result<Option<Profile>, AppError>;
    async fn list_active(&self) -> Result<Vec<Profile>, AppError>;
}

#[async_trait]
pub trait ResidentRepository: Send + Sync {
    async fn create(&self, resident: &Resident) -> Result<Resident, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Resident>, AppError>;
    async fn find_by_documento(&self, documento: &str) -> Result<Option<Resident>, AppError>;
    async fn list(&self, filter: &ResidentFilter) -> Result<Page<Resident>, AppError>;
    async fn list_by_departamento(&self, departamento: &str) -> Result<Vec<Resident>, AppError>;
    async fn update(&self, resident: &Resident) -> Result<Resident, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn statistics(&self) -> Result<ResidentStatistics, AppError>;
}

/// Storage for records that follow the check-in lifecycle.
#[async_trait]
pub trait CheckInRepository<T: CheckIn>: Send + Sync {
    async fn create(&self, record: &T) -> Result<T, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<T>, AppError>;
    async fn list(&self, filter: &VisitFilter) -> Result<Page<T>, AppError>;
    /// Writes descriptive fields only; estado and both timestamps are left alone.
    async fn update(&self, record: &T) -> Result<T, AppError>;
    /// Applies the transition only while the row is still in an allowed prior
    /// state. `None` means the row is missing or was moved on concurrently.
    async fn transition(&self, id: &str, transition: &Transition) -> Result<Option<T>, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn statistics(&self) -> Result<VisitStatistics, AppError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn revoke(&self, token: &RevokedToken) -> Result<(), AppError>;
    async fn is_revoked(&self, jti: &str) -> Result<bool, AppError>;
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}
