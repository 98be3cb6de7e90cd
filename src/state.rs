use std::sync::Arc;
use crate::domain::models::{external_visit::ExternalVisit, visit::Visit};
use crate::domain::ports::{AuthRepository, ProfileRepository, RoleRepository, UserRepository};
use crate::domain::services::{
    auth_service::AuthService, resident_directory::ResidentDirectory, user_admin::UserAdmin,
    visit_lifecycle::VisitLifecycle,
};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub role_repo: Arc<dyn RoleRepository>,
    pub profile_repo: Arc<dyn ProfileRepository>,
    pub auth_repo: Arc<dyn AuthRepository>,
    pub auth_service: Arc<AuthService>,
    pub users: Arc<UserAdmin>,
    pub residents: Arc<ResidentDirectory>,
    pub visits: Arc<VisitLifecycle<Visit>>,
    pub external_visits: Arc<VisitLifecycle<ExternalVisit>>,
    pub started_at: std::time::Instant,
}
