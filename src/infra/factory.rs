use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::error::BootError;
use crate::state::AppState;
use crate::domain::models::{external_visit::ExternalVisit, visit::Visit};
use crate::domain::ports::{AuthRepository, ProfileRepository, ResidentRepository, RoleRepository, UserRepository};
use crate::domain::services::{
    auth_service::AuthService, resident_directory::ResidentDirectory, user_admin::UserAdmin,
    visit_lifecycle::VisitLifecycle,
};
use crate::infra::repositories::{
    postgres_auth_repo::PostgresAuthRepo, postgres_resident_repo::PostgresResidentRepo,
    postgres_role_repo::{PostgresProfileRepo, PostgresRoleRepo}, postgres_user_repo::PostgresUserRepo,
    postgres_visit_repo::{PostgresExternalVisitRepo, PostgresVisitRepo},
    sqlite_auth_repo::SqliteAuthRepo, sqlite_resident_repo::SqliteResidentRepo,
    sqlite_role_repo::{SqliteProfileRepo, SqliteRoleRepo}, sqlite_user_repo::SqliteUserRepo,
    sqlite_visit_repo::{SqliteExternalVisitRepo, SqliteVisitRepo},
};

/// Connects to the database named by `DATABASE_URL`, migrates it and wires
/// the repositories for that backend.
pub async fn bootstrap_state(config: &Config) -> Result<AppState, BootError> {
    let database_url = &config.database_url;

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let opts = PgConnectOptions::from_str(database_url)?
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await?;

        sqlx::migrate!("./migrations/postgres").run(&pool).await?;
        postgres_state(pool, config)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true)
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        sqlx::migrate!("./migrations/sqlite").run(&pool).await?;
        sqlite_state(pool, config)
    }
}

pub fn postgres_state(pool: PgPool, config: &Config) -> Result<AppState, BootError> {
    let visits = Arc::new(PostgresVisitRepo::new(pool.clone()));
    let external_visits = Arc::new(PostgresExternalVisitRepo::new(pool.clone()));

    assemble(
        config,
        Arc::new(PostgresUserRepo::new(pool.clone())),
        Arc::new(PostgresRoleRepo::new(pool.clone())),
        Arc::new(PostgresProfileRepo::new(pool.clone())),
        Arc::new(PostgresAuthRepo::new(pool.clone())),
        Arc::new(PostgresResidentRepo::new(pool)),
        VisitLifecycle::new(visits, config.cancel_policy),
        VisitLifecycle::new(external_visits, config.cancel_policy),
    )
}

pub fn sqlite_state(pool: SqlitePool, config: &Config) -> Result<AppState, BootError> {
    let visits = Arc::new(SqliteVisitRepo::new(pool.clone()));
    let external_visits = Arc::new(SqliteExternalVisitRepo::new(pool.clone()));

    assemble(
        config,
        Arc::new(SqliteUserRepo::new(pool.clone())),
        Arc::new(SqliteRoleRepo::new(pool.clone())),
        Arc::new(SqliteProfileRepo::new(pool.clone())),
        Arc::new(SqliteAuthRepo::new(pool.clone())),
        Arc::new(SqliteResidentRepo::new(pool)),
        VisitLifecycle::new(visits, config.cancel_policy),
        VisitLifecycle::new(external_visits, config.cancel_policy),
    )
}

#[allow(clippy::too_many_arguments)]
fn assemble(
    config: &Config,
    user_repo: Arc<dyn UserRepository>,
    role_repo: Arc<dyn RoleRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    auth_repo: Arc<dyn AuthRepository>,
    resident_repo: Arc<dyn ResidentRepository>,
    visits: VisitLifecycle<Visit>,
    external_visits: VisitLifecycle<ExternalVisit>,
) -> Result<AppState, BootError> {
    let auth_service =
        AuthService::new(user_repo.clone(), profile_repo.clone(), auth_repo.clone(), config.clone())?;
    let users = UserAdmin::new(
        user_repo.clone(),
        role_repo.clone(),
        profile_repo.clone(),
        config.password_min_length,
    );

    Ok(AppState {
        config: config.clone(),
        user_repo,
        role_repo,
        profile_repo,
        auth_repo,
        auth_service: Arc::new(auth_service),
        users: Arc::new(users),
        residents: Arc::new(ResidentDirectory::new(resident_repo)),
        visits: Arc::new(visits),
        external_visits: Arc::new(external_visits),
        started_at: Instant::now(),
    })
}
