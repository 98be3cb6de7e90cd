pub mod sqlite_auth_repo;
pub mod sqlite_resident_repo;
pub mod sqlite_role_repo;
pub mod sqlite_user_repo;
pub mod sqlite_visit_repo;

pub mod postgres_auth_repo;
pub mod postgres_resident_repo;
pub mod postgres_role_repo;
pub mod postgres_user_repo;
pub mod postgres_visit_repo;
