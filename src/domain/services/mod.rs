pub mod auth_service;
pub mod authorization;
pub mod resident_directory;
pub mod seed;
pub mod visit_lifecycle;
pub mod user_admin;
