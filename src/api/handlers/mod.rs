pub mod auth;
pub mod health;
pub mod resident;
pub mod user;
pub mod visit;
