pub mod auth;
pub mod external_visit;
pub mod fields;
pub mod pagination;
pub mod permissions;
pub mod resident;
pub mod role;
pub mod user;
pub mod visit;
