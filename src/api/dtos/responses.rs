use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::models::pagination::Page;
use crate::domain::models::permissions::Permissions;
use crate::domain::models::role::{Profile, Role};
use crate::domain::models::user::User;
use crate::domain::services::user_admin::UserDetails;

/// Envelope shared by every endpoint that does not paginate.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, message: None, data: Some(data) }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self { success: true, message: Some(message.into()), data: Some(data) }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self { success: true, message: Some(message.into()), data: None }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl<T> From<&Page<T>> for Pagination {
    fn from(page: &Page<T>) -> Self {
        let total_pages = page.total_pages();
        Self {
            page: page.page,
            limit: page.limit,
            total: page.total,
            total_pages,
            has_next_page: page.page < total_pages,
            has_prev_page: page.page > 1,
        }
    }
}

#[derive(Serialize)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> From<Page<T>> for PaginatedResponse<T> {
    fn from(page: Page<T>) -> Self {
        let pagination = Pagination::from(&page);
        Self { success: true, data: page.items, pagination }
    }
}

#[derive(Serialize)]
pub struct RoleSummary {
    pub id: String,
    pub nombre: String,
    pub nivel_acceso: i32,
    pub color: Option<String>,
    pub icono: Option<String>,
}

impl From<Role> for RoleSummary {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            nombre: role.nombre,
            nivel_acceso: role.nivel_acceso,
            color: role.color,
            icono: role.icono,
        }
    }
}

#[derive(Serialize)]
pub struct ProfileSummary {
    pub id: String,
    pub nombre: String,
    pub permisos: Permissions,
    pub nivel_seguridad: i32,
}

impl From<Profile> for ProfileSummary {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            nombre: profile.nombre,
            permisos: profile.permisos.0,
            nivel_seguridad: profile.nivel_seguridad,
        }
    }
}

/// A user as the dashboard sees it: the row plus its role and profile.
#[derive(Serialize)]
pub struct UserResponse {
    #[serde(flatten)]
    pub user: User,
    pub role: Option<RoleSummary>,
    pub profile: Option<ProfileSummary>,
}

impl From<UserDetails> for UserResponse {
    fn from(details: UserDetails) -> Self {
        Self {
            user: details.user,
            role: details.role.map(Into::into),
            profile: details.profile.map(Into::into),
        }
    }
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub uptime: u64,
    pub environment: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::pagination::PageRequest;

    #[test]
    fn test_pagination_flags() {
        let page = Page::new(vec![0; 10], 25, PageRequest::new(Some(2), Some(10)));
        assert_eq!(
            Pagination::from(&page),
            Pagination { page: 2, limit: 10, total: 25, total_pages: 3, has_next_page: true, has_prev_page: true }
        );

        let last = Page::new(vec![0; 5], 25, PageRequest::new(Some(3), Some(10)));
        let pagination = Pagination::from(&last);
        assert!(!pagination.has_next_page);
    }

    #[test]
    fn test_pagination_serializes_camel_case() {
        let page: Page<i32> = Page::new(vec![], 0, PageRequest::default());
        let json = serde_json::to_value(PaginatedResponse::from(page)).unwrap();
        assert_eq!(json["pagination"]["totalPages"], 0);
        assert_eq!(json["pagination"]["hasNextPage"], false);
        assert_eq!(json["data"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn test_message_only_envelope_omits_data() {
        let json = serde_json::to_value(ApiResponse::message("ok")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "message": "ok" }));
    }
}
