use serde::Serialize;
use serde_json::json;

use crate::domain::models::access::{AccessLevel, ProjectAccess};
use crate::domain::models::project::Project;
use crate::domain::models::role::ProjectRole;
use crate::domain::models::user::User;

/// Every successful response is wrapped the same way.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

pub fn envelope<T: Serialize>(data: T) -> axum::Json<ApiResponse<T>> {
    axum::Json(ApiResponse {
        success: true,
        data,
    })
}

/// Project annotated with the caller's relationship to it, as returned by
/// login and the project listing.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    pub open_tickets: i64,
    pub access_level: Option<AccessLevel>,
    pub user_type: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub token: String,
    pub user: User,
    pub available_projects: Vec<ProjectSummary>,
    pub auto_selected_project: Option<ProjectSummary>,
    pub requires_project_selection: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberWithRole {
    #[serde(flatten)]
    pub access: ProjectAccess,
    pub user: Option<UserSummary>,
    pub role: Option<ProjectRole>,
}

/// Public slice of a user row for member listings.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub is_technician: bool,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            is_technician: user.is_technician,
        }
    }
}

/// Assignability of one technician, sorted by workload on the wire.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianAvailability {
    pub id: String,
    pub user: Option<UserSummary>,
    pub user_type: String,
    pub role: Option<RoleSummary>,
    pub current_tickets: i64,
    pub max_tickets: i32,
    pub workload: f64,
    pub available: bool,
    pub availability_status: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub specialization: Vec<String>,
    pub skill_level: String,
}

impl From<&ProjectRole> for RoleSummary {
    fn from(role: &ProjectRole) -> Self {
        Self {
            id: role.id.clone(),
            name: role.name.clone(),
            color: role.color.clone(),
            icon: role.icon.clone(),
            specialization: role.specialization.0.clone(),
            skill_level: role.skill_level.clone(),
        }
    }
}

/// Workload buckets used by the availability endpoints.
pub fn availability_status(workload: f64) -> &'static str {
    if workload >= 0.9 {
        "unavailable"
    } else if workload >= 0.7 {
        "limited"
    } else if workload >= 0.5 {
        "busy"
    } else {
        "available"
    }
}

/// Listing envelope with the page window alongside the data, matching the
/// original wire shape `{success, data, pagination}`.
#[derive(Serialize)]
pub struct PagedResponse<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Serialize)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

pub fn paged<T: Serialize>(data: Vec<T>, total: i64, limit: i64, offset: i64) -> axum::Json<PagedResponse<T>> {
    axum::Json(PagedResponse {
        success: true,
        data,
        pagination: Pagination { total, limit, offset },
    })
}

pub fn deleted_message(what: &str) -> serde_json::Value {
    json!({ "message": format!("{} deleted successfully", what) })
}
