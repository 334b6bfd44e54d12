use serde::Deserialize;

use crate::domain::models::access::{AccessLevel, NotificationChannel};
use crate::domain::models::role::{RolePermissions, WeekdayHours};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub role: Option<String>,
    pub is_technician: Option<bool>,
    /// Grants to create alongside the account.
    #[serde(default)]
    pub projects: Vec<ProjectAssignment>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAssignment {
    pub project_id: String,
    #[serde(flatten)]
    pub grant: GrantAccessRequest,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub role: Option<String>,
    pub is_technician: Option<bool>,
    pub is_active: Option<bool>,
}

/// Grant payload for user management and member endpoints. Every field is
/// optional so the grant defaults apply to anything left out.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GrantAccessRequest {
    pub role_id: Option<String>,
    pub access_level: Option<AccessLevel>,
    pub user_type: Option<String>,
    pub can_create_tickets: Option<bool>,
    pub can_edit_tickets: Option<bool>,
    pub can_assign_tickets: Option<bool>,
    pub can_delete_tickets: Option<bool>,
    pub can_approve_workflow: Option<bool>,
    pub can_view_all_tickets: Option<bool>,
    pub receive_notifications: Option<bool>,
    pub notification_channels: Option<Vec<NotificationChannel>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: String,
    #[serde(flatten)]
    pub grant: GrantAccessRequest,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    pub project_number: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub permissions: Option<RolePermissions>,
    pub specialization: Option<Vec<String>>,
    pub skill_level: Option<String>,
    pub working_hours: Option<WeekdayHours>,
    pub max_concurrent_tickets: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub permissions: Option<RolePermissions>,
    pub specialization: Option<Vec<String>>,
    pub skill_level: Option<String>,
    pub working_hours: Option<WeekdayHours>,
    pub max_concurrent_tickets: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRoleMemberRequest {
    pub user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Option<String>,
    pub assigned_to_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTicketRequest {
    pub assigned_to: String,
    pub cc_contacts: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub notify_watchers: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWatcherRequest {
    pub user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    pub project_id: String,
    pub receive_notifications: Option<bool>,
    pub notification_channels: Option<Vec<NotificationChannel>>,
}
