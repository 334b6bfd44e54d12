use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;

/// Advisory capability bundle carried by a role template. Enforcement always
/// reads the grant's own flags; this only seeds and documents them.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct RolePermissions {
    pub can_create_tickets: bool,
    pub can_edit_tickets: bool,
    pub can_assign_tickets: bool,
    pub can_delete_tickets: bool,
    pub can_view_all_tickets: bool,
    pub can_approve_workflow: bool,
}

impl Default for RolePermissions {
    fn default() -> Self {
        Self {
            can_create_tickets: true,
            can_edit_tickets: true,
            can_assign_tickets: false,
            can_delete_tickets: false,
            can_view_all_tickets: false,
            can_approve_workflow: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct WeekdayHours {
    pub monday: Option<TimeWindow>,
    pub tuesday: Option<TimeWindow>,
    pub wednesday: Option<TimeWindow>,
    pub thursday: Option<TimeWindow>,
    pub friday: Option<TimeWindow>,
    pub saturday: Option<TimeWindow>,
    pub sunday: Option<TimeWindow>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRole {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: String,
    pub permissions: Json<RolePermissions>,
    pub specialization: Json<Vec<String>>,
    pub skill_level: String,
    pub working_hours: Option<Json<WeekdayHours>>,
    pub max_concurrent_tickets: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewRoleParams {
    pub project_id: String,
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

impl ProjectRole {
    pub fn new(params: NewRoleParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            project_id: params.project_id,
            name: params.name,
            description: params.description,
            color: params.color.unwrap_or_else(|| "#007AFF".to_string()),
            icon: params.icon.unwrap_or_else(|| "person.fill".to_string()),
            permissions: Json(params.permissions.unwrap_or_default()),
            specialization: Json(params.specialization.unwrap_or_default()),
            skill_level: params.skill_level.unwrap_or_else(|| "Mid-Level".to_string()),
            working_hours: params.working_hours.map(Json),
            max_concurrent_tickets: params.max_concurrent_tickets,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
