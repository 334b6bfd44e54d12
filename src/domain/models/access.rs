use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;

/// Coarse per-project tier. Distinct from the global identity role:
/// `AccessLevel::Admin` grants everything on one project, a global `ADMIN`
/// identity bypasses grants entirely.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum AccessLevel {
    Read,
    Write,
    Admin,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Push,
    Email,
    Sms,
}

impl NotificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationChannel::Push => "push",
            NotificationChannel::Email => "email",
            NotificationChannel::Sms => "sms",
        }
    }
}

/// One user's permitted relationship to one project. At most one row per
/// `(user_id, project_id)` pair, enforced by a UNIQUE constraint.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAccess {
    pub id: String,
    pub user_id: String,
    pub project_id: String,
    pub role_id: Option<String>,
    pub access_level: AccessLevel,
    pub user_type: String,
    pub can_create_tickets: bool,
    pub can_edit_tickets: bool,
    pub can_assign_tickets: bool,
    pub can_delete_tickets: bool,
    pub can_approve_workflow: bool,
    pub can_view_all_tickets: bool,
    pub receive_notifications: bool,
    pub notification_channels: Json<Vec<NotificationChannel>>,
    pub granted_by: Option<String>,
    pub granted_at: DateTime<Utc>,
}

pub struct NewAccessParams {
    pub user_id: String,
    pub project_id: String,
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
    pub granted_by: Option<String>,
}

impl ProjectAccess {
    pub fn new(params: NewAccessParams) -> Self {
        // Absent channel list defaults to push, matching grant creation
        // everywhere (seed, member add, user assignment).
        let channels = params
            .notification_channels
            .unwrap_or_else(|| vec![NotificationChannel::Push]);

        Self {
            id: Uuid::new_v4().to_string(),
            user_id: params.user_id,
            project_id: params.project_id,
            role_id: params.role_id,
            access_level: params.access_level.unwrap_or(AccessLevel::Read),
            user_type: params.user_type.unwrap_or_else(|| "guest".to_string()),
            can_create_tickets: params.can_create_tickets.unwrap_or(true),
            can_edit_tickets: params.can_edit_tickets.unwrap_or(true),
            can_assign_tickets: params.can_assign_tickets.unwrap_or(false),
            can_delete_tickets: params.can_delete_tickets.unwrap_or(false),
            can_approve_workflow: params.can_approve_workflow.unwrap_or(false),
            can_view_all_tickets: params.can_view_all_tickets.unwrap_or(false),
            receive_notifications: params.receive_notifications.unwrap_or(true),
            notification_channels: Json(channels),
            granted_by: params.granted_by,
            granted_at: Utc::now(),
        }
    }
}
