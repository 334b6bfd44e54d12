use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;

use crate::domain::models::access::NotificationChannel;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub project_id: Option<String>,
    pub ticket_id: Option<String>,
    pub event_type: String,
    pub title: String,
    pub body: Option<String>,
    pub channels: Json<Vec<NotificationChannel>>,
    pub priority: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

pub struct NewNotificationParams {
    pub user_id: String,
    pub project_id: Option<String>,
    pub ticket_id: Option<String>,
    pub event_type: String,
    pub title: String,
    pub body: Option<String>,
    pub channels: Option<Vec<NotificationChannel>>,
    pub priority: Option<String>,
}

impl Notification {
    pub fn new(params: NewNotificationParams) -> Self {
        let channels = params
            .channels
            .unwrap_or_else(|| vec![NotificationChannel::Push]);

        Self {
            id: Uuid::new_v4().to_string(),
            user_id: params.user_id,
            project_id: params.project_id,
            ticket_id: params.ticket_id,
            event_type: params.event_type,
            title: params.title,
            body: params.body,
            channels: Json(channels),
            priority: params.priority.unwrap_or_else(|| "normal".to_string()),
            is_read: false,
            read_at: None,
            sent_at: Some(Utc::now()),
            created_at: Utc::now(),
        }
    }
}
