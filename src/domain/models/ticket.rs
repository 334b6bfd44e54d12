use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub project_id: String,
    pub ticket_number: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub assigned_to_id: Option<String>,
    pub created_by_id: Option<String>,
    pub watcher_ids: Json<Vec<String>>,
    pub cc_ids: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewTicketParams {
    pub project_id: String,
    pub ticket_number: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Option<String>,
    pub assigned_to_id: Option<String>,
    pub created_by_id: Option<String>,
}

impl Ticket {
    pub fn new(params: NewTicketParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            project_id: params.project_id,
            ticket_number: params.ticket_number,
            title: params.title,
            description: params.description,
            category: params.category,
            priority: params.priority.unwrap_or_else(|| "Normal".to_string()),
            status: "New".to_string(),
            assigned_to_id: params.assigned_to_id,
            created_by_id: params.created_by_id,
            watcher_ids: Json(Vec::new()),
            cc_ids: Json(Vec::new()),
            created_at: now,
            updated_at: now,
        }
    }

    /// `{projectNumber}-TKT-{0001}`. The sequence comes from the current
    /// per-project ticket count, so concurrent creates in one project can
    /// produce duplicate numbers.
    pub fn format_number(project_number: &str, sequence: i64) -> String {
        format!("{}-TKT-{:04}", project_number, sequence)
    }
}

pub const OPEN_STATUSES: [&str; 3] = ["New", "Open", "InProgress"];
