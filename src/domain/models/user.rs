use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_USER: &str = "USER";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub role: String,
    pub is_technician: bool,
    pub is_active: bool,
    pub created_by: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewUserParams {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub role: Option<String>,
    pub is_technician: bool,
    pub created_by: Option<String>,
}

impl User {
    pub fn new(params: NewUserParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            first_name: params.first_name,
            last_name: params.last_name,
            email: params.email,
            password_hash: params.password_hash,
            phone_number: params.phone_number,
            role: params.role.unwrap_or_else(|| ROLE_USER.to_string()),
            is_technician: params.is_technician,
            is_active: true,
            created_by: params.created_by,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_global_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}
