use serde::{Deserialize, Serialize};

use crate::domain::models::user::ROLE_ADMIN;

/// Bearer token payload: identity id, email, and global role.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn is_global_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}
