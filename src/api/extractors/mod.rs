pub mod auth;
pub mod project_access;
