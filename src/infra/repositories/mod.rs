pub mod sqlite_access_repo;
pub mod sqlite_notification_repo;
pub mod sqlite_project_repo;
pub mod sqlite_role_repo;
pub mod sqlite_ticket_repo;
pub mod sqlite_user_repo;
