use crate::domain::models::{
    access::{NotificationChannel, ProjectAccess},
    notification::Notification,
    project::Project,
    role::ProjectRole,
    ticket::Ticket,
    user::User,
};
use crate::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn list(&self) -> Result<Vec<User>, AppError>;
    async fn update(&self, user: &User) -> Result<User, AppError>;
    async fn touch_last_login(&self, id: &str) -> Result<(), AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create(&self, project: &Project) -> Result<Project, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Project>, AppError>;
    async fn find_by_number(&self, project_number: &str) -> Result<Option<Project>, AppError>;
    async fn list(&self) -> Result<Vec<Project>, AppError>;
    async fn update(&self, project: &Project) -> Result<Project, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AccessRepository: Send + Sync {
    async fn create(&self, access: &ProjectAccess) -> Result<ProjectAccess, AppError>;
    async fn find(&self, user_id: &str, project_id: &str) -> Result<Option<ProjectAccess>, AppError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ProjectAccess>, AppError>;
    async fn list_by_project(
        &self,
        project_id: &str,
        user_type: Option<&str>,
    ) -> Result<Vec<ProjectAccess>, AppError>;
    /// Project-level admins that want notifications, for escalation fan-out.
    async fn list_project_admins(&self, project_id: &str) -> Result<Vec<ProjectAccess>, AppError>;
    async fn list_by_role(&self, role_id: &str) -> Result<Vec<ProjectAccess>, AppError>;
    async fn count_by_role(&self, role_id: &str) -> Result<i64, AppError>;
    async fn update(&self, access: &ProjectAccess) -> Result<ProjectAccess, AppError>;
    async fn delete(&self, user_id: &str, project_id: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn create(&self, role: &ProjectRole) -> Result<ProjectRole, AppError>;
    async fn find_by_id(&self, project_id: &str, id: &str) -> Result<Option<ProjectRole>, AppError>;
    async fn list_by_project(
        &self,
        project_id: &str,
        active: Option<bool>,
    ) -> Result<Vec<ProjectRole>, AppError>;
    async fn update(&self, role: &ProjectRole) -> Result<ProjectRole, AppError>;
    async fn delete(&self, project_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn create(&self, ticket: &Ticket) -> Result<Ticket, AppError>;
    async fn find_by_id(&self, project_id: &str, id: &str) -> Result<Option<Ticket>, AppError>;
    async fn list_by_project(&self, project_id: &str) -> Result<Vec<Ticket>, AppError>;
    /// Tickets the given user created or is assigned to.
    async fn list_own(&self, project_id: &str, user_id: &str) -> Result<Vec<Ticket>, AppError>;
    async fn count_by_project(&self, project_id: &str) -> Result<i64, AppError>;
    async fn count_open_by_project(&self, project_id: &str) -> Result<i64, AppError>;
    async fn count_open_assigned(&self, project_id: &str, user_id: &str) -> Result<i64, AppError>;
    async fn update(&self, ticket: &Ticket) -> Result<Ticket, AppError>;
    async fn delete(&self, project_id: &str, id: &str) -> Result<(), AppError>;
}

#[derive(Debug, Default, Clone)]
pub struct NotificationFilter {
    pub project_id: Option<String>,
    pub is_read: Option<bool>,
    pub event_type: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &Notification) -> Result<Notification, AppError>;
    async fn find_by_id(&self, id: &str, user_id: &str) -> Result<Option<Notification>, AppError>;
    async fn list_for_user(
        &self,
        user_id: &str,
        filter: &NotificationFilter,
    ) -> Result<Vec<Notification>, AppError>;
    async fn count_for_user(&self, user_id: &str, filter: &NotificationFilter) -> Result<i64, AppError>;
    async fn unread_count(&self, user_id: &str, project_id: Option<&str>) -> Result<i64, AppError>;
    async fn mark_read(&self, id: &str, user_id: &str) -> Result<Option<Notification>, AppError>;
    async fn mark_all_read(&self, user_id: &str, project_id: Option<&str>) -> Result<u64, AppError>;
    async fn delete(&self, id: &str, user_id: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait DeliveryService: Send + Sync {
    async fn deliver(
        &self,
        channel: NotificationChannel,
        notification: &Notification,
    ) -> Result<(), AppError>;
}
