use std::sync::Arc;

use crate::config::Config;
use crate::domain::ports::{
    AccessRepository, NotificationRepository, ProjectRepository, RoleRepository, TicketRepository,
    UserRepository,
};
use crate::domain::services::fanout::NotificationFanout;

pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub project_repo: Arc<dyn ProjectRepository>,
    pub access_repo: Arc<dyn AccessRepository>,
    pub role_repo: Arc<dyn RoleRepository>,
    pub ticket_repo: Arc<dyn TicketRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub notifier: Arc<NotificationFanout>,
}
