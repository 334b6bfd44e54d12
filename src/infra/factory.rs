use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::services::fanout::NotificationFanout;
use crate::infra::delivery::http_delivery_service::HttpDeliveryService;
use crate::infra::repositories::{
    sqlite_access_repo::SqliteAccessRepo, sqlite_notification_repo::SqliteNotificationRepo,
    sqlite_project_repo::SqliteProjectRepo, sqlite_role_repo::SqliteRoleRepo,
    sqlite_ticket_repo::SqliteTicketRepo, sqlite_user_repo::SqliteUserRepo,
};
use crate::state::AppState;

pub async fn bootstrap_state(config: &Config) -> AppState {
    info!("Initializing SQLite connection with WAL Mode...");

    let opts = SqliteConnectOptions::from_str(&config.database_url)
        .expect("Invalid SQLite connection string")
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await
        .expect("Failed to connect to SQLite");

    run_migrations(&pool).await;

    let delivery_service = Arc::new(HttpDeliveryService::new(
        config.delivery_gateway_url.clone(),
        config.delivery_gateway_token.clone(),
    ));

    let access_repo = Arc::new(SqliteAccessRepo::new(pool.clone()));
    let notification_repo = Arc::new(SqliteNotificationRepo::new(pool.clone()));

    let notifier = Arc::new(NotificationFanout::new(
        access_repo.clone(),
        notification_repo.clone(),
        delivery_service,
    ));

    AppState {
        config: config.clone(),
        user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
        project_repo: Arc::new(SqliteProjectRepo::new(pool.clone())),
        access_repo,
        role_repo: Arc::new(SqliteRoleRepo::new(pool.clone())),
        ticket_repo: Arc::new(SqliteTicketRepo::new(pool.clone())),
        notification_repo,
        notifier,
    }
}

async fn run_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
