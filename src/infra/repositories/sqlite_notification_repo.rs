use crate::domain::{
    models::notification::Notification,
    ports::{NotificationFilter, NotificationRepository},
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Arguments, SqlitePool};

pub struct SqliteNotificationRepo {
    pool: SqlitePool,
}

impl SqliteNotificationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn filter_clause(
        user_id: &str,
        filter: &NotificationFilter,
    ) -> Result<(String, SqliteArguments<'static>), AppError> {
        let mut clause = String::from("user_id = ?");
        let mut args = SqliteArguments::default();
        args.add(user_id.to_string())
            .map_err(|_| AppError::Internal)?;

        if let Some(project_id) = &filter.project_id {
            clause.push_str(" AND project_id = ?");
            args.add(project_id.clone()).map_err(|_| AppError::Internal)?;
        }
        if let Some(is_read) = filter.is_read {
            clause.push_str(" AND is_read = ?");
            args.add(is_read).map_err(|_| AppError::Internal)?;
        }
        if let Some(event_type) = &filter.event_type {
            clause.push_str(" AND event_type = ?");
            args.add(event_type.clone()).map_err(|_| AppError::Internal)?;
        }

        Ok((clause, args))
    }
}

#[async_trait]
impl NotificationRepository for SqliteNotificationRepo {
    async fn create(&self, notification: &Notification) -> Result<Notification, AppError> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (id, user_id, project_id, ticket_id, event_type, title, body, channels, priority, is_read, read_at, sent_at, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&notification.id)
            .bind(&notification.user_id)
            .bind(&notification.project_id)
            .bind(&notification.ticket_id)
            .bind(&notification.event_type)
            .bind(&notification.title)
            .bind(&notification.body)
            .bind(&notification.channels)
            .bind(&notification.priority)
            .bind(notification.is_read)
            .bind(notification.read_at)
            .bind(notification.sent_at)
            .bind(notification.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str, user_id: &str) -> Result<Option<Notification>, AppError> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE id = ? AND user_id = ?",
        )
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        filter: &NotificationFilter,
    ) -> Result<Vec<Notification>, AppError> {
        let (clause, mut args) = Self::filter_clause(user_id, filter)?;
        let sql = format!(
            "SELECT * FROM notifications WHERE {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            clause
        );
        args.add(filter.limit).map_err(|_| AppError::Internal)?;
        args.add(filter.offset).map_err(|_| AppError::Internal)?;

        sqlx::query_as_with::<_, Notification, _>(&sql, args)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_for_user(
        &self,
        user_id: &str,
        filter: &NotificationFilter,
    ) -> Result<i64, AppError> {
        let (clause, args) = Self::filter_clause(user_id, filter)?;
        let sql = format!("SELECT COUNT(*) FROM notifications WHERE {}", clause);

        sqlx::query_scalar_with::<_, i64, _>(&sql, args)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn unread_count(&self, user_id: &str, project_id: Option<&str>) -> Result<i64, AppError> {
        match project_id {
            Some(project_id) => sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND project_id = ? AND is_read = 0",
            )
                .bind(user_id)
                .bind(project_id)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::Database),
            None => sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0",
            )
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::Database),
        }
    }

    async fn mark_read(&self, id: &str, user_id: &str) -> Result<Option<Notification>, AppError> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = 1, read_at = CURRENT_TIMESTAMP WHERE id = ? AND user_id = ? RETURNING *",
        )
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn mark_all_read(&self, user_id: &str, project_id: Option<&str>) -> Result<u64, AppError> {
        let result = match project_id {
            Some(project_id) => sqlx::query(
                "UPDATE notifications SET is_read = 1, read_at = CURRENT_TIMESTAMP WHERE user_id = ? AND project_id = ? AND is_read = 0",
            )
                .bind(user_id)
                .bind(project_id)
                .execute(&self.pool)
                .await
                .map_err(AppError::Database)?,
            None => sqlx::query(
                "UPDATE notifications SET is_read = 1, read_at = CURRENT_TIMESTAMP WHERE user_id = ? AND is_read = 0",
            )
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(AppError::Database)?,
        };
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: &str, user_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
