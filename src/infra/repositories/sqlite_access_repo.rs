use crate::domain::{models::access::ProjectAccess, ports::AccessRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteAccessRepo {
    pool: SqlitePool,
}

impl SqliteAccessRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessRepository for SqliteAccessRepo {
    async fn create(&self, access: &ProjectAccess) -> Result<ProjectAccess, AppError> {
        sqlx::query_as::<_, ProjectAccess>(
            "INSERT INTO user_project_access (id, user_id, project_id, role_id, access_level, user_type, can_create_tickets, can_edit_tickets, can_assign_tickets, can_delete_tickets, can_approve_workflow, can_view_all_tickets, receive_notifications, notification_channels, granted_by, granted_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&access.id)
            .bind(&access.user_id)
            .bind(&access.project_id)
            .bind(&access.role_id)
            .bind(access.access_level)
            .bind(&access.user_type)
            .bind(access.can_create_tickets)
            .bind(access.can_edit_tickets)
            .bind(access.can_assign_tickets)
            .bind(access.can_delete_tickets)
            .bind(access.can_approve_workflow)
            .bind(access.can_view_all_tickets)
            .bind(access.receive_notifications)
            .bind(&access.notification_channels)
            .bind(&access.granted_by)
            .bind(access.granted_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find(&self, user_id: &str, project_id: &str) -> Result<Option<ProjectAccess>, AppError> {
        sqlx::query_as::<_, ProjectAccess>(
            "SELECT * FROM user_project_access WHERE user_id = ? AND project_id = ?",
        )
            .bind(user_id)
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ProjectAccess>, AppError> {
        sqlx::query_as::<_, ProjectAccess>(
            "SELECT * FROM user_project_access WHERE user_id = ? ORDER BY granted_at",
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_project(
        &self,
        project_id: &str,
        user_type: Option<&str>,
    ) -> Result<Vec<ProjectAccess>, AppError> {
        match user_type {
            Some(user_type) => sqlx::query_as::<_, ProjectAccess>(
                "SELECT * FROM user_project_access WHERE project_id = ? AND user_type = ? ORDER BY granted_at",
            )
                .bind(project_id)
                .bind(user_type)
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::Database),
            None => sqlx::query_as::<_, ProjectAccess>(
                "SELECT * FROM user_project_access WHERE project_id = ? ORDER BY granted_at",
            )
                .bind(project_id)
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::Database),
        }
    }

    async fn list_project_admins(&self, project_id: &str) -> Result<Vec<ProjectAccess>, AppError> {
        sqlx::query_as::<_, ProjectAccess>(
            "SELECT * FROM user_project_access WHERE project_id = ? AND access_level = 'ADMIN' AND receive_notifications = 1",
        )
            .bind(project_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_role(&self, role_id: &str) -> Result<Vec<ProjectAccess>, AppError> {
        sqlx::query_as::<_, ProjectAccess>(
            "SELECT * FROM user_project_access WHERE role_id = ? ORDER BY granted_at",
        )
            .bind(role_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_by_role(&self, role_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM user_project_access WHERE role_id = ?",
        )
            .bind(role_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, access: &ProjectAccess) -> Result<ProjectAccess, AppError> {
        sqlx::query_as::<_, ProjectAccess>(
            "UPDATE user_project_access SET role_id=?, access_level=?, user_type=?, can_create_tickets=?, can_edit_tickets=?, can_assign_tickets=?, can_delete_tickets=?, can_approve_workflow=?, can_view_all_tickets=?, receive_notifications=?, notification_channels=?, granted_by=? \
             WHERE id=? RETURNING *"
        )
            .bind(&access.role_id)
            .bind(access.access_level)
            .bind(&access.user_type)
            .bind(access.can_create_tickets)
            .bind(access.can_edit_tickets)
            .bind(access.can_assign_tickets)
            .bind(access.can_delete_tickets)
            .bind(access.can_approve_workflow)
            .bind(access.can_view_all_tickets)
            .bind(access.receive_notifications)
            .bind(&access.notification_channels)
            .bind(&access.granted_by)
            .bind(&access.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, user_id: &str, project_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM user_project_access WHERE user_id = ? AND project_id = ?",
        )
            .bind(user_id)
            .bind(project_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
