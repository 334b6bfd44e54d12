use crate::domain::{models::role::ProjectRole, ports::RoleRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteRoleRepo {
    pool: SqlitePool,
}

impl SqliteRoleRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for SqliteRoleRepo {
    async fn create(&self, role: &ProjectRole) -> Result<ProjectRole, AppError> {
        sqlx::query_as::<_, ProjectRole>(
            "INSERT INTO project_roles (id, project_id, name, description, color, icon, permissions, specialization, skill_level, working_hours, max_concurrent_tickets, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&role.id)
            .bind(&role.project_id)
            .bind(&role.name)
            .bind(&role.description)
            .bind(&role.color)
            .bind(&role.icon)
            .bind(&role.permissions)
            .bind(&role.specialization)
            .bind(&role.skill_level)
            .bind(&role.working_hours)
            .bind(role.max_concurrent_tickets)
            .bind(role.is_active)
            .bind(role.created_at)
            .bind(role.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, project_id: &str, id: &str) -> Result<Option<ProjectRole>, AppError> {
        sqlx::query_as::<_, ProjectRole>(
            "SELECT * FROM project_roles WHERE project_id = ? AND id = ?",
        )
            .bind(project_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_project(
        &self,
        project_id: &str,
        active: Option<bool>,
    ) -> Result<Vec<ProjectRole>, AppError> {
        match active {
            Some(active) => sqlx::query_as::<_, ProjectRole>(
                "SELECT * FROM project_roles WHERE project_id = ? AND is_active = ? ORDER BY name",
            )
                .bind(project_id)
                .bind(active)
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::Database),
            None => sqlx::query_as::<_, ProjectRole>(
                "SELECT * FROM project_roles WHERE project_id = ? ORDER BY name",
            )
                .bind(project_id)
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::Database),
        }
    }

    async fn update(&self, role: &ProjectRole) -> Result<ProjectRole, AppError> {
        sqlx::query_as::<_, ProjectRole>(
            "UPDATE project_roles SET name=?, description=?, color=?, icon=?, permissions=?, specialization=?, skill_level=?, working_hours=?, max_concurrent_tickets=?, is_active=?, updated_at=CURRENT_TIMESTAMP \
             WHERE id=? AND project_id=? RETURNING *"
        )
            .bind(&role.name)
            .bind(&role.description)
            .bind(&role.color)
            .bind(&role.icon)
            .bind(&role.permissions)
            .bind(&role.specialization)
            .bind(&role.skill_level)
            .bind(&role.working_hours)
            .bind(role.max_concurrent_tickets)
            .bind(role.is_active)
            .bind(&role.id)
            .bind(&role.project_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, project_id: &str, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM project_roles WHERE project_id = ? AND id = ?")
            .bind(project_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}
