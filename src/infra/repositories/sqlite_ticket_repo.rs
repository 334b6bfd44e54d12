use crate::domain::{
    models::ticket::{Ticket, OPEN_STATUSES},
    ports::TicketRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

fn open_status_filter() -> String {
    let quoted: Vec<String> = OPEN_STATUSES.iter().map(|s| format!("'{}'", s)).collect();
    format!("status IN ({})", quoted.join(", "))
}

pub struct SqliteTicketRepo {
    pool: SqlitePool,
}

impl SqliteTicketRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for SqliteTicketRepo {
    async fn create(&self, ticket: &Ticket) -> Result<Ticket, AppError> {
        sqlx::query_as::<_, Ticket>(
            "INSERT INTO tickets (id, project_id, ticket_number, title, description, category, priority, status, assigned_to_id, created_by_id, watcher_ids, cc_ids, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&ticket.id)
            .bind(&ticket.project_id)
            .bind(&ticket.ticket_number)
            .bind(&ticket.title)
            .bind(&ticket.description)
            .bind(&ticket.category)
            .bind(&ticket.priority)
            .bind(&ticket.status)
            .bind(&ticket.assigned_to_id)
            .bind(&ticket.created_by_id)
            .bind(&ticket.watcher_ids)
            .bind(&ticket.cc_ids)
            .bind(ticket.created_at)
            .bind(ticket.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, project_id: &str, id: &str) -> Result<Option<Ticket>, AppError> {
        sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE project_id = ? AND id = ?",
        )
            .bind(project_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_project(&self, project_id: &str) -> Result<Vec<Ticket>, AppError> {
        sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE project_id = ? ORDER BY created_at DESC",
        )
            .bind(project_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_own(&self, project_id: &str, user_id: &str) -> Result<Vec<Ticket>, AppError> {
        sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE project_id = ? AND (created_by_id = ? OR assigned_to_id = ?) ORDER BY created_at DESC",
        )
            .bind(project_id)
            .bind(user_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_by_project(&self, project_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tickets WHERE project_id = ?")
            .bind(project_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_open_by_project(&self, project_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM tickets WHERE project_id = ? AND {}",
            open_status_filter()
        ))
            .bind(project_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_open_assigned(&self, project_id: &str, user_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM tickets WHERE project_id = ? AND assigned_to_id = ? AND {}",
            open_status_filter()
        ))
            .bind(project_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, ticket: &Ticket) -> Result<Ticket, AppError> {
        sqlx::query_as::<_, Ticket>(
            "UPDATE tickets SET title=?, description=?, category=?, priority=?, status=?, assigned_to_id=?, watcher_ids=?, cc_ids=?, updated_at=? \
             WHERE id=? AND project_id=? RETURNING *"
        )
            .bind(&ticket.title)
            .bind(&ticket.description)
            .bind(&ticket.category)
            .bind(&ticket.priority)
            .bind(&ticket.status)
            .bind(&ticket.assigned_to_id)
            .bind(&ticket.watcher_ids)
            .bind(&ticket.cc_ids)
            .bind(ticket.updated_at)
            .bind(&ticket.id)
            .bind(&ticket.project_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, project_id: &str, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM tickets WHERE project_id = ? AND id = ?")
            .bind(project_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}
