use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use tracing::info;

use crate::api::dtos::requests::{
    AddWatcherRequest, AssignTicketRequest, CreateTicketRequest, UpdateTicketRequest,
};
use crate::api::dtos::responses::{deleted_message, envelope};
use crate::api::extractors::project_access::ProjectContext;
use crate::domain::models::ticket::{NewTicketParams, Ticket};
use crate::domain::services::fanout::TicketEvent;
use crate::domain::services::permissions::Capability;
use crate::error::AppError;
use crate::state::AppState;

/// Ticket listing honors `viewAllTickets`: callers without it only see
/// tickets they created or are assigned to.
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Read)?;

    let tickets = if ctx.allows(Capability::ViewAllTickets) {
        state.ticket_repo.list_by_project(&ctx.project.id).await?
    } else {
        state
            .ticket_repo
            .list_own(&ctx.project.id, &ctx.claims.sub)
            .await?
    };

    Ok(envelope(tickets))
}

pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Json(payload): Json<CreateTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::CreateTickets)?;

    if payload.title.trim().is_empty()
        || payload.description.trim().is_empty()
        || payload.category.trim().is_empty()
    {
        return Err(AppError::Validation(
            "Title, description and category are required".to_string(),
        ));
    }

    if let Some(assignee_id) = &payload.assigned_to_id {
        state
            .access_repo
            .find(assignee_id, &ctx.project.id)
            .await?
            .ok_or_else(|| {
                AppError::Validation("Assignee is not a member of this project".to_string())
            })?;
    }

    // Sequence = current count + 1. Two concurrent creates can collide;
    // the API predates per-project counters and clients rely on the format.
    let count = state.ticket_repo.count_by_project(&ctx.project.id).await?;
    let ticket_number = Ticket::format_number(&ctx.project.project_number, count + 1);

    let ticket = Ticket::new(NewTicketParams {
        project_id: ctx.project.id.clone(),
        ticket_number,
        title: payload.title,
        description: payload.description,
        category: payload.category,
        priority: payload.priority,
        assigned_to_id: payload.assigned_to_id,
        created_by_id: Some(ctx.claims.sub.clone()),
    });

    let created = state.ticket_repo.create(&ticket).await?;
    info!("Created ticket {} in project {}", created.ticket_number, ctx.project.id);

    if created.assigned_to_id.is_some() {
        state.notifier.notify(&created, TicketEvent::Assigned).await?;
    }

    Ok((StatusCode::CREATED, envelope(created)))
}

pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Path((_, ticket_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Read)?;

    let ticket = state
        .ticket_repo
        .find_by_id(&ctx.project.id, &ticket_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;

    if !ctx.allows(Capability::ViewAllTickets)
        && ticket.created_by_id.as_deref() != Some(ctx.claims.sub.as_str())
        && ticket.assigned_to_id.as_deref() != Some(ctx.claims.sub.as_str())
    {
        return Err(AppError::Forbidden(
            "Insufficient permissions: viewAllTickets required".to_string(),
        ));
    }

    Ok(envelope(ticket))
}

pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Path((_, ticket_id)): Path<(String, String)>,
    Json(payload): Json<UpdateTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::EditTickets)?;

    // Approval is a separate privilege on top of editing.
    if payload.status.as_deref() == Some("Approved") {
        ctx.require(Capability::ApproveWorkflow)?;
    }

    let mut ticket = state
        .ticket_repo
        .find_by_id(&ctx.project.id, &ticket_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;

    let status_changed = payload
        .status
        .as_ref()
        .is_some_and(|status| *status != ticket.status);

    if let Some(title) = payload.title {
        ticket.title = title;
    }
    if let Some(description) = payload.description {
        ticket.description = description;
    }
    if let Some(category) = payload.category {
        ticket.category = category;
    }
    if let Some(priority) = payload.priority {
        ticket.priority = priority;
    }
    if let Some(status) = payload.status {
        ticket.status = status;
    }
    ticket.updated_at = chrono::Utc::now();

    let updated = state.ticket_repo.update(&ticket).await?;

    if status_changed {
        state.notifier.notify(&updated, TicketEvent::StatusChanged).await?;
    }

    Ok(envelope(updated))
}

pub async fn assign_ticket(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Path((_, ticket_id)): Path<(String, String)>,
    Json(payload): Json<AssignTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::AssignTickets)?;

    let mut ticket = state
        .ticket_repo
        .find_by_id(&ctx.project.id, &ticket_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;

    state
        .access_repo
        .find(&payload.assigned_to, &ctx.project.id)
        .await?
        .ok_or_else(|| {
            AppError::Validation("Assignee is not a member of this project".to_string())
        })?;

    ticket.assigned_to_id = Some(payload.assigned_to.clone());
    if let Some(cc_contacts) = payload.cc_contacts {
        ticket.cc_ids = sqlx::types::Json(cc_contacts);
    }
    ticket.updated_at = chrono::Utc::now();

    let updated = state.ticket_repo.update(&ticket).await?;
    info!("Assigned ticket {} to user {}", updated.ticket_number, payload.assigned_to);

    if payload.notify_watchers {
        state.notifier.notify(&updated, TicketEvent::Assigned).await?;
    } else {
        // Watchers stay quiet; the assignee still has to hear about it.
        let mut direct = updated.clone();
        direct.watcher_ids = sqlx::types::Json(Vec::new());
        direct.cc_ids = sqlx::types::Json(Vec::new());
        state.notifier.notify(&direct, TicketEvent::Assigned).await?;
    }

    Ok(envelope(updated))
}

/// Bumps the ticket to `Urgent` and alerts project admins on top of the
/// usual recipients.
pub async fn escalate_ticket(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Path((_, ticket_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::EditTickets)?;

    let mut ticket = state
        .ticket_repo
        .find_by_id(&ctx.project.id, &ticket_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;

    ticket.priority = "Urgent".to_string();
    ticket.updated_at = chrono::Utc::now();

    let updated = state.ticket_repo.update(&ticket).await?;
    info!("Escalated ticket {}", updated.ticket_number);

    state.notifier.notify(&updated, TicketEvent::Escalated).await?;

    Ok(envelope(updated))
}

pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Path((_, ticket_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::DeleteTickets)?;

    state
        .ticket_repo
        .find_by_id(&ctx.project.id, &ticket_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;

    state.ticket_repo.delete(&ctx.project.id, &ticket_id).await?;
    info!("Deleted ticket {} from project {}", ticket_id, ctx.project.id);

    Ok(envelope(deleted_message("Ticket")))
}

pub async fn list_watchers(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Path((_, ticket_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Read)?;

    let ticket = state
        .ticket_repo
        .find_by_id(&ctx.project.id, &ticket_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;

    Ok(envelope(ticket.watcher_ids.0))
}

pub async fn add_watcher(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Path((_, ticket_id)): Path<(String, String)>,
    Json(payload): Json<AddWatcherRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Read)?;

    let mut ticket = state
        .ticket_repo
        .find_by_id(&ctx.project.id, &ticket_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;

    state
        .access_repo
        .find(&payload.user_id, &ctx.project.id)
        .await?
        .ok_or_else(|| {
            AppError::Validation("Watcher is not a member of this project".to_string())
        })?;

    if !ticket.watcher_ids.0.contains(&payload.user_id) {
        ticket.watcher_ids.0.push(payload.user_id);
        ticket.updated_at = chrono::Utc::now();
        ticket = state.ticket_repo.update(&ticket).await?;
    }

    Ok(envelope(ticket))
}

pub async fn remove_watcher(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Path((_, ticket_id, user_id)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Read)?;

    let mut ticket = state
        .ticket_repo
        .find_by_id(&ctx.project.id, &ticket_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;

    let before = ticket.watcher_ids.0.len();
    ticket.watcher_ids.0.retain(|id| id != &user_id);
    if ticket.watcher_ids.0.len() == before {
        return Err(AppError::NotFound("Watcher not found".to_string()));
    }

    ticket.updated_at = chrono::Utc::now();
    let updated = state.ticket_repo.update(&ticket).await?;

    Ok(envelope(updated))
}
