use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use tracing::info;

use crate::api::dtos::requests::{AddMemberRequest, GrantAccessRequest};
use crate::api::dtos::responses::{
    availability_status, deleted_message, envelope, MemberWithRole, RoleSummary,
    TechnicianAvailability, UserSummary,
};
use crate::api::extractors::project_access::ProjectContext;
use crate::api::handlers::user::build_grant;
use crate::domain::models::access::ProjectAccess;
use crate::domain::services::permissions::Capability;
use crate::error::AppError;
use crate::state::AppState;

const DEFAULT_MAX_TICKETS: i32 = 10;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberListQuery {
    pub user_type: Option<String>,
}

async fn with_role(
    state: &AppState,
    access: ProjectAccess,
) -> Result<MemberWithRole, AppError> {
    let user = state
        .user_repo
        .find_by_id(&access.user_id)
        .await?
        .map(|u| UserSummary::from(&u));

    let role = match &access.role_id {
        Some(role_id) => state.role_repo.find_by_id(&access.project_id, role_id).await?,
        None => None,
    };

    Ok(MemberWithRole { access, user, role })
}

pub async fn list_members(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Query(query): Query<MemberListQuery>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Read)?;

    let grants = state
        .access_repo
        .list_by_project(&ctx.project.id, query.user_type.as_deref())
        .await?;

    let mut members = Vec::with_capacity(grants.len());
    for grant in grants {
        members.push(with_role(&state, grant).await?);
    }

    Ok(envelope(members))
}

pub async fn add_member(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Json(payload): Json<AddMemberRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Admin)?;

    let user = state
        .user_repo
        .find_by_id(&payload.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if state.access_repo.find(&user.id, &ctx.project.id).await?.is_some() {
        return Err(AppError::Conflict(
            "User is already a member of this project".to_string(),
        ));
    }

    if let Some(role_id) = &payload.grant.role_id {
        state
            .role_repo
            .find_by_id(&ctx.project.id, role_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Role not found".to_string()))?;
    }

    let grant = build_grant(
        &user.id,
        &ctx.project.id,
        Some(ctx.claims.sub.clone()),
        payload.grant,
    );
    let created = state.access_repo.create(&grant).await?;

    info!("Added user {} to project {}", user.id, ctx.project.id);
    Ok((StatusCode::CREATED, envelope(with_role(&state, created).await?)))
}

pub async fn update_member(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Path((_, user_id)): Path<(String, String)>,
    Json(payload): Json<GrantAccessRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Admin)?;

    let mut grant = state
        .access_repo
        .find(&user_id, &ctx.project.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project member not found".to_string()))?;

    if let Some(role_id) = &payload.role_id {
        state
            .role_repo
            .find_by_id(&ctx.project.id, role_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Role not found".to_string()))?;
        grant.role_id = Some(role_id.clone());
    }
    if let Some(access_level) = payload.access_level {
        grant.access_level = access_level;
    }
    if let Some(user_type) = payload.user_type {
        grant.user_type = user_type;
    }
    if let Some(v) = payload.can_create_tickets {
        grant.can_create_tickets = v;
    }
    if let Some(v) = payload.can_edit_tickets {
        grant.can_edit_tickets = v;
    }
    if let Some(v) = payload.can_assign_tickets {
        grant.can_assign_tickets = v;
    }
    if let Some(v) = payload.can_delete_tickets {
        grant.can_delete_tickets = v;
    }
    if let Some(v) = payload.can_approve_workflow {
        grant.can_approve_workflow = v;
    }
    if let Some(v) = payload.can_view_all_tickets {
        grant.can_view_all_tickets = v;
    }
    if let Some(v) = payload.receive_notifications {
        grant.receive_notifications = v;
    }
    if let Some(channels) = payload.notification_channels {
        grant.notification_channels = sqlx::types::Json(channels);
    }

    let updated = state.access_repo.update(&grant).await?;
    Ok(envelope(with_role(&state, updated).await?))
}

pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Path((_, user_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Admin)?;

    let removed = state.access_repo.delete(&user_id, &ctx.project.id).await?;
    if !removed {
        return Err(AppError::NotFound("Project member not found".to_string()));
    }

    info!("Removed user {} from project {}", user_id, ctx.project.id);
    Ok(envelope(deleted_message("Project member")))
}

async fn availability_for(
    state: &AppState,
    grant: &ProjectAccess,
) -> Result<TechnicianAvailability, AppError> {
    let user = state
        .user_repo
        .find_by_id(&grant.user_id)
        .await?
        .map(|u| UserSummary::from(&u));

    let role = match &grant.role_id {
        Some(role_id) => state.role_repo.find_by_id(&grant.project_id, role_id).await?,
        None => None,
    };

    let current_tickets = state
        .ticket_repo
        .count_open_assigned(&grant.project_id, &grant.user_id)
        .await?;
    let max_tickets = role
        .as_ref()
        .and_then(|r| r.max_concurrent_tickets)
        .unwrap_or(DEFAULT_MAX_TICKETS);
    let workload = current_tickets as f64 / max_tickets.max(1) as f64;

    Ok(TechnicianAvailability {
        id: grant.user_id.clone(),
        user,
        user_type: grant.user_type.clone(),
        role: role.as_ref().map(RoleSummary::from),
        current_tickets,
        max_tickets,
        workload,
        available: workload < 0.9,
        availability_status: availability_status(workload),
    })
}

/// Technicians that can take a new ticket, least loaded first.
pub async fn available_members(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Read)?;

    let grants = state
        .access_repo
        .list_by_project(&ctx.project.id, Some("technician"))
        .await?;

    let mut technicians = Vec::new();
    for grant in grants.iter().filter(|g| g.can_edit_tickets) {
        technicians.push(availability_for(&state, grant).await?);
    }

    technicians.sort_by(|a, b| a.workload.total_cmp(&b.workload));
    Ok(envelope(technicians))
}

pub async fn member_availability(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Path((_, user_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Read)?;

    let grant = state
        .access_repo
        .find(&user_id, &ctx.project.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project member not found".to_string()))?;

    Ok(envelope(availability_for(&state, &grant).await?))
}

/// The member's effective grant, for client-side permission display.
pub async fn member_permissions(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Path((_, user_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Read)?;

    let grant = state
        .access_repo
        .find(&user_id, &ctx.project.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project member not found".to_string()))?;

    Ok(envelope(grant))
}
