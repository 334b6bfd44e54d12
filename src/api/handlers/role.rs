use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use tracing::info;

use crate::api::dtos::requests::{AddRoleMemberRequest, CreateRoleRequest, UpdateRoleRequest};
use crate::api::dtos::responses::{deleted_message, envelope};
use crate::api::extractors::project_access::ProjectContext;
use crate::domain::models::access::{AccessLevel, NewAccessParams, ProjectAccess};
use crate::domain::models::role::{NewRoleParams, ProjectRole};
use crate::domain::services::permissions::Capability;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleListQuery {
    pub is_active: Option<bool>,
}

pub async fn list_roles(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Query(query): Query<RoleListQuery>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Read)?;

    let roles = state
        .role_repo
        .list_by_project(&ctx.project.id, query.is_active)
        .await?;

    Ok(envelope(roles))
}

pub async fn create_role(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Json(payload): Json<CreateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Admin)?;

    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Role name is required".to_string()));
    }

    let role = ProjectRole::new(NewRoleParams {
        project_id: ctx.project.id.clone(),
        name: payload.name,
        description: payload.description,
        color: payload.color,
        icon: payload.icon,
        permissions: payload.permissions,
        specialization: payload.specialization,
        skill_level: payload.skill_level,
        working_hours: payload.working_hours,
        max_concurrent_tickets: payload.max_concurrent_tickets,
    });

    let created = state.role_repo.create(&role).await?;
    info!("Created role {} in project {}", created.id, ctx.project.id);

    Ok((StatusCode::CREATED, envelope(created)))
}

pub async fn get_role(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Path((_, role_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Read)?;

    let role = state
        .role_repo
        .find_by_id(&ctx.project.id, &role_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Role not found".to_string()))?;

    Ok(envelope(role))
}

pub async fn update_role(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Path((_, role_id)): Path<(String, String)>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Admin)?;

    let mut role = state
        .role_repo
        .find_by_id(&ctx.project.id, &role_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Role not found".to_string()))?;

    if let Some(name) = payload.name {
        role.name = name;
    }
    if let Some(description) = payload.description {
        role.description = Some(description);
    }
    if let Some(color) = payload.color {
        role.color = color;
    }
    if let Some(icon) = payload.icon {
        role.icon = icon;
    }
    if let Some(permissions) = payload.permissions {
        role.permissions = sqlx::types::Json(permissions);
    }
    if let Some(specialization) = payload.specialization {
        role.specialization = sqlx::types::Json(specialization);
    }
    if let Some(skill_level) = payload.skill_level {
        role.skill_level = skill_level;
    }
    if let Some(working_hours) = payload.working_hours {
        role.working_hours = Some(sqlx::types::Json(working_hours));
    }
    if let Some(max_concurrent_tickets) = payload.max_concurrent_tickets {
        role.max_concurrent_tickets = Some(max_concurrent_tickets);
    }
    if let Some(is_active) = payload.is_active {
        role.is_active = is_active;
    }

    let updated = state.role_repo.update(&role).await?;
    Ok(envelope(updated))
}

/// Refuses to delete a role that still has members, naming the count so
/// the client can show who is blocking it.
pub async fn delete_role(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Path((_, role_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Admin)?;

    state
        .role_repo
        .find_by_id(&ctx.project.id, &role_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Role not found".to_string()))?;

    let members = state.access_repo.count_by_role(&role_id).await?;
    if members > 0 {
        return Err(AppError::Conflict(format!(
            "Role is still assigned to {} member(s)",
            members
        )));
    }

    state.role_repo.delete(&ctx.project.id, &role_id).await?;
    info!("Deleted role {} from project {}", role_id, ctx.project.id);

    Ok(envelope(deleted_message("Role")))
}

pub async fn list_role_members(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Path((_, role_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Read)?;

    state
        .role_repo
        .find_by_id(&ctx.project.id, &role_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Role not found".to_string()))?;

    let members = state.access_repo.list_by_role(&role_id).await?;
    Ok(envelope(members))
}

/// Points a member's grant at this role. A user who is not yet a member
/// gets a fresh WRITE/technician grant carrying the role.
pub async fn add_role_member(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Path((_, role_id)): Path<(String, String)>,
    Json(payload): Json<AddRoleMemberRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Admin)?;

    state
        .role_repo
        .find_by_id(&ctx.project.id, &role_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Role not found".to_string()))?;

    state
        .user_repo
        .find_by_id(&payload.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    match state.access_repo.find(&payload.user_id, &ctx.project.id).await? {
        Some(mut grant) => {
            grant.role_id = Some(role_id);
            let updated = state.access_repo.update(&grant).await?;
            Ok((StatusCode::OK, envelope(updated)))
        }
        None => {
            let grant = ProjectAccess::new(NewAccessParams {
                user_id: payload.user_id,
                project_id: ctx.project.id.clone(),
                role_id: Some(role_id.clone()),
                access_level: Some(AccessLevel::Write),
                user_type: Some("technician".to_string()),
                can_create_tickets: None,
                can_edit_tickets: None,
                can_assign_tickets: None,
                can_delete_tickets: None,
                can_approve_workflow: None,
                can_view_all_tickets: None,
                receive_notifications: None,
                notification_channels: None,
                granted_by: Some(ctx.claims.sub.clone()),
            });
            let created = state.access_repo.create(&grant).await?;
            info!(
                "Created grant for user {} via role {} in project {}",
                created.user_id, role_id, ctx.project.id
            );
            Ok((StatusCode::CREATED, envelope(created)))
        }
    }
}

pub async fn remove_role_member(
    State(state): State<Arc<AppState>>,
    ctx: ProjectContext,
    Path((_, role_id, user_id)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    ctx.require(Capability::Admin)?;

    let mut grant = state
        .access_repo
        .find(&user_id, &ctx.project.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project member not found".to_string()))?;

    if grant.role_id.as_deref() != Some(role_id.as_str()) {
        return Err(AppError::NotFound(
            "Member does not hold this role".to_string(),
        ));
    }

    grant.role_id = None;
    let updated = state.access_repo.update(&grant).await?;

    Ok(envelope(updated))
}
