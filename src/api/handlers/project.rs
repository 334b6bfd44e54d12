use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use tracing::info;

use crate::api::dtos::requests::{CreateProjectRequest, UpdateProjectRequest};
use crate::api::dtos::responses::{deleted_message, envelope, ProjectSummary};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::access::{AccessLevel, NewAccessParams, ProjectAccess};
use crate::domain::models::project::{NewProjectParams, Project};
use crate::error::AppError;
use crate::state::AppState;

fn require_global_admin(claims: &crate::domain::models::auth::Claims) -> Result<(), AppError> {
    if claims.is_global_admin() {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "Admin privileges required".to_string(),
    ))
}

/// Projects visible to the caller, each with its open ticket count and the
/// caller's access level. Global admins see everything, including inactive
/// projects.
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let mut summaries = Vec::new();

    if claims.is_global_admin() {
        for project in state.project_repo.list().await? {
            let open_tickets = state.ticket_repo.count_open_by_project(&project.id).await?;
            summaries.push(ProjectSummary {
                project,
                open_tickets,
                access_level: None,
                user_type: None,
            });
        }
    } else {
        for grant in state.access_repo.list_by_user(&claims.sub).await? {
            let Some(project) = state.project_repo.find_by_id(&grant.project_id).await? else {
                continue;
            };
            let open_tickets = state.ticket_repo.count_open_by_project(&project.id).await?;
            summaries.push(ProjectSummary {
                project,
                open_tickets,
                access_level: Some(grant.access_level),
                user_type: Some(grant.user_type),
            });
        }
    }

    summaries.sort_by(|a, b| a.project.name.cmp(&b.project.name));
    Ok(envelope(summaries))
}

/// Creates the project and grants the creator ADMIN access on it in the
/// same request, so a fresh project is never orphaned.
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_global_admin(&claims)?;

    if payload.name.trim().is_empty() || payload.project_number.trim().is_empty() {
        return Err(AppError::Validation(
            "Name and project number are required".to_string(),
        ));
    }

    if state
        .project_repo
        .find_by_number(&payload.project_number)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Project number already exists".to_string(),
        ));
    }

    let project = Project::new(NewProjectParams {
        name: payload.name,
        project_number: payload.project_number,
        address: payload.address,
        city: payload.city,
        postal_code: payload.postal_code,
        country: payload.country,
    });

    let created = state.project_repo.create(&project).await?;

    let grant = ProjectAccess::new(NewAccessParams {
        user_id: claims.sub.clone(),
        project_id: created.id.clone(),
        role_id: None,
        access_level: Some(AccessLevel::Admin),
        user_type: Some("manager".to_string()),
        can_create_tickets: Some(true),
        can_edit_tickets: Some(true),
        can_assign_tickets: Some(true),
        can_delete_tickets: Some(true),
        can_approve_workflow: Some(true),
        can_view_all_tickets: Some(true),
        receive_notifications: Some(true),
        notification_channels: None,
        granted_by: Some(claims.sub.clone()),
    });
    state.access_repo.create(&grant).await?;

    info!("Created project {} ({})", created.id, created.project_number);
    Ok((StatusCode::CREATED, envelope(created)))
}

pub async fn get_project(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let project = state
        .project_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    let grant = if claims.is_global_admin() {
        None
    } else {
        Some(
            state
                .access_repo
                .find(&claims.sub, &project.id)
                .await?
                .ok_or_else(|| AppError::Forbidden("No access to this project".to_string()))?,
        )
    };

    let open_tickets = state.ticket_repo.count_open_by_project(&project.id).await?;

    Ok(envelope(ProjectSummary {
        project,
        open_tickets,
        access_level: grant.as_ref().map(|g| g.access_level),
        user_type: grant.map(|g| g.user_type),
    }))
}

pub async fn update_project(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_global_admin(&claims)?;

    let mut project = state
        .project_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    if let Some(name) = payload.name {
        project.name = name;
    }
    if let Some(address) = payload.address {
        project.address = Some(address);
    }
    if let Some(city) = payload.city {
        project.city = Some(city);
    }
    if let Some(postal_code) = payload.postal_code {
        project.postal_code = Some(postal_code);
    }
    if let Some(country) = payload.country {
        project.country = country;
    }
    if let Some(is_active) = payload.is_active {
        project.is_active = is_active;
    }

    let updated = state.project_repo.update(&project).await?;
    Ok(envelope(updated))
}

/// Deletes the project. Grants, roles, and tickets go with it; persisted
/// notifications survive as history.
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_global_admin(&claims)?;

    state
        .project_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    state.project_repo.delete(&id).await?;
    info!("Deleted project {}", id);

    Ok(envelope(deleted_message("Project")))
}
