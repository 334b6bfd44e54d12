use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::info;

use crate::api::dtos::requests::{CreateUserRequest, GrantAccessRequest, UpdateUserRequest};
use crate::api::dtos::responses::{deleted_message, envelope};
use crate::domain::models::access::{AccessLevel, NewAccessParams, ProjectAccess};
use crate::domain::models::auth::Claims;
use crate::domain::models::user::{NewUserParams, User, ROLE_ADMIN, ROLE_USER};
use crate::api::extractors::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AppError::Internal)?
        .to_string())
}

fn require_global_admin(claims: &Claims) -> Result<(), AppError> {
    if claims.is_global_admin() {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "Admin privileges required".to_string(),
    ))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    require_global_admin(&claims)?;
    let users = state.user_repo.list().await?;
    Ok(envelope(users))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    // A project-level admin may only onboard users into projects they
    // administer, so the request must name at least one.
    if !claims.is_global_admin() && payload.projects.is_empty() {
        return Err(AppError::Forbidden(
            "User management privileges required".to_string(),
        ));
    }

    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    if state.user_repo.find_by_email(&payload.email).await?.is_some() {
        return Err(AppError::Conflict("Email already in use".to_string()));
    }

    // Only a global admin may mint another global admin.
    let role = match payload.role.as_deref() {
        Some(ROLE_ADMIN) if !claims.is_global_admin() => {
            return Err(AppError::Forbidden(
                "Admin privileges required".to_string(),
            ));
        }
        Some(role) if role != ROLE_ADMIN && role != ROLE_USER => {
            return Err(AppError::Validation("Unknown role".to_string()));
        }
        other => other.map(str::to_string),
    };

    // Validate the requested project grants before touching anything.
    for assignment in &payload.projects {
        require_project_manager(&state, &claims, &assignment.project_id).await?;
        state
            .project_repo
            .find_by_id(&assignment.project_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
    }

    let password_hash = hash_password(&payload.password)?;
    let user = User::new(NewUserParams {
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        password_hash,
        phone_number: payload.phone_number,
        role,
        is_technician: payload.is_technician.unwrap_or(false),
        created_by: Some(claims.sub.clone()),
    });

    let created = state.user_repo.create(&user).await?;

    for assignment in payload.projects {
        let grant = build_grant(
            &created.id,
            &assignment.project_id,
            Some(claims.sub.clone()),
            assignment.grant,
        );
        state.access_repo.create(&grant).await?;
    }

    info!("Created user {}", created.id);

    Ok((StatusCode::CREATED, envelope(created)))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if claims.sub != id {
        require_global_admin(&claims)?;
    }

    let user = state
        .user_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(envelope(user))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if claims.sub != id {
        require_global_admin(&claims)?;
    }

    // Role, activation, and technician status stay admin-only even on
    // one's own profile.
    if (payload.role.is_some() || payload.is_active.is_some() || payload.is_technician.is_some())
        && !claims.is_global_admin()
    {
        return Err(AppError::Forbidden(
            "Admin privileges required".to_string(),
        ));
    }

    let mut user = state
        .user_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Some(email) = payload.email {
        if email != user.email {
            if state.user_repo.find_by_email(&email).await?.is_some() {
                return Err(AppError::Conflict("Email already in use".to_string()));
            }
            user.email = email;
        }
    }
    if let Some(password) = payload.password {
        user.password_hash = hash_password(&password)?;
    }
    if let Some(first_name) = payload.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = payload.last_name {
        user.last_name = last_name;
    }
    if let Some(phone_number) = payload.phone_number {
        user.phone_number = Some(phone_number);
    }
    if let Some(role) = payload.role {
        if role != ROLE_ADMIN && role != ROLE_USER {
            return Err(AppError::Validation("Unknown role".to_string()));
        }
        user.role = role;
    }
    if let Some(is_technician) = payload.is_technician {
        user.is_technician = is_technician;
    }
    if let Some(is_active) = payload.is_active {
        user.is_active = is_active;
    }

    let updated = state.user_repo.update(&user).await?;
    Ok(envelope(updated))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_global_admin(&claims)?;

    if claims.sub == id {
        return Err(AppError::Validation(
            "Cannot delete your own account".to_string(),
        ));
    }

    state
        .user_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    // Grants cascade with the user row; notifications are kept.
    state.user_repo.delete(&id).await?;
    info!("Deleted user {}", id);

    Ok(envelope(deleted_message("User")))
}

/// Upserts the user's grant on the project. An existing grant is replaced
/// field-by-field rather than erroring, so assignment is idempotent.
pub async fn assign_project(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path((id, project_id)): Path<(String, String)>,
    Json(payload): Json<GrantAccessRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_project_manager(&state, &claims, &project_id).await?;

    let user = state
        .user_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let project = state
        .project_repo
        .find_by_id(&project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    if let Some(role_id) = &payload.role_id {
        state
            .role_repo
            .find_by_id(&project.id, role_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Role not found".to_string()))?;
    }

    let grant = build_grant(&user.id, &project.id, Some(claims.sub.clone()), payload);

    let stored = match state.access_repo.find(&user.id, &project.id).await? {
        Some(existing) => {
            let mut replacement = grant;
            replacement.id = existing.id;
            state.access_repo.update(&replacement).await?
        }
        None => state.access_repo.create(&grant).await?,
    };

    info!("Granted user {} access to project {}", user.id, project.id);
    Ok(envelope(stored))
}

pub async fn remove_project(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path((id, project_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    require_project_manager(&state, &claims, &project_id).await?;

    let removed = state.access_repo.delete(&id, &project_id).await?;
    if !removed {
        return Err(AppError::NotFound("Project access not found".to_string()));
    }

    info!("Revoked user {} access to project {}", id, project_id);
    Ok(envelope(deleted_message("Project access")))
}

/// Global admin, or ADMIN grant on the specific project being managed.
async fn require_project_manager(
    state: &AppState,
    claims: &Claims,
    project_id: &str,
) -> Result<(), AppError> {
    if claims.is_global_admin() {
        return Ok(());
    }
    let grant = state.access_repo.find(&claims.sub, project_id).await?;
    if grant.is_some_and(|g| g.access_level == AccessLevel::Admin) {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "User management privileges required".to_string(),
    ))
}

pub(super) fn build_grant(
    user_id: &str,
    project_id: &str,
    granted_by: Option<String>,
    payload: GrantAccessRequest,
) -> ProjectAccess {
    ProjectAccess::new(NewAccessParams {
        user_id: user_id.to_string(),
        project_id: project_id.to_string(),
        role_id: payload.role_id,
        access_level: payload.access_level,
        user_type: payload.user_type,
        can_create_tickets: payload.can_create_tickets,
        can_edit_tickets: payload.can_edit_tickets,
        can_assign_tickets: payload.can_assign_tickets,
        can_delete_tickets: payload.can_delete_tickets,
        can_approve_workflow: payload.can_approve_workflow,
        can_view_all_tickets: payload.can_view_all_tickets,
        receive_notifications: payload.receive_notifications,
        notification_channels: payload.notification_channels,
        granted_by,
    })
}
