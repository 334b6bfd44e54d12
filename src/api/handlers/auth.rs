use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordVerifier},
    Argon2,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use tracing::{info, warn};

use crate::api::dtos::requests::LoginRequest;
use crate::api::dtos::responses::{envelope, LoginData, ProjectSummary};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::auth::Claims;
use crate::domain::models::user::User;
use crate::error::AppError;
use crate::state::AppState;

const TOKEN_TTL_HOURS: i64 = 24;
const REMEMBER_ME_TTL_DAYS: i64 = 30;

fn sign_token(state: &AppState, user: &User, remember_me: bool) -> Result<String, AppError> {
    let now = Utc::now();
    let expires = if remember_me {
        now + chrono::Duration::days(REMEMBER_ME_TTL_DAYS)
    } else {
        now + chrono::Duration::hours(TOKEN_TTL_HOURS)
    };

    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        role: user.role.clone(),
        exp: expires.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_bytes()),
    )
    .map_err(|_| AppError::Internal)
}

/// Projects the user can work in, annotated with their grant and the open
/// ticket count. Global admins see every active project without a grant.
async fn available_projects(
    state: &AppState,
    user: &User,
) -> Result<Vec<ProjectSummary>, AppError> {
    let mut summaries = Vec::new();

    if user.is_global_admin() {
        for project in state.project_repo.list().await? {
            let open_tickets = state.ticket_repo.count_open_by_project(&project.id).await?;
            summaries.push(ProjectSummary {
                project,
                open_tickets,
                access_level: None,
                user_type: None,
            });
        }
        return Ok(summaries);
    }

    for grant in state.access_repo.list_by_user(&user.id).await? {
        let Some(project) = state.project_repo.find_by_id(&grant.project_id).await? else {
            continue;
        };
        if !project.is_active {
            continue;
        }
        let open_tickets = state.ticket_repo.count_open_by_project(&project.id).await?;
        summaries.push(ProjectSummary {
            project,
            open_tickets,
            access_level: Some(grant.access_level),
            user_type: Some(grant.user_type),
        });
    }

    Ok(summaries)
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .user_repo
        .find_by_email(&payload.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !user.is_active {
        warn!("Login attempt for deactivated account: {}", user.id);
        return Err(AppError::Forbidden("Account is deactivated".to_string()));
    }

    let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|_| AppError::Internal)?;
    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized)?;

    let token = sign_token(&state, &user, payload.remember_me)?;
    state.user_repo.touch_last_login(&user.id).await?;

    let mut projects = available_projects(&state, &user).await?;
    projects.sort_by(|a, b| a.project.name.cmp(&b.project.name));

    let auto_selected_project = if projects.len() == 1 {
        Some(ProjectSummary {
            project: projects[0].project.clone(),
            open_tickets: projects[0].open_tickets,
            access_level: projects[0].access_level,
            user_type: projects[0].user_type.clone(),
        })
    } else {
        None
    };
    let requires_project_selection = projects.len() > 1;

    info!("User {} logged in", user.id);

    Ok(envelope(LoginData {
        token,
        user,
        available_projects: projects,
        auto_selected_project,
        requires_project_selection,
    }))
}

/// Confirms the bearer token and returns the current account state.
pub async fn verify(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .user_repo
        .find_by_id(&claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !user.is_active {
        return Err(AppError::Unauthorized);
    }

    Ok(envelope(user))
}

/// Validates that the caller may work in the requested project and returns
/// it annotated. The client keeps the selection; nothing is stored.
pub async fn switch_project(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(project_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let project = state
        .project_repo
        .find_by_id(&project_id)
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
