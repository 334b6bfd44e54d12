use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::api::dtos::requests::UpdatePreferencesRequest;
use crate::api::dtos::responses::{deleted_message, envelope, paged};
use crate::api::extractors::auth::AuthUser;
use crate::domain::ports::NotificationFilter;
use crate::error::AppError;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListQuery {
    pub project_id: Option<String>,
    pub is_read: Option<bool>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectScopeQuery {
    pub project_id: Option<String>,
}

pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Query(query): Query<NotificationListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    let filter = NotificationFilter {
        project_id: query.project_id,
        is_read: query.is_read,
        event_type: query.event_type,
        limit,
        offset,
    };

    let notifications = state
        .notification_repo
        .list_for_user(&claims.sub, &filter)
        .await?;
    let total = state
        .notification_repo
        .count_for_user(&claims.sub, &filter)
        .await?;

    Ok(paged(notifications, total, limit, offset))
}

pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Query(query): Query<ProjectScopeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let count = state
        .notification_repo
        .unread_count(&claims.sub, query.project_id.as_deref())
        .await?;

    Ok(envelope(json!({ "count": count })))
}

pub async fn get_notification(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let notification = state
        .notification_repo
        .find_by_id(&id, &claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

    Ok(envelope(notification))
}

pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let notification = state
        .notification_repo
        .mark_read(&id, &claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

    Ok(envelope(notification))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadRequest {
    pub project_id: Option<String>,
}

pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<MarkAllReadRequest>,
) -> Result<impl IntoResponse, AppError> {
    let count = state
        .notification_repo
        .mark_all_read(&claims.sub, payload.project_id.as_deref())
        .await?;

    Ok(envelope(json!({ "markedAsRead": count })))
}

pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let removed = state.notification_repo.delete(&id, &claims.sub).await?;
    if !removed {
        return Err(AppError::NotFound("Notification not found".to_string()));
    }

    Ok(envelope(deleted_message("Notification")))
}

/// Preferences live on the caller's grant for the given project.
pub async fn get_preferences(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Query(query): Query<ProjectScopeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let project_id = query
        .project_id
        .ok_or_else(|| AppError::Validation("Project ID is required".to_string()))?;

    let access = state
        .access_repo
        .find(&claims.sub, &project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project access not found".to_string()))?;

    Ok(envelope(json!({
        "receiveNotifications": access.receive_notifications,
        "notificationChannels": access.notification_channels.0,
    })))
}

pub async fn update_preferences(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<UpdatePreferencesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut access = state
        .access_repo
        .find(&claims.sub, &payload.project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project access not found".to_string()))?;

    if let Some(receive) = payload.receive_notifications {
        access.receive_notifications = receive;
    }
    if let Some(channels) = payload.notification_channels {
        access.notification_channels = sqlx::types::Json(channels);
    }

    let updated = state.access_repo.update(&access).await?;

    Ok(envelope(json!({
        "receiveNotifications": updated.receive_notifications,
        "notificationChannels": updated.notification_channels.0,
    })))
}
