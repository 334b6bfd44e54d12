use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;

use crate::api::handlers::{auth, health, member, notification, project, role, ticket, user};
use crate::state::AppState;
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/verify", get(auth::verify))
        .route("/api/v1/auth/switch-project/{projectId}", post(auth::switch_project))

        // User management
        .route("/api/v1/users", get(user::list_users).post(user::create_user))
        .route("/api/v1/users/{id}", get(user::get_user).put(user::update_user).delete(user::delete_user))
        .route("/api/v1/users/{id}/projects/{projectId}", put(user::assign_project).delete(user::remove_project))

        // Projects
        .route("/api/v1/projects", get(project::list_projects).post(project::create_project))
        .route("/api/v1/projects/{projectId}", get(project::get_project).put(project::update_project).delete(project::delete_project))

        // Members
        .route("/api/v1/projects/{projectId}/members", get(member::list_members).post(member::add_member))
        .route("/api/v1/projects/{projectId}/members/available", get(member::available_members))
        .route("/api/v1/projects/{projectId}/members/{userId}", put(member::update_member).delete(member::remove_member))
        .route("/api/v1/projects/{projectId}/members/{userId}/availability", get(member::member_availability))
        .route("/api/v1/projects/{projectId}/members/{userId}/permissions", get(member::member_permissions))

        // Roles
        .route("/api/v1/projects/{projectId}/roles", get(role::list_roles).post(role::create_role))
        .route("/api/v1/projects/{projectId}/roles/{roleId}", get(role::get_role).put(role::update_role).delete(role::delete_role))
        .route("/api/v1/projects/{projectId}/roles/{roleId}/members", get(role::list_role_members).post(role::add_role_member))
        .route("/api/v1/projects/{projectId}/roles/{roleId}/members/{userId}", delete(role::remove_role_member))

        // Tickets
        .route("/api/v1/projects/{projectId}/tickets", get(ticket::list_tickets).post(ticket::create_ticket))
        .route("/api/v1/projects/{projectId}/tickets/{ticketId}", get(ticket::get_ticket).put(ticket::update_ticket).delete(ticket::delete_ticket))
        .route("/api/v1/projects/{projectId}/tickets/{ticketId}/assign", post(ticket::assign_ticket))
        .route("/api/v1/projects/{projectId}/tickets/{ticketId}/escalate", post(ticket::escalate_ticket))
        .route("/api/v1/projects/{projectId}/tickets/{ticketId}/watchers", get(ticket::list_watchers).post(ticket::add_watcher))
        .route("/api/v1/projects/{projectId}/tickets/{ticketId}/watchers/{userId}", delete(ticket::remove_watcher))

        // Notifications (static segments registered before {id})
        .route("/api/v1/notifications", get(notification::list_notifications))
        .route("/api/v1/notifications/unread/count", get(notification::unread_count))
        .route("/api/v1/notifications/read/all", put(notification::mark_all_read))
        .route("/api/v1/notifications/preferences", get(notification::get_preferences).put(notification::update_preferences))
        .route("/api/v1/notifications/{id}", get(notification::get_notification).delete(notification::delete_notification))
        .route("/api/v1/notifications/{id}/read", put(notification::mark_read))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
