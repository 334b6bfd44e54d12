mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::TestApp;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        panic!("Response body is empty. Status: {}", status);
    }
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        panic!(
            "Failed to parse JSON: {:?}. Status: {}. Body: {:?}",
            e,
            status,
            String::from_utf8_lossy(&bytes)
        )
    })
}

fn request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn setup_project(app: &TestApp) -> (String, String) {
    app.seed_user("admin@test.de", "password123", "ADMIN").await;
    let token = app.login("admin@test.de", "password123").await;
    let res = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/projects",
            &token,
            Some(json!({"name": "Werk", "projectNumber": "P-100"})),
        ))
        .await
        .unwrap();
    let body = parse_body(res).await;
    (token, body["data"]["id"].as_str().unwrap().to_string())
}

async fn create_ticket(app: &TestApp, token: &str, project_id: &str, extra: Value) -> String {
    let mut payload = json!({"title": "Defekt", "description": "d", "category": "c"});
    for (k, v) in extra.as_object().unwrap() {
        payload[k] = v.clone();
    }
    let res = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/projects/{}/tickets", project_id),
            token,
            Some(payload),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = parse_body(res).await;
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_assignment_notifies_assignee_on_their_channels() {
    let app = TestApp::new().await;
    let (admin_token, project_id) = setup_project(&app).await;

    let tech_id = app.seed_user("tech@test.de", "password123", "USER").await;
    let res = app
        .router
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/v1/users/{}/projects/{}", tech_id, project_id),
            &admin_token,
            Some(json!({"userType": "technician", "notificationChannels": ["push", "email"]})),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    create_ticket(
        &app,
        &admin_token,
        &project_id,
        json!({"assignedToId": tech_id}),
    )
    .await;

    let tech_token = app.login("tech@test.de", "password123").await;
    let res = app
        .router
        .clone()
        .oneshot(request("GET", "/api/v1/notifications", &tech_token, None))
        .await
        .unwrap();
    let body = parse_body(res).await;

    let notifications = body["data"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["eventType"], "ticket:assigned");
    assert_eq!(notifications[0]["title"], "Ticket zugewiesen");
    assert_eq!(notifications[0]["channels"], json!(["push", "email"]));
    assert_eq!(notifications[0]["isRead"], false);

    // Both channels were pushed to the gateway
    let deliveries = app.delivery.deliveries.lock().unwrap();
    assert_eq!(deliveries.len(), 2);
}

#[tokio::test]
async fn test_escalation_fan_out_dedups_recipients() {
    let app = TestApp::new().await;
    let (admin_token, project_id) = setup_project(&app).await;

    // Tech is assignee, watcher, and cc at once
    let tech_id = app.seed_user("tech@test.de", "password123", "USER").await;
    let res = app
        .router
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/v1/users/{}/projects/{}", tech_id, project_id),
            &admin_token,
            Some(json!({"userType": "technician", "canAssignTickets": true})),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let ticket_id = create_ticket(&app, &admin_token, &project_id, json!({})).await;

    let res = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/projects/{}/tickets/{}/watchers", project_id, ticket_id),
            &admin_token,
            Some(json!({"userId": tech_id})),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/projects/{}/tickets/{}/assign", project_id, ticket_id),
            &admin_token,
            Some(json!({"assignedTo": tech_id, "ccContacts": [tech_id]})),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Escalation adds project admins to the recipient set
    let res = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/projects/{}/tickets/{}/escalate", project_id, ticket_id),
            &admin_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Tech appears once per event despite three overlapping roles
    let escalation_rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND event_type = 'ticket:escalated'",
    )
    .bind(&tech_id)
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_eq!(escalation_rows, 1);

    // The project admin got the escalation too
    let admin_rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE event_type = 'ticket:escalated'",
    )
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_eq!(admin_rows, 2);
}

#[tokio::test]
async fn test_muted_members_are_skipped() {
    let app = TestApp::new().await;
    let (admin_token, project_id) = setup_project(&app).await;

    let tech_id = app.seed_user("tech@test.de", "password123", "USER").await;
    let res = app
        .router
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/v1/users/{}/projects/{}", tech_id, project_id),
            &admin_token,
            Some(json!({"receiveNotifications": false})),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    create_ticket(
        &app,
        &admin_token,
        &project_id,
        json!({"assignedToId": tech_id}),
    )
    .await;

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = ?")
        .bind(&tech_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn test_read_state_and_counts() {
    let app = TestApp::new().await;
    let (admin_token, project_id) = setup_project(&app).await;

    let tech_id = app.seed_user("tech@test.de", "password123", "USER").await;
    let res = app
        .router
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/v1/users/{}/projects/{}", tech_id, project_id),
            &admin_token,
            Some(json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    for _ in 0..3 {
        create_ticket(
            &app,
            &admin_token,
            &project_id,
            json!({"assignedToId": tech_id}),
        )
        .await;
    }

    let tech_token = app.login("tech@test.de", "password123").await;

    let res = app
        .router
        .clone()
        .oneshot(request(
            "GET",
            "/api/v1/notifications/unread/count",
            &tech_token,
            None,
        ))
        .await
        .unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["data"]["count"], 3);

    // Mark one individually
    let res = app
        .router
        .clone()
        .oneshot(request(
            "GET",
            "/api/v1/notifications?limit=1",
            &tech_token,
            None,
        ))
        .await
        .unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["pagination"]["total"], 3);
    let first_id = body["data"][0]["id"].as_str().unwrap().to_string();

    let res = app
        .router
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/v1/notifications/{}/read", first_id),
            &tech_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["data"]["isRead"], true);

    // Then the rest in bulk
    let res = app
        .router
        .clone()
        .oneshot(request(
            "PUT",
            "/api/v1/notifications/read/all",
            &tech_token,
            Some(json!({})),
        ))
        .await
        .unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["data"]["markedAsRead"], 2);

    let res = app
        .router
        .clone()
        .oneshot(request(
            "GET",
            "/api/v1/notifications/unread/count",
            &tech_token,
            None,
        ))
        .await
        .unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn test_notifications_are_caller_scoped() {
    let app = TestApp::new().await;
    let (admin_token, project_id) = setup_project(&app).await;

    let tech_id = app.seed_user("tech@test.de", "password123", "USER").await;
    let res = app
        .router
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/v1/users/{}/projects/{}", tech_id, project_id),
            &admin_token,
            Some(json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    create_ticket(
        &app,
        &admin_token,
        &project_id,
        json!({"assignedToId": tech_id}),
    )
    .await;

    let tech_token = app.login("tech@test.de", "password123").await;
    let res = app
        .router
        .clone()
        .oneshot(request("GET", "/api/v1/notifications", &tech_token, None))
        .await
        .unwrap();
    let body = parse_body(res).await;
    let notification_id = body["data"][0]["id"].as_str().unwrap().to_string();

    // Another user cannot read or delete it
    app.seed_user("other@test.de", "password123", "USER").await;
    let other_token = app.login("other@test.de", "password123").await;

    let res = app
        .router
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/v1/notifications/{}", notification_id),
            &other_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .router
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/api/v1/notifications/{}", notification_id),
            &other_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_preferences_round_trip() {
    let app = TestApp::new().await;
    let (admin_token, project_id) = setup_project(&app).await;

    let tech_id = app.seed_user("tech@test.de", "password123", "USER").await;
    let res = app
        .router
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/v1/users/{}/projects/{}", tech_id, project_id),
            &admin_token,
            Some(json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let tech_token = app.login("tech@test.de", "password123").await;

    // Defaults come back as push-only
    let res = app
        .router
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/v1/notifications/preferences?projectId={}", project_id),
            &tech_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["data"]["receiveNotifications"], true);
    assert_eq!(body["data"]["notificationChannels"], json!(["push"]));

    let res = app
        .router
        .clone()
        .oneshot(request(
            "PUT",
            "/api/v1/notifications/preferences",
            &tech_token,
            Some(json!({
                "projectId": project_id,
                "receiveNotifications": false,
                "notificationChannels": ["email", "sms"]
            })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .router
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/v1/notifications/preferences?projectId={}", project_id),
            &tech_token,
            None,
        ))
        .await
        .unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["data"]["receiveNotifications"], false);
    assert_eq!(body["data"]["notificationChannels"], json!(["email", "sms"]));

    // Missing projectId is a validation error
    let res = app
        .router
        .clone()
        .oneshot(request(
            "GET",
            "/api/v1/notifications/preferences",
            &tech_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
