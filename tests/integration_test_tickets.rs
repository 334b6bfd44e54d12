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

async fn grant(app: &TestApp, admin_token: &str, user_id: &str, project_id: &str, fields: Value) {
    let res = app
        .router
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/v1/users/{}/projects/{}", user_id, project_id),
            admin_token,
            Some(fields),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ticket_numbers_are_sequential_per_project() {
    let app = TestApp::new().await;
    let (token, project_id) = setup_project(&app).await;

    for expected in ["P-100-TKT-0001", "P-100-TKT-0002", "P-100-TKT-0003"] {
        let res = app
            .router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/v1/projects/{}/tickets", project_id),
                &token,
                Some(json!({"title": "Defekt", "description": "Etwas kaputt", "category": "Allgemein"})),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body = parse_body(res).await;
        assert_eq!(body["data"]["ticketNumber"], expected);
        assert_eq!(body["data"]["status"], "New");
        assert_eq!(body["data"]["priority"], "Normal");
    }
}

#[tokio::test]
async fn test_ticket_creation_validates_required_fields() {
    let app = TestApp::new().await;
    let (token, project_id) = setup_project(&app).await;

    let res = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/projects/{}/tickets", project_id),
            &token,
            Some(json!({"title": "", "description": "x", "category": "y"})),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_listing_respects_view_all_tickets() {
    let app = TestApp::new().await;
    let (admin_token, project_id) = setup_project(&app).await;

    // Admin creates two tickets
    for title in ["Eins", "Zwei"] {
        let res = app
            .router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/v1/projects/{}/tickets", project_id),
                &admin_token,
                Some(json!({"title": title, "description": "d", "category": "c"})),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    // A restricted member creates one of their own
    let user_id = app.seed_user("tech@test.de", "password123", "USER").await;
    grant(
        &app,
        &admin_token,
        &user_id,
        &project_id,
        json!({"canViewAllTickets": false, "canCreateTickets": true}),
    )
    .await;
    let tech_token = app.login("tech@test.de", "password123").await;

    let res = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/projects/{}/tickets", project_id),
            &tech_token,
            Some(json!({"title": "Meins", "description": "d", "category": "c"})),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // The member only sees their own ticket
    let res = app
        .router
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/v1/projects/{}/tickets", project_id),
            &tech_token,
            None,
        ))
        .await
        .unwrap();
    let body = parse_body(res).await;
    let tickets = body["data"].as_array().unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["title"], "Meins");

    // The admin sees all three
    let res = app
        .router
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/v1/projects/{}/tickets", project_id),
            &admin_token,
            None,
        ))
        .await
        .unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_capability_gates_on_ticket_mutations() {
    let app = TestApp::new().await;
    let (admin_token, project_id) = setup_project(&app).await;

    let res = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/projects/{}/tickets", project_id),
            &admin_token,
            Some(json!({"title": "Defekt", "description": "d", "category": "c"})),
        ))
        .await
        .unwrap();
    let ticket = parse_body(res).await;
    let ticket_id = ticket["data"]["id"].as_str().unwrap().to_string();

    let user_id = app.seed_user("tech@test.de", "password123", "USER").await;
    grant(
        &app,
        &admin_token,
        &user_id,
        &project_id,
        json!({
            "canEditTickets": false,
            "canDeleteTickets": false,
            "canViewAllTickets": true
        }),
    )
    .await;
    let tech_token = app.login("tech@test.de", "password123").await;

    let res = app
        .router
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/v1/projects/{}/tickets/{}", project_id, ticket_id),
            &tech_token,
            Some(json!({"title": "Umbenannt"})),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = parse_body(res).await;
    assert!(body["error"].as_str().unwrap().contains("editTickets"));

    let res = app
        .router
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/api/v1/projects/{}/tickets/{}", project_id, ticket_id),
            &tech_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_approval_status_needs_approve_workflow() {
    let app = TestApp::new().await;
    let (admin_token, project_id) = setup_project(&app).await;

    let res = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/projects/{}/tickets", project_id),
            &admin_token,
            Some(json!({"title": "Defekt", "description": "d", "category": "c"})),
        ))
        .await
        .unwrap();
    let ticket = parse_body(res).await;
    let ticket_id = ticket["data"]["id"].as_str().unwrap().to_string();

    let user_id = app.seed_user("tech@test.de", "password123", "USER").await;
    grant(
        &app,
        &admin_token,
        &user_id,
        &project_id,
        json!({"canEditTickets": true, "canApproveWorkflow": false, "canViewAllTickets": true}),
    )
    .await;
    let tech_token = app.login("tech@test.de", "password123").await;

    // Regular edit works
    let res = app
        .router
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/v1/projects/{}/tickets/{}", project_id, ticket_id),
            &tech_token,
            Some(json!({"status": "InProgress"})),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Approval does not
    let res = app
        .router
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/v1/projects/{}/tickets/{}", project_id, ticket_id),
            &tech_token,
            Some(json!({"status": "Approved"})),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = parse_body(res).await;
    assert!(body["error"].as_str().unwrap().contains("approveWorkflow"));
}

#[tokio::test]
async fn test_assignment_requires_project_membership() {
    let app = TestApp::new().await;
    let (admin_token, project_id) = setup_project(&app).await;

    let res = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/projects/{}/tickets", project_id),
            &admin_token,
            Some(json!({"title": "Defekt", "description": "d", "category": "c"})),
        ))
        .await
        .unwrap();
    let ticket = parse_body(res).await;
    let ticket_id = ticket["data"]["id"].as_str().unwrap().to_string();

    // A user without a grant cannot be the assignee
    let stranger_id = app.seed_user("stranger@test.de", "password123", "USER").await;
    let res = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/projects/{}/tickets/{}/assign", project_id, ticket_id),
            &admin_token,
            Some(json!({"assignedTo": stranger_id})),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // With a grant the assignment sticks
    grant(
        &app,
        &admin_token,
        &stranger_id,
        &project_id,
        json!({"userType": "technician"}),
    )
    .await;
    let res = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/projects/{}/tickets/{}/assign", project_id, ticket_id),
            &admin_token,
            Some(json!({"assignedTo": stranger_id})),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["data"]["assignedToId"], stranger_id.as_str());
}

#[tokio::test]
async fn test_escalation_sets_urgent_priority() {
    let app = TestApp::new().await;
    let (admin_token, project_id) = setup_project(&app).await;

    let res = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/projects/{}/tickets", project_id),
            &admin_token,
            Some(json!({"title": "Defekt", "description": "d", "category": "c"})),
        ))
        .await
        .unwrap();
    let ticket = parse_body(res).await;
    let ticket_id = ticket["data"]["id"].as_str().unwrap().to_string();

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
    let body = parse_body(res).await;
    assert_eq!(body["data"]["priority"], "Urgent");
}

#[tokio::test]
async fn test_watcher_management() {
    let app = TestApp::new().await;
    let (admin_token, project_id) = setup_project(&app).await;

    let res = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/projects/{}/tickets", project_id),
            &admin_token,
            Some(json!({"title": "Defekt", "description": "d", "category": "c"})),
        ))
        .await
        .unwrap();
    let ticket = parse_body(res).await;
    let ticket_id = ticket["data"]["id"].as_str().unwrap().to_string();

    let watcher_id = app.seed_user("watcher@test.de", "password123", "USER").await;
    grant(&app, &admin_token, &watcher_id, &project_id, json!({})).await;

    let res = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/projects/{}/tickets/{}/watchers", project_id, ticket_id),
            &admin_token,
            Some(json!({"userId": watcher_id})),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Adding twice stays a single entry
    let res = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/projects/{}/tickets/{}/watchers", project_id, ticket_id),
            &admin_token,
            Some(json!({"userId": watcher_id})),
        ))
        .await
        .unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["data"]["watcherIds"].as_array().unwrap().len(), 1);

    let res = app
        .router
        .clone()
        .oneshot(request(
            "DELETE",
            &format!(
                "/api/v1/projects/{}/tickets/{}/watchers/{}",
                project_id, ticket_id, watcher_id
            ),
            &admin_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert!(body["data"]["watcherIds"].as_array().unwrap().is_empty());
}
