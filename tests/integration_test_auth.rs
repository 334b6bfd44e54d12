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

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_login_returns_token_and_projects() {
    let app = TestApp::new().await;
    app.seed_user("admin@test.de", "password123", "ADMIN").await;
    let token = app.login("admin@test.de", "password123").await;

    // Create two projects so selection is required
    for (name, number) in [("Hafen City", "P-100"), ("Altbau Nord", "P-200")] {
        let res = app
            .router
            .clone()
            .oneshot(post_json(
                "/api/v1/projects",
                Some(&token),
                json!({"name": name, "projectNumber": number}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/login",
            None,
            json!({"email": "admin@test.de", "password": "password123"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = parse_body(res).await;
    assert_eq!(body["success"], true);
    assert!(body["data"]["token"].as_str().is_some());
    assert_eq!(body["data"]["user"]["email"], "admin@test.de");
    assert!(body["data"]["user"].get("passwordHash").is_none());
    assert_eq!(body["data"]["availableProjects"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["requiresProjectSelection"], true);
    assert!(body["data"]["autoSelectedProject"].is_null());
}

#[tokio::test]
async fn test_login_auto_selects_single_project() {
    let app = TestApp::new().await;
    app.seed_user("admin@test.de", "password123", "ADMIN").await;
    let admin_token = app.login("admin@test.de", "password123").await;

    let res = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/v1/projects",
            Some(&admin_token),
            json!({"name": "Solo", "projectNumber": "P-1"}),
        ))
        .await
        .unwrap();
    let project = parse_body(res).await;
    let project_id = project["data"]["id"].as_str().unwrap().to_string();

    // A regular user with exactly one grant
    let user_id = app.seed_user("tech@test.de", "password123", "USER").await;
    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/v1/users/{}/projects/{}", user_id, project_id))
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {}", admin_token))
                .body(Body::from(json!({"accessLevel": "WRITE"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/login",
            None,
            json!({"email": "tech@test.de", "password": "password123"}),
        ))
        .await
        .unwrap();
    let body = parse_body(res).await;

    assert_eq!(body["data"]["requiresProjectSelection"], false);
    assert_eq!(body["data"]["autoSelectedProject"]["id"], project_id.as_str());
    assert_eq!(body["data"]["autoSelectedProject"]["accessLevel"], "WRITE");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = TestApp::new().await;
    app.seed_user("user@test.de", "password123", "USER").await;

    let res = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/login",
            None,
            json!({"email": "user@test.de", "password": "wrong"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = parse_body(res).await;
    assert_eq!(body["success"], false);

    let res = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/login",
            None,
            json!({"email": "nobody@test.de", "password": "password123"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rejects_deactivated_account() {
    let app = TestApp::new().await;
    app.seed_user("admin@test.de", "password123", "ADMIN").await;
    let admin_token = app.login("admin@test.de", "password123").await;

    let user_id = app.seed_user("gone@test.de", "password123", "USER").await;

    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/v1/users/{}", user_id))
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {}", admin_token))
                .body(Body::from(json!({"isActive": false}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/login",
            None,
            json!({"email": "gone@test.de", "password": "password123"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_verify_and_missing_token() {
    let app = TestApp::new().await;
    app.seed_user("user@test.de", "password123", "USER").await;
    let token = app.login("user@test.de", "password123").await;

    let res = app
        .router
        .clone()
        .oneshot(get("/api/v1/auth/verify", Some(&token)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["data"]["email"], "user@test.de");

    let res = app
        .router
        .clone()
        .oneshot(get("/api/v1/auth/verify", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .router
        .clone()
        .oneshot(get("/api/v1/auth/verify", Some("not-a-jwt")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_switch_project_requires_grant() {
    let app = TestApp::new().await;
    app.seed_user("admin@test.de", "password123", "ADMIN").await;
    let admin_token = app.login("admin@test.de", "password123").await;

    let res = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/v1/projects",
            Some(&admin_token),
            json!({"name": "Werk Sued", "projectNumber": "P-300"}),
        ))
        .await
        .unwrap();
    let project = parse_body(res).await;
    let project_id = project["data"]["id"].as_str().unwrap().to_string();

    app.seed_user("outsider@test.de", "password123", "USER").await;
    let outsider_token = app.login("outsider@test.de", "password123").await;

    let res = app
        .router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/auth/switch-project/{}", project_id),
            Some(&outsider_token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The admin can switch without a grant
    let res = app
        .router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/auth/switch-project/{}", project_id),
            Some(&admin_token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["data"]["projectNumber"], "P-300");
}
