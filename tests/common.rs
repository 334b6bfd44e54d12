use facility_backend::{
    api::router::create_router,
    config::Config,
    domain::models::access::NotificationChannel,
    domain::models::notification::Notification,
    domain::models::user::{NewUserParams, User},
    domain::ports::DeliveryService,
    domain::services::fanout::NotificationFanout,
    error::AppError,
    infra::repositories::{
        sqlite_access_repo::SqliteAccessRepo, sqlite_notification_repo::SqliteNotificationRepo,
        sqlite_project_repo::SqliteProjectRepo, sqlite_role_repo::SqliteRoleRepo,
        sqlite_ticket_repo::SqliteTicketRepo, sqlite_user_repo::SqliteUserRepo,
    },
    state::AppState,
};

use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use rand::rngs::OsRng;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

/// Records deliveries instead of calling the gateway.
pub struct MockDeliveryService {
    pub deliveries: Mutex<Vec<(NotificationChannel, String)>>,
}

impl MockDeliveryService {
    pub fn new() -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DeliveryService for MockDeliveryService {
    async fn deliver(
        &self,
        channel: NotificationChannel,
        notification: &Notification,
    ) -> Result<(), AppError> {
        self.deliveries
            .lock()
            .unwrap()
            .push((channel, notification.user_id.clone()));
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub delivery: Arc<MockDeliveryService>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret: "test-secret".to_string(),
            delivery_gateway_url: "http://localhost".to_string(),
            delivery_gateway_token: "token".to_string(),
        };

        let delivery = Arc::new(MockDeliveryService::new());
        let access_repo = Arc::new(SqliteAccessRepo::new(pool.clone()));
        let notification_repo = Arc::new(SqliteNotificationRepo::new(pool.clone()));

        let notifier = Arc::new(NotificationFanout::new(
            access_repo.clone(),
            notification_repo.clone(),
            delivery.clone(),
        ));

        let state = Arc::new(AppState {
            config,
            user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
            project_repo: Arc::new(SqliteProjectRepo::new(pool.clone())),
            access_repo,
            role_repo: Arc::new(SqliteRoleRepo::new(pool.clone())),
            ticket_repo: Arc::new(SqliteTicketRepo::new(pool.clone())),
            notification_repo,
            notifier,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            delivery,
        }
    }

    /// Inserts a user directly, bypassing the API, and returns their id.
    pub async fn seed_user(&self, email: &str, password: &str, role: &str) -> String {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string();

        let user = User::new(NewUserParams {
            first_name: "Test".to_string(),
            last_name: email.split('@').next().unwrap_or("User").to_string(),
            email: email.to_string(),
            password_hash,
            phone_number: None,
            role: Some(role.to_string()),
            is_technician: false,
            created_by: None,
        });

        let created = self.state.user_repo.create(&user).await.unwrap();
        created.id
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let payload = serde_json::json!({
            "email": email,
            "password": password
        });

        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        body["data"]["token"]
            .as_str()
            .expect("No token in login response")
            .to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
