//! Test context for unified test setup
//!
//! This module provides a test context that builds the full application on
//! the in-memory backend and drives the router with `oneshot` requests.

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Once;
use tower::ServiceExt;

use pollbooth::config::{Settings, StorageBackend};
use pollbooth::database::{DatabaseService, PollStore};
use pollbooth::models::{Choice, Question};
use pollbooth::services::MemorySessionStore;
use pollbooth::ServiceFactory;

use super::test_data::{registration, registration_body, unique_username, TEST_PASSWORD};

static INIT: Once = Once::new();

/// Initialize logging for tests (called once)
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("pollbooth=debug")
            .with_test_writer()
            .try_init();
    });
}

/// Settings for tests: memory backend, cheap hashing, generous throttle
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.storage.backend = StorageBackend::Memory;
    settings.auth.argon2_memory_kib = 1024;
    settings.auth.argon2_iterations = 1;
    settings.auth.login_attempts_per_minute = 100;
    settings.logging.level = "debug".to_string();
    settings
}

/// A decoded response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(axum::http::header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(axum::http::header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
    }
}

/// A logged-in test user
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub session_key: String,
}

/// Application wired to in-memory stores
pub struct TestContext {
    pub app: Router,
    pub services: ServiceFactory,
    pub database: DatabaseService,
    pub settings: Settings,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: Settings) -> Self {
        init_test_logging();

        let database = DatabaseService::in_memory();
        let services = ServiceFactory::new(
            &settings,
            database.clone(),
            std::sync::Arc::new(MemorySessionStore::new()),
        )
        .expect("Failed to build services");
        let app = pollbooth::build_app(&settings, services.clone());

        Self {
            app,
            services,
            database,
            settings,
        }
    }

    /// Send a request through the router
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        session_key: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = session_key {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", key));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.send(request).await
    }

    /// Send a prebuilt request through the router
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, session_key: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, None, session_key).await
    }

    pub async fn post(&self, uri: &str, body: Value, session_key: Option<&str>) -> TestResponse {
        self.request(Method::POST, uri, Some(body), session_key).await
    }

    /// Register a user over HTTP and log them in
    pub async fn register_and_login(&self) -> TestUser {
        let username = unique_username();

        let response = self.post("/register", registration_body(&username), None).await;
        assert_eq!(response.status, StatusCode::CREATED, "register: {:?}", response.body);

        self.login(&username).await
    }

    pub async fn login(&self, username: &str) -> TestUser {
        let response = self
            .post(
                "/login",
                json!({ "username": username, "password": TEST_PASSWORD }),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login: {:?}", response.body);

        TestUser {
            id: response.body["user"]["id"].as_i64().expect("user id"),
            username: username.to_string(),
            session_key: response.body["session_key"]
                .as_str()
                .expect("session key")
                .to_string(),
        }
    }

    /// Create a superuser through the account service and log them in
    pub async fn superuser(&self) -> TestUser {
        let username = unique_username();
        self.services
            .account_service
            .create_superuser(registration(&username))
            .await
            .expect("Failed to create superuser");

        self.login(&username).await
    }

    /// Author a question over HTTP; returns its id
    pub async fn create_question(&self, author: &TestUser, body: Value) -> i64 {
        let response = self.post("/questions", body, Some(&author.session_key)).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "create: {:?}", response.body);
        response.body["id"].as_i64().expect("question id")
    }

    /// Insert a question with an explicit publication date
    pub async fn insert_question(
        &self,
        text: &str,
        pub_date: DateTime<Utc>,
        choices: &[&str],
    ) -> (Question, Vec<Choice>) {
        self.database
            .polls
            .create_question(
                super::test_data::new_question(text, pub_date),
                choices.iter().map(|c| c.to_string()).collect(),
            )
            .await
            .expect("Failed to insert question")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
