//! Account route tests: registration, sessions and profiles

use axum::body::Body;
use axum::http::header::COOKIE;
use axum::http::{Method, Request, StatusCode};
use serde_json::json;

use crate::helpers::{registration_body, test_settings, unique_username, TestContext, TEST_PASSWORD};

#[tokio::test]
async fn test_register_returns_user_without_password() {
    let ctx = TestContext::new();
    let username = unique_username();

    let response = ctx.post("/register", registration_body(&username), None).await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["username"], username.as_str());
    assert_eq!(response.body["is_superuser"], false);
    assert!(response.body.get("password").is_none());
}

#[tokio::test]
async fn test_register_cannot_grant_superuser() {
    let ctx = TestContext::new();
    let username = unique_username();
    let mut body = registration_body(&username);
    body["is_superuser"] = json!(true);

    let response = ctx.post("/register", body, None).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["is_superuser"], false);
}

#[tokio::test]
async fn test_register_validation_errors() {
    let ctx = TestContext::new();
    let taken = ctx.register_and_login().await;

    let mut body = registration_body(&taken.username);
    body["email"] = json!("fresh@example.com");
    let response = ctx.post("/register", body, None).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["errors"].get("username").is_some());

    let mut body = registration_body(&unique_username());
    body["password_confirm"] = json!("something-else");
    body["username"] = json!("no spaces allowed");
    let response = ctx.post("/register", body, None).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["errors"].get("password_confirm").is_some());
    assert!(response.body["errors"].get("username").is_some());
}

#[tokio::test]
async fn test_login_sets_cookie_and_cookie_authenticates() {
    let ctx = TestContext::new();
    let user = ctx.register_and_login().await;

    let response = ctx
        .post(
            "/login",
            json!({ "username": user.username, "password": TEST_PASSWORD }),
            None,
        )
        .await;
    let cookie = response.set_cookie().expect("session cookie");
    assert!(cookie.starts_with("sessionid="));
    assert!(cookie.contains("HttpOnly"));

    let session_key = response.body["session_key"].as_str().unwrap();
    let request = Request::builder()
        .method(Method::PUT)
        .uri(format!("/users/{}", user.id))
        .header(COOKIE, format!("sessionid={}", session_key))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "first_name": "Cookie" }).to_string()))
        .unwrap();
    let response = ctx.send(request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["first_name"], "Cookie");
}

#[tokio::test]
async fn test_login_failures_are_generic() {
    let ctx = TestContext::new();
    let user = ctx.register_and_login().await;

    let wrong_password = ctx
        .post(
            "/login",
            json!({ "username": user.username, "password": "nope-nope" }),
            None,
        )
        .await;
    let unknown_user = ctx
        .post(
            "/login",
            json!({ "username": "ghost", "password": "nope-nope" }),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_user.body);
}

#[tokio::test]
async fn test_login_is_throttled_per_username() {
    let mut settings = test_settings();
    settings.auth.login_attempts_per_minute = 2;
    let ctx = TestContext::with_settings(settings);

    let attempt = json!({ "username": "target", "password": "guess-guess" });
    for _ in 0..2 {
        let response = ctx.post("/login", attempt.clone(), None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
    let response = ctx.post("/login", attempt, None).await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);

    let other = ctx
        .post("/login", json!({ "username": "bystander", "password": "x" }), None)
        .await;
    assert_eq!(other.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let ctx = TestContext::new();
    let user = ctx.register_and_login().await;

    let response = ctx.post("/logout", json!({}), Some(&user.session_key)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/"));
    assert!(response.set_cookie().unwrap().contains("Max-Age=0"));

    // The old key no longer authenticates
    let response = ctx
        .request(
            Method::PUT,
            &format!("/users/{}", user.id),
            Some(json!({ "first_name": "After" })),
            Some(&user.session_key),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // Logging out again, or without any session, still redirects
    let response = ctx.request(Method::POST, "/logout", None, None).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_profile_is_public() {
    let ctx = TestContext::new();
    let user = ctx.register_and_login().await;

    let response = ctx.get(&format!("/users/{}", user.id), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], user.username.as_str());

    let response = ctx.get("/users/987654", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_profile_of_someone_else_is_not_found() {
    let ctx = TestContext::new();
    let alice = ctx.register_and_login().await;
    let bob = ctx.register_and_login().await;

    let response = ctx
        .request(
            Method::PUT,
            &format!("/users/{}", alice.id),
            Some(json!({ "first_name": "Hacked" })),
            Some(&bob.session_key),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, json!({ "detail": "Not found." }));

    let profile = ctx.get(&format!("/users/{}", alice.id), None).await;
    assert_ne!(profile.body["first_name"], "Hacked");
}

#[tokio::test]
async fn test_update_profile_conflicts_are_field_errors() {
    let ctx = TestContext::new();
    let alice = ctx.register_and_login().await;
    let bob = ctx.register_and_login().await;

    let response = ctx
        .request(
            Method::PUT,
            &format!("/users/{}", bob.id),
            Some(json!({ "username": alice.username })),
            Some(&bob.session_key),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["errors"].get("username").is_some());
}

#[tokio::test]
async fn test_delete_account() {
    let ctx = TestContext::new();
    let alice = ctx.register_and_login().await;
    let bob = ctx.register_and_login().await;
    let admin = ctx.superuser().await;

    let uri = format!("/users/{}", alice.id);
    let response = ctx.request(Method::DELETE, &uri, None, Some(&bob.session_key)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = ctx.request(Method::DELETE, &uri, None, Some(&admin.session_key)).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(ctx.get(&uri, None).await.status, StatusCode::NOT_FOUND);

    let uri = format!("/users/{}", bob.id);
    let response = ctx.request(Method::DELETE, &uri, None, Some(&bob.session_key)).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
}
