//! Question route tests: index, authoring, detail, voting and results

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use crate::helpers::{question_body, TestContext};

#[tokio::test]
async fn test_index_lists_newest_first() {
    let ctx = TestContext::new();
    ctx.insert_question("Older?", Utc::now() - Duration::days(10), &["a"]).await;
    ctx.insert_question("Newer?", Utc::now(), &["b"]).await;

    let response = ctx.get("/", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let texts: Vec<_> = response
        .body
        .as_array()
        .expect("array")
        .iter()
        .map(|q| q["text"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(texts, vec!["Newer?", "Older?"]);
}

#[tokio::test]
async fn test_anonymous_cannot_create_question() {
    let ctx = TestContext::new();

    let response = ctx.post("/questions", question_body("Tea?", &["Yes"]), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let index = ctx.get("/", None).await;
    assert_eq!(index.body, json!([]));
}

#[tokio::test]
async fn test_create_question_redirects_to_index() {
    let ctx = TestContext::new();
    let author = ctx.register_and_login().await;

    let response = ctx
        .post(
            "/questions",
            question_body("Best editor?", &["vim", "emacs", ""]),
            Some(&author.session_key),
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/"));
    assert_eq!(response.body["votes"], 0);
    assert_eq!(response.body["choices"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_invalid_question_returns_errors_and_input() {
    let ctx = TestContext::new();
    let author = ctx.register_and_login().await;

    let body = json!({
        "text": "   ",
        "choices": [
            { "choice_text": "fine" },
            { "choice_text": "x".repeat(201) },
            { "choice_text": "dropped", "delete": true },
        ],
    });
    let response = ctx.post("/questions", body, Some(&author.session_key)).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = &response.body["errors"];
    assert!(errors.get("question.text").is_some());
    assert!(errors.get("choices[1].choice_text").is_some());
    assert!(errors.get("choices[0].choice_text").is_none());
    assert_eq!(response.body["input"]["text"], "   ");
    assert_eq!(response.body["input"]["choices"].as_array().unwrap().len(), 3);

    // Nothing was saved
    assert_eq!(ctx.get("/", None).await.body, json!([]));
}

#[tokio::test]
async fn test_question_needs_a_choice() {
    let ctx = TestContext::new();
    let author = ctx.register_and_login().await;

    let response = ctx
        .post("/questions", question_body("Lonely?", &[]), Some(&author.session_key))
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["errors"].get("choices").is_some());
}

#[tokio::test]
async fn test_malformed_body_is_a_field_error() {
    let ctx = TestContext::new();
    let author = ctx.register_and_login().await;

    let response = ctx
        .post("/questions", json!({ "text": 42 }), Some(&author.session_key))
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["errors"].get("body").is_some());
}

#[tokio::test]
async fn test_detail_hides_old_questions_from_regular_users() {
    let ctx = TestContext::new();
    let user = ctx.register_and_login().await;
    let admin = ctx.superuser().await;

    let (recent, _) = ctx.insert_question("Fresh?", Utc::now() - Duration::days(1), &["a"]).await;
    let (old, _) = ctx.insert_question("Stale?", Utc::now() - Duration::days(4), &["a"]).await;

    let response = ctx.get(&format!("/questions/{}", recent.id), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["text"], "Fresh?");

    for session in [None, Some(user.session_key.as_str())] {
        let response = ctx.get(&format!("/questions/{}", old.id), session).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body, json!({ "detail": "Not found." }));
    }

    let response = ctx
        .get(&format!("/questions/{}", old.id), Some(&admin.session_key))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // Hidden and missing look the same
    let missing = ctx.get("/questions/999999", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body, json!({ "detail": "Not found." }));
}

#[tokio::test]
async fn test_non_numeric_ids_are_not_found() {
    let ctx = TestContext::new();
    let voter = ctx.register_and_login().await;

    for uri in ["/questions/abc", "/questions/abc/results", "/users/abc"] {
        let response = ctx.get(uri, None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(response.body, json!({ "detail": "Not found." }));
    }

    let response = ctx
        .post("/questions/1x/vote", json!({ "choice": 1 }), Some(&voter.session_key))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, json!({ "detail": "Not found." }));
}

#[tokio::test]
async fn test_results_are_not_restricted() {
    let ctx = TestContext::new();
    let (old, _) = ctx.insert_question("Ancient?", Utc::now() - Duration::days(30), &["a", "b"]).await;

    let response = ctx.get(&format!("/questions/{}/results", old.id), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["choices"][0]["percent"], 0);
}

#[tokio::test]
async fn test_vote_rejections_map_to_statuses() {
    let ctx = TestContext::new();
    let voter = ctx.register_and_login().await;
    let (question, choices) = ctx.insert_question("Pick?", Utc::now(), &["a", "b"]).await;
    let vote_uri = format!("/questions/{}/vote", question.id);

    let response = ctx.post(&vote_uri, json!({ "choice": choices[0].id }), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error_message"], "You are not authorized");
    assert_eq!(response.body["question"]["id"], question.id);

    let response = ctx.post(&vote_uri, json!({}), Some(&voter.session_key)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error_message"], "You didn't select a choice");

    let response = ctx
        .request(axum::http::Method::POST, &vote_uri, None, Some(&voter.session_key))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = ctx
        .post(&vote_uri, json!({ "choice": choices[0].id }), Some(&voter.session_key))
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(
        response.location(),
        Some(format!("/questions/{}/results", question.id).as_str())
    );

    let response = ctx
        .post(&vote_uri, json!({ "choice": choices[1].id }), Some(&voter.session_key))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error_message"], "You have already voted in this poll");
    assert_eq!(response.body["question"]["votes"], 1);
}

#[tokio::test]
async fn test_vote_on_missing_question() {
    let ctx = TestContext::new();
    let voter = ctx.register_and_login().await;

    let response = ctx
        .post("/questions/424242/vote", json!({ "choice": 1 }), Some(&voter.session_key))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new();

    let response = ctx.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["backend"], "memory");
    assert_eq!(response.body["database_healthy"], true);
}
