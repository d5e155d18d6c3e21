//! Test data helpers for creating test objects
//!
//! Usernames are generated with `fake` and suffixed with a process-wide
//! counter so they never collide within a run.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use fake::faker::internet::en::Username;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use serde_json::{json, Value};

use pollbooth::models::{NewQuestion, RegisterRequest};

static COUNTER: AtomicU64 = AtomicU64::new(1);

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Unique username made only of allowed characters
pub fn unique_username() -> String {
    let base: String = Username().fake();
    let base: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || "@.+-_".contains(*c))
        .take(40)
        .collect();
    format!("{}_{}", base, COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Registration for a fresh user
pub fn registration(username: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: format!("{}@example.com", username.replace('@', "_")),
        first_name: FirstName().fake(),
        last_name: LastName().fake(),
        password: TEST_PASSWORD.to_string(),
        password_confirm: TEST_PASSWORD.to_string(),
        avatar: None,
    }
}

/// Registration as a JSON body
pub fn registration_body(username: &str) -> Value {
    let request = registration(username);
    json!({
        "username": request.username,
        "email": request.email,
        "first_name": request.first_name,
        "last_name": request.last_name,
        "password": request.password,
        "password_confirm": request.password_confirm,
    })
}

/// Question authoring body with the given choice texts
pub fn question_body(text: &str, choices: &[&str]) -> Value {
    json!({
        "text": text,
        "short_description": "A test question",
        "choices": choices
            .iter()
            .map(|choice| json!({ "choice_text": choice }))
            .collect::<Vec<_>>(),
    })
}

/// Question published at a fixed time
pub fn new_question(text: &str, pub_date: DateTime<Utc>) -> NewQuestion {
    NewQuestion {
        text: text.to_string(),
        pub_date,
        short_description: None,
        description: None,
        image: None,
    }
}
