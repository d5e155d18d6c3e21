//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use rand::{distributions::Alphanumeric, Rng};

/// Length of generated session keys
pub const SESSION_KEY_LENGTH: usize = 40;

/// Generate a random alphanumeric session key
pub fn generate_session_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_KEY_LENGTH)
        .map(char::from)
        .collect()
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn parse_bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Find a cookie value in a `Cookie` header
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
