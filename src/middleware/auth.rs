//! Authentication middleware
//!
//! Resolves the session key a request carries, from the `Authorization:
//! Bearer` header or the session cookie, into a [`Requester`]. Unknown or
//! expired keys make the request anonymous rather than failing it.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use tracing::debug;

use crate::handlers::AppState;
use crate::models::Requester;
use crate::utils::errors::PollError;
use crate::utils::helpers::{cookie_value, parse_bearer_token};

/// Identity of the caller, if any
#[derive(Debug, Clone, Default)]
pub struct CurrentUser {
    pub requester: Option<Requester>,
    /// Key the request presented, live or not
    pub session_key: Option<String>,
}

impl CurrentUser {
    pub fn requester(&self) -> Option<&Requester> {
        self.requester.as_ref()
    }
}

/// Session key from the bearer token, falling back to the cookie
pub fn session_key_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer_token);
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|header| cookie_value(header, cookie_name))
        .map(str::to_string)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = PollError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(session_key) = session_key_from_headers(&parts.headers, &state.cookie_name) else {
            return Ok(Self::default());
        };

        let requester = state
            .services
            .account_service
            .authenticate(&session_key)
            .await?;
        if requester.is_none() {
            debug!("Request carried an unknown or expired session key");
        }

        Ok(Self {
            requester,
            session_key: Some(session_key),
        })
    }
}
