//! HTTP handlers module
//!
//! This module contains the axum handlers organized by area:
//! - Question handlers for the index, authoring, detail, voting and results
//! - Account handlers for registration, sessions and profiles

pub mod accounts;
pub mod questions;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{async_trait, Json, Router};
use serde::de::DeserializeOwned;
use tower_http::cors::CorsLayer;

use crate::middleware::logging::trace_layer;
use crate::services::ServiceFactory;
use crate::utils::errors::PollError;
use crate::utils::validation::FieldErrors;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<ServiceFactory>,
    pub cookie_name: String,
}

impl AppState {
    pub fn new(services: ServiceFactory, cookie_name: impl Into<String>) -> Self {
        Self {
            services: Arc::new(services),
            cookie_name: cookie_name.into(),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(questions::index))
        .route("/health", get(health))
        .route("/questions", post(questions::create_question))
        .route("/questions/:id", get(questions::detail))
        .route("/questions/:id/vote", post(questions::vote))
        .route("/questions/:id/results", get(questions::results))
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/logout", post(accounts::logout))
        .route(
            "/users/:id",
            get(accounts::profile)
                .put(accounts::update_profile)
                .delete(accounts::delete_user),
        )
        .layer(cors)
        .layer(trace_layer())
        .with_state(state)
}

async fn health(axum::extract::State(state): axum::extract::State<AppState>) -> impl IntoResponse {
    let health = state.services.health_check().await;
    let status = if health.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(health))
}

/// JSON body whose parse failures are reported as field errors
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = PollError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(PollError::Validation(FieldErrors::single(
                "body",
                &rejection.body_text(),
            ))),
        }
    }
}

/// Numeric id from the route; an id that does not parse names nothing
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = PollError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i64>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(_) => Err(PollError::NotFound(parts.uri.path().to_string())),
        }
    }
}
