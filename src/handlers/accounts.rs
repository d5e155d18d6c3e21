//! Account handlers

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;

use super::{AppState, IdPath, JsonBody};
use crate::middleware::auth::CurrentUser;
use crate::models::{LoginRequest, RegisterRequest, UpdateUserRequest, User};
use crate::utils::errors::Result;

/// POST `/register`
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state.services.account_service.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST `/login`
///
/// The session key is returned in the body and set as a cookie.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Response> {
    let (user, session_key) = state.services.account_service.login(request).await?;

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        state.cookie_name,
        session_key,
        state.services.session_service.ttl().as_secs()
    );

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({ "session_key": session_key, "user": user })),
    )
        .into_response())
}

/// POST `/logout`
pub async fn logout(State(state): State<AppState>, user: CurrentUser) -> Result<Response> {
    state
        .services
        .account_service
        .logout(user.session_key.as_deref())
        .await?;

    let cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", state.cookie_name);
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to("/")).into_response())
}

/// GET `/users/:id`
pub async fn profile(State(state): State<AppState>, IdPath(user_id): IdPath) -> Result<Json<User>> {
    let user = state.services.account_service.profile(user_id).await?;
    Ok(Json(user))
}

/// PUT `/users/:id`
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    IdPath(user_id): IdPath,
    JsonBody(request): JsonBody<UpdateUserRequest>,
) -> Result<Json<User>> {
    let updated = state
        .services
        .account_service
        .update_profile(user_id, request, user.requester())
        .await?;
    Ok(Json(updated))
}

/// DELETE `/users/:id`
pub async fn delete_user(
    State(state): State<AppState>,
    user: CurrentUser,
    IdPath(user_id): IdPath,
) -> Result<StatusCode> {
    state
        .services
        .account_service
        .delete_user(user_id, user.requester())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
