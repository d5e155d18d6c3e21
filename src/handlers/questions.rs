//! Question handlers

use axum::extract::State;
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;

use super::{AppState, IdPath, JsonBody};
use crate::middleware::auth::CurrentUser;
use crate::models::{CreateQuestionRequest, QuestionDetail, QuestionSummary, VoteOutcome, VoteRejection, VoteRequest};
use crate::utils::errors::{PollError, Result};

/// GET `/`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<QuestionSummary>>> {
    let questions = state.services.question_service.list_questions().await?;
    Ok(Json(questions))
}

/// POST `/questions`
///
/// Invalid submissions come back with the field errors and the input as sent.
pub async fn create_question(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(request): JsonBody<CreateQuestionRequest>,
) -> Result<Response> {
    let result = state
        .services
        .question_service
        .create_question(request.clone(), user.requester())
        .await;

    match result {
        Ok(detail) => Ok((StatusCode::SEE_OTHER, [(LOCATION, "/")], Json(detail)).into_response()),
        Err(PollError::Validation(errors)) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": errors, "input": request })),
        )
            .into_response()),
        Err(e) => Err(e),
    }
}

/// GET `/questions/:id`
pub async fn detail(
    State(state): State<AppState>,
    user: CurrentUser,
    IdPath(question_id): IdPath,
) -> Result<Json<QuestionDetail>> {
    let detail = state
        .services
        .question_service
        .question_detail(question_id, user.requester())
        .await?;
    Ok(Json(detail))
}

/// POST `/questions/:id/vote`
///
/// A missing or unreadable body counts as no selection.
pub async fn vote(
    State(state): State<AppState>,
    user: CurrentUser,
    IdPath(question_id): IdPath,
    body: Option<Json<VoteRequest>>,
) -> Result<Response> {
    let choice_id = body.and_then(|Json(request)| request.choice);

    let outcome = state
        .services
        .voting_service
        .cast_vote(question_id, choice_id, user.requester())
        .await?;

    match outcome {
        VoteOutcome::Recorded { question_id } => {
            Ok(Redirect::to(&format!("/questions/{}/results", question_id)).into_response())
        }
        VoteOutcome::Rejected { reason, question } => Ok((
            rejection_status(reason),
            Json(json!({
                "error_message": reason.message(),
                "question": question,
            })),
        )
            .into_response()),
    }
}

/// GET `/questions/:id/results`
pub async fn results(
    State(state): State<AppState>,
    IdPath(question_id): IdPath,
) -> Result<Json<QuestionDetail>> {
    let results = state
        .services
        .question_service
        .question_results(question_id)
        .await?;
    Ok(Json(results))
}

fn rejection_status(reason: VoteRejection) -> StatusCode {
    match reason {
        VoteRejection::NotAuthorized => StatusCode::UNAUTHORIZED,
        VoteRejection::NoSelection => StatusCode::BAD_REQUEST,
        VoteRejection::AlreadyVoted => StatusCode::CONFLICT,
    }
}
