//! Error handling for PollBooth
//!
//! This module defines the main error type used throughout the application
//! and maps it onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use super::validation::FieldErrors;

/// Main error type for PollBooth
#[derive(Error, Debug)]
pub enum PollError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Invalid input: {0}")]
    Validation(FieldErrors),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("Question not found: {question_id}")]
    QuestionNotFound { question_id: i64 },

    #[error("No such resource: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

/// Result type alias for PollBooth operations
pub type Result<T> = std::result::Result<T, PollError>;

impl PollError {
    /// Whether the error was caused by the request rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PollError::Validation(_)
                | PollError::UserNotFound { .. }
                | PollError::QuestionNotFound { .. }
                | PollError::NotFound(_)
                | PollError::NotAuthenticated
                | PollError::InvalidCredentials
                | PollError::RateLimitExceeded
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PollError::Database(_) => ErrorSeverity::Critical,
            PollError::Migration(_) => ErrorSeverity::Critical,
            PollError::Config(_) | PollError::ConfigLoad(_) => ErrorSeverity::Critical,
            PollError::NotAuthenticated => ErrorSeverity::Warning,
            PollError::InvalidCredentials => ErrorSeverity::Warning,
            PollError::RateLimitExceeded => ErrorSeverity::Warning,
            PollError::Validation(_) => ErrorSeverity::Info,
            PollError::UserNotFound { .. }
            | PollError::QuestionNotFound { .. }
            | PollError::NotFound(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// HTTP status the error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            PollError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PollError::UserNotFound { .. }
            | PollError::QuestionNotFound { .. }
            | PollError::NotFound(_) => StatusCode::NOT_FOUND,
            PollError::NotAuthenticated | PollError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            PollError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PollError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            PollError::Validation(errors) => json!({ "errors": errors }),
            // Absence and hidden access look the same to the caller.
            PollError::UserNotFound { .. }
            | PollError::QuestionNotFound { .. }
            | PollError::NotFound(_) => json!({ "detail": "Not found." }),
            _ if self.is_client_error() => json!({ "detail": self.to_string() }),
            _ => {
                tracing::error!(error = %self, severity = %self.severity(), "Request failed");
                json!({ "detail": "Internal server error" })
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
