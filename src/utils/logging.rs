//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the PollBooth service.

use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::utils::errors::{PollError, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file appender on drop and must be held for
/// the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| PollError::Config(format!("Invalid log filter: {}", e)))?;

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let (file_layer, guard) = match config.directory.as_deref() {
        Some(directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, "pollbooth.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| PollError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log user actions with structured data
pub fn log_user_action(user_id: i64, action: &str, details: Option<&str>) {
    info!(
        user_id = user_id,
        action = action,
        details = details,
        "User action performed"
    );
}

/// Log vote attempts; rejections are logged at debug level
pub fn log_vote(question_id: i64, user_id: Option<i64>, outcome: &str) {
    if outcome == "recorded" {
        info!(question_id = question_id, user_id = user_id, "Vote recorded");
    } else {
        debug!(
            question_id = question_id,
            user_id = user_id,
            outcome = outcome,
            "Vote rejected"
        );
    }
}

/// Log question lifecycle events
pub fn log_question_event(question_id: i64, event: &str, user_id: Option<i64>) {
    info!(
        question_id = question_id,
        event = event,
        user_id = user_id,
        "Question event occurred"
    );
}

/// Log access that was hidden behind a not-found response
pub fn log_masked_access(resource: &str, resource_id: i64, requester_id: Option<i64>) {
    warn!(
        resource = resource,
        resource_id = resource_id,
        requester_id = requester_id,
        "Access denied, answered as not found"
    );
}
