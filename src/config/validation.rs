//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::{Settings, StorageBackend};
use crate::utils::errors::{PollError, Result};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;

    if settings.storage.backend == StorageBackend::Postgres {
        validate_database_config(&settings.database)?;
        validate_redis_config(&settings.redis)?;
    }

    validate_session_config(&settings.session)?;
    validate_polls_config(&settings.polls)?;
    validate_auth_config(&settings.auth)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(PollError::Config("Server host is required".to_string()));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(PollError::Config("Database URL is required".to_string()));
    }

    if config.max_connections == 0 {
        return Err(PollError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(PollError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(PollError::Config("Redis URL is required".to_string()));
    }

    Ok(())
}

fn validate_session_config(config: &super::SessionConfig) -> Result<()> {
    if config.ttl_seconds == 0 {
        return Err(PollError::Config(
            "Session TTL must be greater than 0".to_string(),
        ));
    }

    if config.cookie_name.is_empty() {
        return Err(PollError::Config("Session cookie name is required".to_string()));
    }

    Ok(())
}

fn validate_polls_config(config: &super::PollsConfig) -> Result<()> {
    if config.recency_window_days < 0 {
        return Err(PollError::Config(
            "Recency window cannot be negative".to_string(),
        ));
    }

    Ok(())
}

fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.login_attempts_per_minute == 0 {
        return Err(PollError::Config(
            "Login attempts per minute must be greater than 0".to_string(),
        ));
    }

    if config.argon2_memory_kib < 8 || config.argon2_iterations == 0 {
        return Err(PollError::Config(
            "Argon2 needs at least 8 KiB of memory and one iteration".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(PollError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(PollError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}
