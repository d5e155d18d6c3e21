//! Services module
//!
//! This module contains business logic services

pub mod account;
pub mod auth;
pub mod question;
pub mod session;
pub mod visibility;
pub mod voting;

// Re-export commonly used services
pub use account::AccountService;
pub use auth::PasswordHasher;
pub use question::QuestionService;
pub use session::{MemorySessionStore, RedisSessionStore, SessionData, SessionService, SessionStore};
pub use visibility::VisibilityPolicy;
pub use voting::VotingService;

use std::sync::Arc;
use std::time::Duration;

use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::middleware::rate_limit::LoginRateLimiter;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub account_service: AccountService,
    pub question_service: QuestionService,
    pub voting_service: VotingService,
    pub session_service: SessionService,
    database: DatabaseService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(
        settings: &Settings,
        database: DatabaseService,
        session_store: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let session_service = SessionService::new(
            session_store,
            Duration::from_secs(settings.session.ttl_seconds),
        );
        let account_service = AccountService::new(
            database.users.clone(),
            session_service.clone(),
            PasswordHasher::new(&settings.auth)?,
            LoginRateLimiter::new(settings.auth.login_attempts_per_minute),
        );
        let question_service = QuestionService::new(
            database.polls.clone(),
            VisibilityPolicy::new(settings.recency_window()),
        );
        let voting_service = VotingService::new(database.polls.clone());

        Ok(Self {
            account_service,
            question_service,
            voting_service,
            session_service,
            database,
        })
    }

    /// Health check for the backing stores
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let database_healthy = self.database.health_check().await.is_ok();

        ServiceHealthStatus {
            backend: self.database.backend_name(),
            database_healthy,
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone, serde::Serialize)]
pub struct ServiceHealthStatus {
    pub backend: &'static str,
    pub database_healthy: bool,
}

impl ServiceHealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.database_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.database_healthy {
            issues.push("Database connection failed".to_string());
        }

        issues
    }
}
