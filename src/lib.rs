//! PollBooth
//!
//! A small poll service. Users register and log in, authors publish
//! questions with choices, and every user may vote once per question.
//! Recent questions are public; older ones are only shown to superusers.

pub mod config;
pub mod database;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use tracing::info;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{PollError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use handlers::{router, AppState};
pub use services::ServiceFactory;

use config::StorageBackend;
use database::connection::{create_pool, run_migrations, PoolConfig};
use services::{MemorySessionStore, RedisSessionStore, SessionStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}

/// Connect the configured backend and build every service on top of it
///
/// The PostgreSQL backend runs pending migrations before returning.
pub async fn connect(settings: &Settings) -> Result<ServiceFactory> {
    let (database, session_store): (DatabaseService, Arc<dyn SessionStore>) =
        match settings.storage.backend {
            StorageBackend::Postgres => {
                info!("Connecting to database...");
                let pool = create_pool(&PoolConfig::from(&settings.database)).await?;
                run_migrations(&pool).await?;

                info!("Connecting to Redis...");
                let sessions = RedisSessionStore::new(&settings.redis).await?;

                (DatabaseService::new(pool), Arc::new(sessions))
            }
            StorageBackend::Memory => {
                info!("Using in-memory storage; nothing survives a restart");
                (DatabaseService::in_memory(), Arc::new(MemorySessionStore::new()))
            }
        };

    ServiceFactory::new(settings, database, session_store)
}

/// Router with state for the given services
pub fn build_app(settings: &Settings, services: ServiceFactory) -> axum::Router {
    router(AppState::new(services, settings.session.cookie_name.clone()))
}
