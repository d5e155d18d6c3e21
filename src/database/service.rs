//! Database service layer
//!
//! This module bundles the stores behind the traits the services use, so the
//! rest of the application does not care which backend is configured.

use std::sync::Arc;

use super::connection::{self, DatabasePool};
use super::memory::MemoryStore;
use super::repositories::{PollStore, QuestionRepository, UserRepository, UserStore};
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct DatabaseService {
    pub users: Arc<dyn UserStore>,
    pub polls: Arc<dyn PollStore>,
    pool: Option<DatabasePool>,
}

impl DatabaseService {
    /// Stores backed by PostgreSQL
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            polls: Arc::new(QuestionRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Stores held in process memory
    pub fn in_memory() -> Self {
        let store = MemoryStore::new();
        Self {
            users: Arc::new(store.clone()),
            polls: Arc::new(store),
            pool: None,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        if self.pool.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }

    /// Check the database connection; the memory backend is always healthy
    pub async fn health_check(&self) -> Result<()> {
        match &self.pool {
            Some(pool) => connection::health_check(pool).await,
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for DatabaseService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseService")
            .field("backend", &self.backend_name())
            .finish()
    }
}
