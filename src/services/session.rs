//! Session storage
//!
//! A session maps an opaque random key to a user id. Keys live in Redis with
//! a TTL in production, or in process memory for the memory backend.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::config::RedisConfig;
use crate::utils::errors::Result;
use crate::utils::helpers::generate_session_key;

/// What is stored under a session key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionData {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, key: &str, data: &SessionData, ttl: Duration) -> Result<()>;

    async fn load(&self, key: &str) -> Result<Option<SessionData>>;

    /// `false` when there was nothing to delete
    async fn delete(&self, key: &str) -> Result<bool>;
}

/// Redis-based session storage
#[derive(Clone)]
pub struct RedisSessionStore {
    connection_manager: redis::aio::ConnectionManager,
    prefix: String,
}

impl RedisSessionStore {
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            prefix: config.prefix.clone(),
        })
    }

    fn session_key(&self, key: &str) -> String {
        format!("{}session:{}", self.prefix, key)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(&self, key: &str, data: &SessionData, ttl: Duration) -> Result<()> {
        let redis_key = self.session_key(key);
        let serialized = serde_json::to_string(data)?;
        let mut conn = self.connection_manager.clone();

        if let Err(e) = conn
            .set_ex::<_, _, ()>(&redis_key, serialized, ttl.as_secs())
            .await
        {
            error!(user_id = data.user_id, error = %e, "Failed to save session to Redis");
            return Err(e.into());
        }

        debug!(user_id = data.user_id, ttl_seconds = ttl.as_secs(), "Session saved to Redis");
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<SessionData>> {
        let redis_key = self.session_key(key);
        let mut conn = self.connection_manager.clone();

        let serialized: Option<String> = conn.get(&redis_key).await?;
        match serialized {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let redis_key = self.session_key(key);
        let mut conn = self.connection_manager.clone();

        let deleted: u32 = conn.del(&redis_key).await?;
        Ok(deleted > 0)
    }
}

/// Process-local session storage; expiry is checked on load
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionData>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones not yet pruned included
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, key: &str, data: &SessionData, _ttl: Duration) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, session| !session.is_expired());
        sessions.insert(key.to_string(), data.clone());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<SessionData>> {
        Ok(self.sessions.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.sessions.write().await.remove(key).is_some())
    }
}

/// Creates, resolves and destroys sessions
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Start a session for the user and return its key
    pub async fn create(&self, user_id: i64) -> Result<String> {
        let key = generate_session_key();
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::days(14));
        let data = SessionData {
            user_id,
            created_at: now,
            expires_at: now + ttl,
        };

        self.store.save(&key, &data, self.ttl).await?;
        debug!(user_id = user_id, "Session created");
        Ok(key)
    }

    /// User id behind a live session key
    pub async fn resolve(&self, key: &str) -> Result<Option<i64>> {
        match self.store.load(key).await? {
            Some(data) if data.is_expired() => {
                debug!(user_id = data.user_id, "Session expired, removing");
                self.store.delete(key).await?;
                Ok(None)
            }
            Some(data) => Ok(Some(data.user_id)),
            None => Ok(None),
        }
    }

    /// End the session; `false` if the key was unknown
    pub async fn destroy(&self, key: &str) -> Result<bool> {
        self.store.delete(key).await
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
