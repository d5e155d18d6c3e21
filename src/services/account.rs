//! Account service implementation
//!
//! This service handles registration, login and logout, and profile
//! management. A requester who may not change an account is told it does
//! not exist.

use std::sync::Arc;

use tracing::{debug, info};
use validator::Validate;

use crate::database::UserStore;
use crate::middleware::rate_limit::LoginRateLimiter;
use crate::models::{LoginRequest, NewUser, RegisterRequest, Requester, UpdateUserRequest, User};
use crate::services::auth::PasswordHasher;
use crate::services::session::SessionService;
use crate::utils::errors::{PollError, Result};
use crate::utils::logging;
use crate::utils::validation::FieldErrors;

/// Account service for managing user operations
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    sessions: SessionService,
    hasher: PasswordHasher,
    login_limiter: LoginRateLimiter,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: SessionService,
        hasher: PasswordHasher,
        login_limiter: LoginRateLimiter,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
            login_limiter,
        }
    }

    /// Register a regular (non-superuser) account
    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        debug!(username = %request.username, "Attempting to register user");
        self.create_account(request, false).await
    }

    /// Create an account with superuser rights; used by the admin command
    pub async fn create_superuser(&self, request: RegisterRequest) -> Result<User> {
        self.create_account(request, true).await
    }

    async fn create_account(&self, request: RegisterRequest, is_superuser: bool) -> Result<User> {
        let mut errors = FieldErrors::new();
        if let Err(e) = request.validate() {
            errors.extend_from(None, &e);
        }
        if request.password != request.password_confirm {
            errors.add("password_confirm", "The two password fields didn't match.");
        }
        errors.into_result()?;

        let password_hash = self.hasher.hash_async(request.password).await?;
        let user = self
            .users
            .create(NewUser {
                username: request.username,
                email: request.email,
                first_name: request.first_name,
                last_name: request.last_name,
                password_hash,
                avatar: request.avatar,
                is_superuser,
            })
            .await?;

        info!(user_id = user.id, is_superuser = is_superuser, "New user registered successfully");
        Ok(user)
    }

    /// Check credentials and start a session
    ///
    /// Unknown usernames and wrong passwords give the same error.
    pub async fn login(&self, request: LoginRequest) -> Result<(User, String)> {
        self.login_limiter.check(&request.username)?;

        let Some(user) = self.users.find_by_username(&request.username).await? else {
            debug!(username = %request.username, "Login for unknown username");
            return Err(PollError::InvalidCredentials);
        };

        if !self
            .hasher
            .verify_async(request.password.clone(), user.password.clone())
            .await?
        {
            debug!(user_id = user.id, "Login with wrong password");
            return Err(PollError::InvalidCredentials);
        }

        let session_key = self.sessions.create(user.id).await?;
        logging::log_user_action(user.id, "login", None);
        Ok((user, session_key))
    }

    /// End the session behind `session_key`, if any
    pub async fn logout(&self, session_key: Option<&str>) -> Result<()> {
        if let Some(key) = session_key {
            if self.sessions.destroy(key).await? {
                debug!("Session ended by logout");
            }
        }
        Ok(())
    }

    /// Identity behind a session key; `None` for unknown, expired or orphaned keys
    pub async fn authenticate(&self, session_key: &str) -> Result<Option<Requester>> {
        let Some(user_id) = self.sessions.resolve(session_key).await? else {
            return Ok(None);
        };

        Ok(self
            .users
            .find_by_id(user_id)
            .await?
            .map(|user| user.requester()))
    }

    /// Public profile of any user
    pub async fn profile(&self, user_id: i64) -> Result<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(PollError::UserNotFound { user_id })
    }

    /// Apply a profile edit; only the owner may edit
    pub async fn update_profile(
        &self,
        user_id: i64,
        request: UpdateUserRequest,
        requester: Option<&Requester>,
    ) -> Result<User> {
        if requester.map(|r| r.user_id) != Some(user_id) {
            logging::log_masked_access("user", user_id, requester.map(|r| r.user_id));
            return Err(PollError::UserNotFound { user_id });
        }

        if let Err(e) = request.validate() {
            return Err(PollError::Validation(e.into()));
        }

        let user = self.users.update(user_id, request).await?;
        logging::log_user_action(user.id, "update_profile", None);
        Ok(user)
    }

    /// Delete an account; allowed for its owner and for superusers
    pub async fn delete_user(&self, user_id: i64, requester: Option<&Requester>) -> Result<()> {
        let allowed = requester.is_some_and(|r| r.user_id == user_id || r.is_superuser);
        if !allowed {
            logging::log_masked_access("user", user_id, requester.map(|r| r.user_id));
            return Err(PollError::UserNotFound { user_id });
        }

        if !self.users.delete(user_id).await? {
            return Err(PollError::UserNotFound { user_id });
        }

        info!(user_id = user_id, deleted_by = requester.map(|r| r.user_id), "User deleted");
        Ok(())
    }
}
