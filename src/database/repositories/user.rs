//! User repository implementation

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use super::UserStore;
use crate::models::user::{NewUser, UpdateUserRequest, User};
use crate::utils::errors::{PollError, Result};
use crate::utils::validation::FieldErrors;

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, password, avatar, is_superuser, date_joined";

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Turn a unique violation on `users` into a field error
fn map_unique_violation(error: sqlx::Error) -> PollError {
    if let sqlx::Error::Database(ref db_error) = error {
        if db_error.is_unique_violation() {
            let field = match db_error.constraint() {
                Some(constraint) if constraint.contains("email") => "email",
                _ => "username",
            };
            let message = format!("A user with that {} already exists.", field);
            return PollError::Validation(FieldErrors::single(field, &message));
        }
    }
    PollError::Database(error)
}

#[async_trait]
impl UserStore for UserRepository {
    /// Create a new user
    async fn create(&self, user: NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, first_name, last_name, password, avatar, is_superuser, date_joined)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.username)
        .bind(user.email)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.password_hash)
        .bind(user.avatar)
        .bind(user.is_superuser)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(user)
    }

    /// Find user by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update user
    async fn update(&self, id: i64, request: UpdateUserRequest) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE($3, email),
                first_name = COALESCE($4, first_name),
                last_name = COALESCE($5, last_name),
                avatar = COALESCE($6, avatar)
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(request.username)
        .bind(request.email)
        .bind(request.first_name)
        .bind(request.last_name)
        .bind(request.avatar)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        user.ok_or(PollError::UserNotFound { user_id: id })
    }

    /// Delete user; voted-by rows go with it through the foreign key
    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
