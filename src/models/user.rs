//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::validation::{validate_not_blank, validate_username};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password: String,
    /// Reference to the stored avatar image
    pub avatar: Option<String>,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn requester(&self) -> Requester {
        Requester {
            user_id: self.id,
            is_superuser: self.is_superuser,
        }
    }
}

/// Identity resolved from a request's session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub user_id: i64,
    pub is_superuser: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this field has at most 254 characters.")
    )]
    pub email: String,
    #[validate(
        length(min = 1, max = 254, message = "Ensure this field has 1 to 254 characters."),
        custom(function = "validate_not_blank")
    )]
    pub first_name: String,
    #[validate(
        length(min = 1, max = 254, message = "Ensure this field has 1 to 254 characters."),
        custom(function = "validate_not_blank")
    )]
    pub last_name: String,
    #[validate(length(min = 8, max = 254, message = "Password must be 8 to 254 characters long."))]
    pub password: String,
    /// Compared with `password` by the account service
    pub password_confirm: String,
    #[validate(length(max = 254, message = "Ensure this field has at most 254 characters."))]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: Option<String>,
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this field has at most 254 characters.")
    )]
    pub email: Option<String>,
    #[validate(
        length(min = 1, max = 254, message = "Ensure this field has 1 to 254 characters."),
        custom(function = "validate_not_blank")
    )]
    pub first_name: Option<String>,
    #[validate(
        length(min = 1, max = 254, message = "Ensure this field has 1 to 254 characters."),
        custom(function = "validate_not_blank")
    )]
    pub last_name: Option<String>,
    #[validate(length(max = 254, message = "Ensure this field has at most 254 characters."))]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// A validated registration ready to be stored
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub is_superuser: bool,
}
