//! Database repositories module
//!
//! This module contains the store traits the services depend on and their
//! PostgreSQL implementations. The in-memory implementation lives in
//! [`crate::database::memory`].

pub mod choice;
pub mod question;
pub mod user;

use async_trait::async_trait;

use crate::models::{Choice, NewQuestion, NewUser, Question, UpdateUserRequest, User, VoteRecord};
use crate::utils::errors::Result;

// Re-export repositories
pub use choice::ChoiceRepository;
pub use question::QuestionRepository;
pub use user::UserRepository;

/// Account records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; username and email clashes come back as field errors
    async fn create(&self, user: NewUser) -> Result<User>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Apply the present fields; clashes come back as field errors
    async fn update(&self, id: i64, request: UpdateUserRequest) -> Result<User>;

    /// Remove the user and their voted-by memberships; `false` if absent
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// Questions, their choices and the vote tally
#[async_trait]
pub trait PollStore: Send + Sync {
    /// Insert the question and all of its choices, or nothing at all
    async fn create_question(
        &self,
        question: NewQuestion,
        choice_texts: Vec<String>,
    ) -> Result<(Question, Vec<Choice>)>;

    async fn find_question(&self, id: i64) -> Result<Option<Question>>;

    /// Every question, newest publication first
    async fn list_questions(&self) -> Result<Vec<Question>>;

    /// Choices of a question in creation order
    async fn choices_for(&self, question_id: i64) -> Result<Vec<Choice>>;

    async fn has_voted(&self, question_id: i64, user_id: i64) -> Result<bool>;

    /// Ids of the users in the question's voted-by set
    async fn voters(&self, question_id: i64) -> Result<Vec<i64>>;

    /// Add the membership and increment both counters as one atomic step
    async fn record_vote(&self, question_id: i64, choice_id: i64, user_id: i64) -> Result<VoteRecord>;
}
