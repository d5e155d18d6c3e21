//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod choice;
pub mod question;
pub mod user;
pub mod vote;

// Re-export commonly used models
pub use choice::{percent, Choice, ChoiceForm, ChoiceView};
pub use question::{CreateQuestionRequest, NewQuestion, Question, QuestionDetail, QuestionForm, QuestionSummary};
pub use user::{LoginRequest, NewUser, RegisterRequest, Requester, UpdateUserRequest, User};
pub use vote::{VoteOutcome, VoteRecord, VoteRejection, VoteRequest};
