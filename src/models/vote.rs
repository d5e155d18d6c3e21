//! Vote submission types

use serde::{Deserialize, Serialize};

use super::{Choice, Question, QuestionDetail};

/// Body of a vote submission; `choice` is absent when nothing was selected
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoteRequest {
    pub choice: Option<i64>,
}

/// What the store did with a vote
#[derive(Debug, Clone)]
pub enum VoteRecord {
    /// Membership added and both counters incremented
    Recorded { question: Question, choice: Choice },
    /// The user was already in the question's voted-by set
    AlreadyVoted,
    /// The choice does not exist or belongs to another question
    ChoiceMissing,
}

/// Why a vote was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteRejection {
    NotAuthorized,
    NoSelection,
    AlreadyVoted,
}

impl VoteRejection {
    /// User-facing message
    pub fn message(&self) -> &'static str {
        match self {
            VoteRejection::NotAuthorized => "You are not authorized",
            VoteRejection::NoSelection => "You didn't select a choice",
            VoteRejection::AlreadyVoted => "You have already voted in this poll",
        }
    }

    /// Stable identifier used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteRejection::NotAuthorized => "not_authorized",
            VoteRejection::NoSelection => "no_selection",
            VoteRejection::AlreadyVoted => "already_voted",
        }
    }
}

/// Result of casting a vote
#[derive(Debug, Clone)]
pub enum VoteOutcome {
    /// Continue to the results of `question_id`
    Recorded { question_id: i64 },
    /// Redisplay the question with the reason
    Rejected {
        reason: VoteRejection,
        question: QuestionDetail,
    },
}

impl VoteOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, VoteOutcome::Recorded { .. })
    }

    pub fn rejection(&self) -> Option<VoteRejection> {
        match self {
            VoteOutcome::Recorded { .. } => None,
            VoteOutcome::Rejected { reason, .. } => Some(*reason),
        }
    }
}
