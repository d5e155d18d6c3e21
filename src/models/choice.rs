//! Choice model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::validation::validate_not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub choice_text: String,
    pub votes: i64,
}

impl Choice {
    /// Share of the question's votes, see [`percent`]
    pub fn percent(&self, question_votes: i64) -> i64 {
        percent(self.votes, question_votes)
    }
}

/// Rounded percentage of `votes` out of `total`, 0 when nothing was cast.
///
/// Halves round to the nearest even integer.
pub fn percent(votes: i64, total: i64) -> i64 {
    if total > 0 {
        (votes as f64 * 100.0 / total as f64).round_ties_even() as i64
    } else {
        0
    }
}

/// One choice row of the authoring form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ChoiceForm {
    #[serde(default)]
    #[validate(
        length(max = 200, message = "Ensure this field has at most 200 characters."),
        custom(function = "validate_not_blank")
    )]
    pub choice_text: String,
    /// Rows marked for deletion are dropped before saving
    #[serde(default)]
    pub delete: bool,
}

impl ChoiceForm {
    /// An extra row the user left untouched
    pub fn is_blank(&self) -> bool {
        self.choice_text.trim().is_empty()
    }
}

/// Choice as shown on detail and results pages
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceView {
    pub id: i64,
    pub choice_text: String,
    pub votes: i64,
    pub percent: i64,
}

impl ChoiceView {
    pub fn new(choice: &Choice, question_votes: i64) -> Self {
        Self {
            id: choice.id,
            choice_text: choice.choice_text.clone(),
            votes: choice.votes,
            percent: choice.percent(question_votes),
        }
    }
}
