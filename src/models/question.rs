//! Question model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::choice::{Choice, ChoiceForm, ChoiceView};
use crate::utils::validation::validate_not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    /// Reference to the stored question image
    pub image: Option<String>,
    /// Total of the votes of every choice
    pub votes: i64,
}

impl Question {
    /// Whether the question was published within `window` of `now`
    pub fn published_recently(&self, now: DateTime<Utc>, window: chrono::Duration) -> bool {
        self.pub_date >= now - window
    }
}

/// Question fields of the authoring form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct QuestionForm {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 250, message = "Ensure this field has 1 to 250 characters."),
        custom(function = "validate_not_blank")
    )]
    pub text: String,
    #[validate(length(max = 450, message = "Ensure this field has at most 450 characters."))]
    pub short_description: Option<String>,
    #[validate(length(max = 1500, message = "Ensure this field has at most 1500 characters."))]
    pub description: Option<String>,
    #[validate(length(max = 254, message = "Ensure this field has at most 254 characters."))]
    pub image: Option<String>,
}

/// A question with its choice forms, validated and saved as one unit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateQuestionRequest {
    #[serde(flatten)]
    pub question: QuestionForm,
    #[serde(default)]
    pub choices: Vec<ChoiceForm>,
}

/// A validated question ready to be stored
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Index entry
#[derive(Debug, Clone, Serialize)]
pub struct QuestionSummary {
    pub id: i64,
    pub text: String,
    pub short_description: Option<String>,
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub votes: i64,
}

impl From<&Question> for QuestionSummary {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            text: question.text.clone(),
            short_description: question.short_description.clone(),
            image: question.image.clone(),
            pub_date: question.pub_date,
            votes: question.votes,
        }
    }
}

/// A question with its choices and their percentages
#[derive(Debug, Clone, Serialize)]
pub struct QuestionDetail {
    #[serde(flatten)]
    pub question: Question,
    pub choices: Vec<ChoiceView>,
}

impl QuestionDetail {
    pub fn new(question: Question, choices: Vec<Choice>) -> Self {
        let choices = choices
            .iter()
            .map(|choice| ChoiceView::new(choice, question.votes))
            .collect();

        Self { question, choices }
    }
}
