//! Question service
//!
//! Authoring and read access for questions. A question is saved together
//! with its choices or not at all.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;
use validator::Validate;

use crate::database::PollStore;
use crate::models::{CreateQuestionRequest, NewQuestion, QuestionDetail, QuestionSummary, Requester};
use crate::services::visibility::VisibilityPolicy;
use crate::utils::errors::{PollError, Result};
use crate::utils::logging;
use crate::utils::validation::FieldErrors;

#[derive(Clone)]
pub struct QuestionService {
    polls: Arc<dyn PollStore>,
    visibility: VisibilityPolicy,
}

impl QuestionService {
    pub fn new(polls: Arc<dyn PollStore>, visibility: VisibilityPolicy) -> Self {
        Self { polls, visibility }
    }

    /// Validate and save a question with its choices
    ///
    /// Blank choice rows and rows marked for deletion are ignored. Field
    /// errors are keyed `question.<field>` and `choices[<row>].<field>`.
    pub async fn create_question(
        &self,
        request: CreateQuestionRequest,
        author: Option<&Requester>,
    ) -> Result<QuestionDetail> {
        let Some(author) = author else {
            return Err(PollError::NotAuthenticated);
        };

        let mut errors = FieldErrors::new();
        if let Err(e) = request.question.validate() {
            errors.extend_from(Some("question"), &e);
        }

        let mut choice_texts = Vec::new();
        for (row, form) in request.choices.iter().enumerate() {
            if form.delete || form.is_blank() {
                continue;
            }
            match form.validate() {
                Ok(()) => choice_texts.push(form.choice_text.trim().to_string()),
                Err(e) => errors.extend_from(Some(&format!("choices[{}]", row)), &e),
            }
        }
        if choice_texts.is_empty() && !errors.contains_prefix("choices[") {
            errors.add("choices", "Add at least one choice.");
        }
        errors.into_result()?;

        let form = request.question;
        let (question, choices) = self
            .polls
            .create_question(
                NewQuestion {
                    text: form.text.trim().to_string(),
                    pub_date: Utc::now(),
                    short_description: form.short_description,
                    description: form.description,
                    image: form.image,
                },
                choice_texts,
            )
            .await?;

        logging::log_question_event(question.id, "created", Some(author.user_id));
        Ok(QuestionDetail::new(question, choices))
    }

    /// Index listing, newest first
    pub async fn list_questions(&self) -> Result<Vec<QuestionSummary>> {
        let questions = self.polls.list_questions().await?;
        Ok(questions.iter().map(QuestionSummary::from).collect())
    }

    /// Detail page; questions outside the recency window look missing to
    /// everyone but superusers
    pub async fn question_detail(
        &self,
        question_id: i64,
        requester: Option<&Requester>,
    ) -> Result<QuestionDetail> {
        self.question_detail_at(question_id, requester, Utc::now()).await
    }

    pub async fn question_detail_at(
        &self,
        question_id: i64,
        requester: Option<&Requester>,
        now: DateTime<Utc>,
    ) -> Result<QuestionDetail> {
        let question = self
            .polls
            .find_question(question_id)
            .await?
            .ok_or(PollError::QuestionNotFound { question_id })?;

        if !self.visibility.can_view(&question, requester, now) {
            logging::log_masked_access("question", question_id, requester.map(|r| r.user_id));
            return Err(PollError::QuestionNotFound { question_id });
        }

        let choices = self.polls.choices_for(question_id).await?;
        Ok(QuestionDetail::new(question, choices))
    }

    /// Results page; not subject to the recency window
    pub async fn question_results(&self, question_id: i64) -> Result<QuestionDetail> {
        debug!(question_id = question_id, "Loading results");

        let question = self
            .polls
            .find_question(question_id)
            .await?
            .ok_or(PollError::QuestionNotFound { question_id })?;
        let choices = self.polls.choices_for(question_id).await?;

        Ok(QuestionDetail::new(question, choices))
    }
}
