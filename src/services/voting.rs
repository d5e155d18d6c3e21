//! Voting engine
//!
//! Checks a vote submission in a fixed order (authenticated, something
//! selected, not voted yet) and hands accepted votes to the store, which
//! records the membership and both counters atomically.

use std::sync::Arc;

use tracing::debug;

use crate::database::PollStore;
use crate::models::{QuestionDetail, Requester, VoteOutcome, VoteRecord, VoteRejection};
use crate::utils::errors::{PollError, Result};
use crate::utils::logging;

#[derive(Clone)]
pub struct VotingService {
    polls: Arc<dyn PollStore>,
}

impl VotingService {
    pub fn new(polls: Arc<dyn PollStore>) -> Self {
        Self { polls }
    }

    /// Cast `requester`'s vote for `choice_id` on the question
    ///
    /// Fails only when the question does not exist; every business-rule
    /// rejection is an `Ok(VoteOutcome::Rejected { .. })`.
    pub async fn cast_vote(
        &self,
        question_id: i64,
        choice_id: Option<i64>,
        requester: Option<&Requester>,
    ) -> Result<VoteOutcome> {
        let question = self
            .polls
            .find_question(question_id)
            .await?
            .ok_or(PollError::QuestionNotFound { question_id })?;

        let Some(requester) = requester else {
            return self.reject(question_id, None, VoteRejection::NotAuthorized).await;
        };
        let user_id = Some(requester.user_id);

        let choices = self.polls.choices_for(question.id).await?;
        let Some(choice_id) = choice_id.filter(|id| choices.iter().any(|c| c.id == *id)) else {
            return self.reject(question_id, user_id, VoteRejection::NoSelection).await;
        };

        if self.polls.has_voted(question_id, requester.user_id).await? {
            return self.reject(question_id, user_id, VoteRejection::AlreadyVoted).await;
        }

        debug!(question_id = question_id, choice_id = choice_id, user_id = requester.user_id, "Recording vote");

        // The checks above can go stale under concurrency; the store decides.
        match self
            .polls
            .record_vote(question_id, choice_id, requester.user_id)
            .await?
        {
            VoteRecord::Recorded { question, .. } => {
                logging::log_vote(question.id, user_id, "recorded");
                Ok(VoteOutcome::Recorded {
                    question_id: question.id,
                })
            }
            VoteRecord::AlreadyVoted => {
                self.reject(question_id, user_id, VoteRejection::AlreadyVoted).await
            }
            VoteRecord::ChoiceMissing => {
                self.reject(question_id, user_id, VoteRejection::NoSelection).await
            }
        }
    }

    /// Build a rejection carrying the current state of the question
    async fn reject(
        &self,
        question_id: i64,
        user_id: Option<i64>,
        reason: VoteRejection,
    ) -> Result<VoteOutcome> {
        logging::log_vote(question_id, user_id, reason.as_str());

        let question = self
            .polls
            .find_question(question_id)
            .await?
            .ok_or(PollError::QuestionNotFound { question_id })?;
        let choices = self.polls.choices_for(question_id).await?;

        Ok(VoteOutcome::Rejected {
            reason,
            question: QuestionDetail::new(question, choices),
        })
    }
}
