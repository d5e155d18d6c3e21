//! Question repository implementation

use async_trait::async_trait;
use sqlx::PgPool;

use super::{ChoiceRepository, PollStore};
use crate::models::{Choice, NewQuestion, Question, VoteRecord};
use crate::utils::errors::Result;

const QUESTION_COLUMNS: &str =
    "id, text, pub_date, short_description, description, image, votes";

#[derive(Clone)]
#[derive(Debug)]
pub struct QuestionRepository {
    pool: PgPool,
    choices: ChoiceRepository,
}

impl QuestionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            choices: ChoiceRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl PollStore for QuestionRepository {
    async fn create_question(
        &self,
        question: NewQuestion,
        choice_texts: Vec<String>,
    ) -> Result<(Question, Vec<Choice>)> {
        let mut tx = self.pool.begin().await?;

        let question = sqlx::query_as::<_, Question>(&format!(
            r#"
            INSERT INTO questions (text, pub_date, short_description, description, image, votes)
            VALUES ($1, $2, $3, $4, $5, 0)
            RETURNING {}
            "#,
            QUESTION_COLUMNS
        ))
        .bind(question.text)
        .bind(question.pub_date)
        .bind(question.short_description)
        .bind(question.description)
        .bind(question.image)
        .fetch_one(&mut *tx)
        .await?;

        let mut choices = Vec::with_capacity(choice_texts.len());
        for choice_text in &choice_texts {
            choices.push(ChoiceRepository::insert(&mut tx, question.id, choice_text).await?);
        }

        tx.commit().await?;

        Ok((question, choices))
    }

    async fn find_question(&self, id: i64) -> Result<Option<Question>> {
        let question = sqlx::query_as::<_, Question>(&format!(
            "SELECT {} FROM questions WHERE id = $1",
            QUESTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(question)
    }

    async fn list_questions(&self) -> Result<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(&format!(
            "SELECT {} FROM questions ORDER BY pub_date DESC, id DESC",
            QUESTION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn choices_for(&self, question_id: i64) -> Result<Vec<Choice>> {
        self.choices.for_question(question_id).await
    }

    async fn has_voted(&self, question_id: i64, user_id: i64) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM question_voters WHERE question_id = $1 AND user_id = $2)",
        )
        .bind(question_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0)
    }

    async fn voters(&self, question_id: i64) -> Result<Vec<i64>> {
        let voters: Vec<(i64,)> = sqlx::query_as(
            "SELECT user_id FROM question_voters WHERE question_id = $1 ORDER BY user_id",
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(voters.into_iter().map(|(user_id,)| user_id).collect())
    }

    async fn record_vote(&self, question_id: i64, choice_id: i64, user_id: i64) -> Result<VoteRecord> {
        let mut tx = self.pool.begin().await?;

        if ChoiceRepository::find_in_question(&mut tx, question_id, choice_id)
            .await?
            .is_none()
        {
            tx.rollback().await?;
            return Ok(VoteRecord::ChoiceMissing);
        }

        // A concurrent insert for the same pair blocks on the primary key
        // and then affects no rows.
        let inserted = sqlx::query(
            "INSERT INTO question_voters (question_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(question_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            tx.rollback().await?;
            return Ok(VoteRecord::AlreadyVoted);
        }

        let choice = ChoiceRepository::increment_votes(&mut tx, choice_id).await?;

        let question = sqlx::query_as::<_, Question>(&format!(
            "UPDATE questions SET votes = votes + 1 WHERE id = $1 RETURNING {}",
            QUESTION_COLUMNS
        ))
        .bind(question_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(VoteRecord::Recorded { question, choice })
    }
}
