//! Choice repository implementation
//!
//! Choice writes only happen as part of a question creation or a vote, so
//! the write helpers take the caller's transaction.

use sqlx::{PgConnection, PgPool};

use crate::models::choice::Choice;
use crate::utils::errors::Result;

#[derive(Clone)]
#[derive(Debug)]
pub struct ChoiceRepository {
    pool: PgPool,
}

impl ChoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Choices of a question in creation order
    pub async fn for_question(&self, question_id: i64) -> Result<Vec<Choice>> {
        let choices = sqlx::query_as::<_, Choice>(
            "SELECT id, question_id, choice_text, votes FROM choices WHERE question_id = $1 ORDER BY id",
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(choices)
    }

    /// Insert a choice with no votes
    pub async fn insert(conn: &mut PgConnection, question_id: i64, choice_text: &str) -> Result<Choice> {
        let choice = sqlx::query_as::<_, Choice>(
            r#"
            INSERT INTO choices (question_id, choice_text, votes)
            VALUES ($1, $2, 0)
            RETURNING id, question_id, choice_text, votes
            "#,
        )
        .bind(question_id)
        .bind(choice_text)
        .fetch_one(conn)
        .await?;

        Ok(choice)
    }

    /// Find a choice only if it belongs to the question
    pub async fn find_in_question(
        conn: &mut PgConnection,
        question_id: i64,
        choice_id: i64,
    ) -> Result<Option<Choice>> {
        let choice = sqlx::query_as::<_, Choice>(
            "SELECT id, question_id, choice_text, votes FROM choices WHERE id = $1 AND question_id = $2",
        )
        .bind(choice_id)
        .bind(question_id)
        .fetch_optional(conn)
        .await?;

        Ok(choice)
    }

    /// Atomically add one vote
    pub async fn increment_votes(conn: &mut PgConnection, choice_id: i64) -> Result<Choice> {
        let choice = sqlx::query_as::<_, Choice>(
            r#"
            UPDATE choices
            SET votes = votes + 1
            WHERE id = $1
            RETURNING id, question_id, choice_text, votes
            "#,
        )
        .bind(choice_id)
        .fetch_one(conn)
        .await?;

        Ok(choice)
    }
}
