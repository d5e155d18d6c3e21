//! In-process store
//!
//! Backs `storage.backend = "memory"` and the test suites. One lock guards
//! every table, so a vote's membership insert and both counter increments
//! are observed together or not at all.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::repositories::{PollStore, UserStore};
use crate::models::{Choice, NewQuestion, NewUser, Question, UpdateUserRequest, User, VoteRecord};
use crate::utils::errors::{PollError, Result};
use crate::utils::validation::FieldErrors;

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    questions: BTreeMap<i64, Question>,
    choices: BTreeMap<i64, Choice>,
    voters: BTreeMap<i64, BTreeSet<i64>>,
    next_user_id: i64,
    next_question_id: i64,
    next_choice_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    /// Field errors for username/email values already held by another user
    fn conflicts(&self, username: Option<&str>, email: Option<&str>, except: Option<i64>) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let others = self.users.values().filter(|u| Some(u.id) != except);

        for user in others {
            if username == Some(user.username.as_str()) && !errors.contains("username") {
                errors.add("username", "A user with that username already exists.");
            }
            if email == Some(user.email.as_str()) && !errors.contains("email") {
                errors.add("email", "A user with that email already exists.");
            }
        }
        errors
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;

        tables
            .conflicts(Some(user.username.as_str()), Some(user.email.as_str()), None)
            .into_result()?;

        let id = Tables::next_id(&mut tables.next_user_id);
        let user = User {
            id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password: user.password_hash,
            avatar: user.avatar,
            is_superuser: user.is_superuser,
            date_joined: Utc::now(),
        };
        tables.users.insert(id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn update(&self, id: i64, request: UpdateUserRequest) -> Result<User> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&id) {
            return Err(PollError::UserNotFound { user_id: id });
        }

        tables
            .conflicts(request.username.as_deref(), request.email.as_deref(), Some(id))
            .into_result()?;

        let user = tables
            .users
            .get_mut(&id)
            .ok_or(PollError::UserNotFound { user_id: id })?;

        if let Some(username) = request.username {
            user.username = username;
        }
        if let Some(email) = request.email {
            user.email = email;
        }
        if let Some(first_name) = request.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = request.last_name {
            user.last_name = last_name;
        }
        if let Some(avatar) = request.avatar {
            user.avatar = Some(avatar);
        }

        Ok(user.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;

        let removed = tables.users.remove(&id).is_some();
        if removed {
            for voters in tables.voters.values_mut() {
                voters.remove(&id);
            }
        }

        Ok(removed)
    }
}

#[async_trait]
impl PollStore for MemoryStore {
    async fn create_question(
        &self,
        question: NewQuestion,
        choice_texts: Vec<String>,
    ) -> Result<(Question, Vec<Choice>)> {
        let mut tables = self.tables.write().await;

        let question_id = Tables::next_id(&mut tables.next_question_id);
        let question = Question {
            id: question_id,
            text: question.text,
            pub_date: question.pub_date,
            short_description: question.short_description,
            description: question.description,
            image: question.image,
            votes: 0,
        };

        let mut choices = Vec::with_capacity(choice_texts.len());
        for choice_text in choice_texts {
            let id = Tables::next_id(&mut tables.next_choice_id);
            let choice = Choice {
                id,
                question_id,
                choice_text,
                votes: 0,
            };
            tables.choices.insert(id, choice.clone());
            choices.push(choice);
        }

        tables.questions.insert(question_id, question.clone());
        tables.voters.insert(question_id, BTreeSet::new());

        Ok((question, choices))
    }

    async fn find_question(&self, id: i64) -> Result<Option<Question>> {
        Ok(self.tables.read().await.questions.get(&id).cloned())
    }

    async fn list_questions(&self) -> Result<Vec<Question>> {
        let tables = self.tables.read().await;
        let mut questions: Vec<Question> = tables.questions.values().cloned().collect();
        questions.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        Ok(questions)
    }

    async fn choices_for(&self, question_id: i64) -> Result<Vec<Choice>> {
        let tables = self.tables.read().await;
        Ok(tables
            .choices
            .values()
            .filter(|c| c.question_id == question_id)
            .cloned()
            .collect())
    }

    async fn has_voted(&self, question_id: i64, user_id: i64) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .voters
            .get(&question_id)
            .is_some_and(|voters| voters.contains(&user_id)))
    }

    async fn voters(&self, question_id: i64) -> Result<Vec<i64>> {
        let tables = self.tables.read().await;
        Ok(tables
            .voters
            .get(&question_id)
            .map(|voters| voters.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn record_vote(&self, question_id: i64, choice_id: i64, user_id: i64) -> Result<VoteRecord> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;

        let belongs = tables
            .choices
            .get(&choice_id)
            .is_some_and(|c| c.question_id == question_id);
        if !belongs || !tables.questions.contains_key(&question_id) {
            return Ok(VoteRecord::ChoiceMissing);
        }

        if !tables.voters.entry(question_id).or_default().insert(user_id) {
            return Ok(VoteRecord::AlreadyVoted);
        }

        let choice = tables
            .choices
            .get_mut(&choice_id)
            .map(|choice| {
                choice.votes += 1;
                choice.clone()
            })
            .ok_or(PollError::QuestionNotFound { question_id })?;
        let question = tables
            .questions
            .get_mut(&question_id)
            .map(|question| {
                question.votes += 1;
                question.clone()
            })
            .ok_or(PollError::QuestionNotFound { question_id })?;

        Ok(VoteRecord::Recorded { question, choice })
    }
}
