//! Visibility policy for question detail pages
//!
//! Recently published questions are open to everyone; older ones only to
//! superusers. Everyone else gets the same not-found answer as for a question
//! that does not exist.

use chrono::{DateTime, Duration, Utc};

use crate::models::{Question, Requester};

#[derive(Debug, Clone, Copy)]
pub struct VisibilityPolicy {
    recency_window: Duration,
}

impl VisibilityPolicy {
    pub fn new(recency_window: Duration) -> Self {
        Self { recency_window }
    }

    pub fn recency_window(&self) -> Duration {
        self.recency_window
    }

    /// Whether `requester` may open the question's detail page at `now`
    pub fn can_view(&self, question: &Question, requester: Option<&Requester>, now: DateTime<Utc>) -> bool {
        question.published_recently(now, self.recency_window)
            || requester.is_some_and(|r| r.is_superuser)
    }
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        Self::new(Duration::days(3))
    }
}
